use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tripflow_core::{
    ApprovalVerdict, ConversationState, Message, NodeName, PendingApproval, TripflowResult,
};

/// What a task node produced for this step.
///
/// Suspension is deliberately a result variant rather than an error: the
/// engine turns `NeedsApproval` into a checkpointed [`crate::RunOutcome::Suspended`],
/// while errors from `execute`/`resume` are absorbed into conversation
/// content for the router to react to.
#[derive(Debug)]
pub enum NodeOutcome {
    /// The node finished; its result message is appended to the conversation
    /// and control returns to the router.
    Completed(Message),
    /// The node reached an approval gate. Nothing past the gate has run;
    /// the captured call-site is inside the [`PendingApproval`].
    NeedsApproval(PendingApproval),
}

/// A unit of work wired into the graph under a [`NodeName`].
///
/// Nodes consume the shared conversation state and never invoke each other
/// directly; all sequencing goes through the router.
#[async_trait]
pub trait TaskNode: Send + Sync {
    /// The name this node is registered under.
    fn name(&self) -> NodeName;

    /// Run the node against the current conversation.
    ///
    /// May return [`NodeOutcome::NeedsApproval`] zero or more times over the
    /// life of a turn; each gate fully captures the action it guards.
    async fn execute(&self, state: &ConversationState) -> TripflowResult<NodeOutcome>;

    /// Re-enter the node after an approved verdict.
    ///
    /// Invoked with the exact [`PendingApproval`] captured at suspension.
    /// Implementations must execute only the guarded action — pre-gate steps
    /// already ran before the suspension and are never replayed. A node with
    /// several sequential gates may return `NeedsApproval` again here.
    async fn resume(
        &self,
        state: &ConversationState,
        pending: &PendingApproval,
        verdict: &ApprovalVerdict,
    ) -> TripflowResult<NodeOutcome>;
}

/// Error constructing a [`NodeRegistry`] or [`crate::SupervisorGraph`].
#[derive(Debug, thiserror::Error)]
pub enum GraphBuildError {
    /// Two handlers were supplied for the same node name.
    #[error("task node '{0}' registered twice")]
    DuplicateNode(NodeName),
    /// The designated fallback node has no handler.
    #[error("fallback node '{0}' has no registered handler")]
    MissingFallback(NodeName),
}

/// Closed mapping from [`NodeName`] to handler, plus the designated
/// fallback node that garbled routing decisions resolve to.
#[derive(Clone)]
pub struct NodeRegistry {
    nodes: HashMap<NodeName, Arc<dyn TaskNode>>,
    fallback: Arc<dyn TaskNode>,
    fallback_name: NodeName,
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("fallback_name", &self.fallback_name)
            .finish()
    }
}

impl NodeRegistry {
    /// Builds a registry from the given handlers.
    ///
    /// Fails if a name is registered twice or the fallback has no handler.
    /// Unknown names are impossible by construction ([`NodeName`] is a
    /// closed enum).
    pub fn new(
        fallback: NodeName,
        handlers: Vec<Arc<dyn TaskNode>>,
    ) -> Result<Self, GraphBuildError> {
        let mut nodes: HashMap<NodeName, Arc<dyn TaskNode>> = HashMap::new();
        for handler in handlers {
            let name = handler.name();
            if nodes.insert(name, handler).is_some() {
                return Err(GraphBuildError::DuplicateNode(name));
            }
        }
        let fallback_handler = nodes
            .get(&fallback)
            .cloned()
            .ok_or(GraphBuildError::MissingFallback(fallback))?;
        Ok(Self {
            nodes,
            fallback: fallback_handler,
            fallback_name: fallback,
        })
    }

    /// The handler for `name`, if registered.
    pub fn get(&self, name: NodeName) -> Option<Arc<dyn TaskNode>> {
        self.nodes.get(&name).cloned()
    }

    /// The handler for `name`, or the fallback handler when none is
    /// registered. Never fails: the fallback is validated at construction.
    pub fn resolve(&self, name: NodeName) -> Arc<dyn TaskNode> {
        self.nodes
            .get(&name)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// The designated fallback node name.
    pub fn fallback_name(&self) -> NodeName {
        self.fallback_name
    }

    /// All registered node names.
    pub fn names(&self) -> Vec<NodeName> {
        self.nodes.keys().copied().collect()
    }
}
