use crate::checkpoint::RunCheckpoint;
use crate::node::{NodeOutcome, NodeRegistry};
use crate::oracle::DecisionOracle;
use std::sync::Arc;
use tracing::{info, warn};
use tripflow_core::{
    ApprovalVerdict, ConversationId, ConversationState, Message, NodeName, RouteTarget,
    RoutingDecision, TripflowError, TripflowResult,
};

/// Notice appended when the router rejects an out-of-domain request.
const REJECTION_NOTICE: &str = "I'm a travel assistant. Ask me about destinations, \
     trip planning, or booking travel arrangements.";

/// Tunable limits for one graph execution.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Maximum delegations per turn before the turn aborts with
    /// [`TripflowError::RoutingNotConverged`].
    pub max_delegations: usize,
    /// Additional oracle attempts (same input) before the turn fails with
    /// [`TripflowError::OracleUnavailable`].
    pub oracle_retries: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_delegations: 4,
            oracle_retries: 2,
        }
    }
}

/// How one turn of graph execution ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The turn produced a final answer; the caller gets the updated state
    /// back for persistence.
    Completed {
        /// The caller-facing answer for this turn.
        answer: String,
        /// The conversation state including everything this turn appended.
        state: ConversationState,
    },
    /// A task node reached an approval gate; the conversation state now
    /// lives inside the checkpoint until the verdict arrives.
    Suspended {
        /// The snapshot to persist and later resume from.
        checkpoint: RunCheckpoint,
    },
}

/// The supervisor state machine for one conversation turn.
///
/// Wires the router to the registered task nodes: the router re-evaluates
/// after every delegation, so a turn may visit several nodes before ending.
pub struct SupervisorGraph {
    registry: NodeRegistry,
    oracle: Arc<dyn DecisionOracle>,
    config: GraphConfig,
}

impl SupervisorGraph {
    /// Creates a graph over the given registry and oracle.
    pub fn new(registry: NodeRegistry, oracle: Arc<dyn DecisionOracle>, config: GraphConfig) -> Self {
        Self {
            registry,
            oracle,
            config,
        }
    }

    /// The registered node names (fallback included).
    pub fn nodes(&self) -> Vec<NodeName> {
        self.registry.names()
    }

    /// Executes one turn from the router until a final answer or suspension.
    pub async fn run(
        &self,
        conversation: &ConversationId,
        state: ConversationState,
    ) -> TripflowResult<RunOutcome> {
        self.run_from(conversation, state, 0).await
    }

    /// Re-enters a suspended turn with the external verdict.
    ///
    /// A rejected verdict appends exactly one "not performed" node message
    /// and hands control back to the router — the supervisor always gets a
    /// chance to comment. An approved verdict re-executes only the guarded
    /// action, via [`crate::TaskNode::resume`].
    pub async fn resume(
        &self,
        checkpoint: RunCheckpoint,
        verdict: ApprovalVerdict,
    ) -> TripflowResult<RunOutcome> {
        let RunCheckpoint {
            conversation,
            node,
            mut state,
            pending,
            hops,
            ..
        } = checkpoint;

        let handler = self.registry.get(node).ok_or_else(|| {
            TripflowError::MalformedCheckpoint(
                conversation.clone(),
                format!("checkpoint references unregistered node '{node}'"),
            )
        })?;

        if !verdict.approved {
            info!(conversation = %conversation, node = %node, action = %pending.action,
                "approval rejected");
            let mut notice = format!("Action '{}' was not performed: rejected by approver.", pending.action);
            if let Some(note) = &verdict.note {
                notice.push_str(&format!(" Note: {note}"));
            }
            state.push(Message::node(node, notice));
            return self.run_from(&conversation, state, hops).await;
        }

        info!(conversation = %conversation, node = %node, action = %pending.action,
            "approval granted, re-entering node");

        match handler.resume(&state, &pending, &verdict).await {
            Ok(NodeOutcome::Completed(message)) => {
                state.push(message);
                self.run_from(&conversation, state, hops).await
            }
            Ok(NodeOutcome::NeedsApproval(next)) => {
                info!(conversation = %conversation, node = %node, action = %next.action,
                    "node raised a further approval gate");
                Ok(RunOutcome::Suspended {
                    checkpoint: RunCheckpoint::new(conversation, state, next, hops),
                })
            }
            Err(e) => {
                warn!(conversation = %conversation, node = %node, error = %e,
                    "node failed during resume");
                state.push(Message::node(node, format!("error: {e}")));
                self.run_from(&conversation, state, hops).await
            }
        }
    }

    /// The router loop. `hops` carries delegations already spent this turn
    /// so the cap holds across suspension and resume.
    async fn run_from(
        &self,
        conversation: &ConversationId,
        mut state: ConversationState,
        mut hops: usize,
    ) -> TripflowResult<RunOutcome> {
        loop {
            let decision = self.route(&state).await?;
            info!(conversation = %conversation, rationale = %decision.rationale, "router decision");

            match decision.target {
                RouteTarget::HandleDirectly { answer } => {
                    state.push(Message::assistant(&answer));
                    return Ok(RunOutcome::Completed { answer, state });
                }
                RouteTarget::Reject => {
                    state.push(Message::system(REJECTION_NOTICE));
                    return Ok(RunOutcome::Completed {
                        answer: REJECTION_NOTICE.to_string(),
                        state,
                    });
                }
                RouteTarget::Delegate(name) => {
                    if hops >= self.config.max_delegations {
                        warn!(conversation = %conversation, hops,
                            "delegation cap reached, aborting turn");
                        return Err(TripflowError::RoutingNotConverged(hops));
                    }
                    hops += 1;

                    let node = self.registry.resolve(name);
                    if node.name() != name {
                        warn!(requested = %name, fallback = %node.name(),
                            "unregistered node requested, using fallback");
                    }
                    info!(conversation = %conversation, node = %node.name(), hop = hops,
                        "delegating to task node");

                    match node.execute(&state).await {
                        Ok(NodeOutcome::Completed(message)) => {
                            state.push(message);
                        }
                        Ok(NodeOutcome::NeedsApproval(pending)) => {
                            info!(conversation = %conversation, node = %pending.node,
                                action = %pending.action, "suspending for approval");
                            return Ok(RunOutcome::Suspended {
                                checkpoint: RunCheckpoint::new(
                                    conversation.clone(),
                                    state,
                                    pending,
                                    hops,
                                ),
                            });
                        }
                        Err(e) => {
                            // Absorbed: the router sees the failure as content
                            // and decides what to do next.
                            warn!(conversation = %conversation, node = %node.name(),
                                error = %e, "task node failed");
                            state.push(Message::node(node.name(), format!("error: {e}")));
                        }
                    }
                }
            }
        }
    }

    /// Invokes the oracle with bounded local retries on the same input.
    async fn route(&self, state: &ConversationState) -> TripflowResult<RoutingDecision> {
        let Some(latest_user) = state.latest_user() else {
            // Nothing to route on; treat like an out-of-domain request.
            return Ok(RoutingDecision::reject("no user input"));
        };

        let mut last_err: Option<TripflowError> = None;
        for attempt in 0..=self.config.oracle_retries {
            match self.oracle.decide(latest_user, state).await {
                Ok(decision) => return Ok(decision),
                Err(e) => {
                    warn!(attempt, error = %e, "oracle call failed");
                    last_err = Some(e);
                }
            }
        }
        Err(TripflowError::OracleUnavailable(
            last_err.map_or_else(String::new, |e| e.to_string()),
        ))
    }
}

impl std::fmt::Debug for SupervisorGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupervisorGraph")
            .field("nodes", &self.registry.names())
            .field("fallback", &self.registry.fallback_name())
            .field("config", &self.config)
            .finish()
    }
}
