use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tripflow_core::{ConversationId, ConversationState, NodeName, PendingApproval};

/// The serialized position of a suspended graph execution.
///
/// Created when a task node raises an approval gate; consumed when the
/// conversation is resumed with a verdict. Ownership of the conversation
/// state transfers into the checkpoint at suspension and back to the graph
/// at resume — a suspended conversation holds no other resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCheckpoint {
    /// The conversation this checkpoint belongs to.
    pub conversation: ConversationId,
    /// The task node that was interrupted.
    pub node: NodeName,
    /// The conversation state as of suspension.
    pub state: ConversationState,
    /// The approval request that caused the suspension.
    pub pending: PendingApproval,
    /// Delegations already spent this turn; the cap spans suspension.
    pub hops: usize,
    /// UTC timestamp of when the suspension occurred.
    pub created_at: DateTime<Utc>,
}

impl RunCheckpoint {
    /// Creates a checkpoint for a suspension at the given node.
    pub fn new(
        conversation: ConversationId,
        state: ConversationState,
        pending: PendingApproval,
        hops: usize,
    ) -> Self {
        Self {
            conversation,
            node: pending.node,
            state,
            pending,
            hops,
            created_at: Utc::now(),
        }
    }
}
