use crate::checkpoints::CheckpointStore;
use crate::store::ConversationStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tripflow_core::{
    ApprovalVerdict, ConversationId, ConversationState, Message, TripflowError, TripflowResult,
};
use tripflow_graph::{RunOutcome, SupervisorGraph};

/// What one `submit` or `resume` turn produced for the caller.
#[derive(Debug)]
pub enum TurnResult {
    /// The turn completed with a final answer.
    Answer {
        /// The caller-facing answer text.
        text: String,
    },
    /// The turn suspended at an approval gate; settle it with
    /// [`SessionService::resume`].
    NeedsApproval {
        /// Name of the guarded action.
        action: String,
        /// Human-readable summary for the approver.
        summary: String,
        /// The captured action arguments.
        args: HashMap<String, serde_json::Value>,
    },
}

/// The single entry point external callers use.
///
/// Translates inbound messages and approval verdicts into graph runs, and
/// graph outcomes into [`TurnResult`]s. Calls for the same conversation are
/// serialized behind a per-id async mutex; distinct conversations run fully
/// in parallel. Store instances are supplied by whoever assembles the
/// system — there is no ambient global state.
pub struct SessionService {
    graph: Arc<SupervisorGraph>,
    conversations: Arc<dyn ConversationStore>,
    checkpoints: Arc<dyn CheckpointStore>,
    locks: Mutex<HashMap<ConversationId, Arc<Mutex<()>>>>,
}

impl SessionService {
    /// Creates the front door over a graph and explicit store instances.
    pub fn new(
        graph: Arc<SupervisorGraph>,
        conversations: Arc<dyn ConversationStore>,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            graph,
            conversations,
            checkpoints,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Handles one inbound user message.
    ///
    /// Fails with [`TripflowError::ApprovalPending`] while an approval is
    /// outstanding for this conversation — the pending action must be
    /// settled through [`Self::resume`] first.
    pub async fn submit(&self, id: &ConversationId, text: &str) -> TripflowResult<TurnResult> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        if self.checkpoints.load(id).await?.is_some() {
            return Err(TripflowError::ApprovalPending(id.clone()));
        }

        let mut state = self
            .conversations
            .load(id)
            .await?
            .unwrap_or_else(ConversationState::new);
        state.push(Message::user(text));

        info!(conversation = %id, turn_len = state.len(), "submit");
        let outcome = self.graph.run(id, state).await?;
        self.settle(id, outcome).await
    }

    /// Settles an outstanding approval with the caller's verdict.
    ///
    /// Fails with [`TripflowError::NoPendingApproval`] when nothing is
    /// suspended for this conversation. The stored checkpoint is consumed
    /// exactly once; a later gate in the same turn saves a fresh one.
    pub async fn resume(
        &self,
        id: &ConversationId,
        verdict: ApprovalVerdict,
    ) -> TripflowResult<TurnResult> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let Some(checkpoint) = self.checkpoints.load(id).await? else {
            return Err(TripflowError::NoPendingApproval(id.clone()));
        };
        self.checkpoints.clear(id).await?;

        info!(conversation = %id, action = %checkpoint.pending.action,
            approved = verdict.approved, "resume");
        let outcome = self.graph.resume(checkpoint, verdict).await?;
        self.settle(id, outcome).await
    }

    /// Folds a graph outcome into stores and the caller-facing result.
    async fn settle(&self, id: &ConversationId, outcome: RunOutcome) -> TripflowResult<TurnResult> {
        match outcome {
            RunOutcome::Completed { answer, state } => {
                self.checkpoints.clear(id).await?;
                self.conversations.save(id, &state).await?;
                Ok(TurnResult::Answer { text: answer })
            }
            RunOutcome::Suspended { checkpoint } => {
                let result = TurnResult::NeedsApproval {
                    action: checkpoint.pending.action.clone(),
                    summary: checkpoint.pending.summary.clone(),
                    args: checkpoint.pending.args.clone(),
                };
                self.checkpoints.save(&checkpoint).await?;
                Ok(result)
            }
        }
    }

    /// The serialization mutex for one conversation id.
    async fn lock_for(&self, id: &ConversationId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Direct access to the checkpoint store (e.g. for inspection tools).
    pub fn checkpoints(&self) -> &Arc<dyn CheckpointStore> {
        &self.checkpoints
    }
}

