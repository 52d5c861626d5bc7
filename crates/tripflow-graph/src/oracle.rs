use async_trait::async_trait;
use tripflow_core::{ConversationState, Message, RoutingDecision, TripflowResult};

/// The injected routing capability the router consults on every entry.
///
/// Implementations receive the latest user message plus the full history
/// (so they can see task-node results from earlier hops of the same turn)
/// and return a [`RoutingDecision`]. Implementations that parse model
/// output must map unparseable text to a delegation to the fallback node
/// rather than failing; errors from this trait mean the oracle itself is
/// unreachable and are retried by the engine.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Produce a routing decision for the current conversation.
    async fn decide(
        &self,
        latest_user: &Message,
        history: &ConversationState,
    ) -> TripflowResult<RoutingDecision>;
}
