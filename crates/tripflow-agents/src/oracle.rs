use crate::llm::ChatClient;
use async_trait::async_trait;
use tracing::{debug, warn};
use tripflow_core::{ConversationState, Message, NodeName, RoutingDecision, TripflowResult};
use tripflow_graph::DecisionOracle;

const ROUTING_SYSTEM: &str = "You are a travel planning supervisor. Analyze the \
user request and decide how to handle it.\n\n\
Available specialist agents:\n\
- SEARCH: Find destinations, weather, location information\n\
- PLANNING: Create itineraries, calculate budgets, plan trips\n\
- BOOKING: Search accommodations, flights, make reservations\n\n\
Rules:\n\
1. If a specialist should handle it, respond with exactly one word: SEARCH, PLANNING, or BOOKING\n\
2. If you can reply directly without a specialist, respond with: ANSWER: <your reply>\n\
3. If it is completely off-topic (not about travel), respond with: REJECT";

/// Routing oracle backed by an OpenAI-compatible chat model.
///
/// The model is asked for a single-token decision. Once a specialist has
/// contributed to the turn, its reply is surfaced as the final answer
/// without another model call, matching the one-delegation-per-turn shape
/// of the routing prompt.
pub struct LlmOracle {
    client: ChatClient,
}

impl LlmOracle {
    /// Creates an oracle over the given chat client.
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DecisionOracle for LlmOracle {
    async fn decide(
        &self,
        latest_user: &Message,
        history: &ConversationState,
    ) -> TripflowResult<RoutingDecision> {
        if let Some(reply) = specialist_reply(history) {
            return Ok(RoutingDecision::direct(reply, "specialist replied"));
        }

        let prompt = format!("User request: \"{}\"\n\nYour decision:", latest_user.content);
        let raw = self.client.complete(ROUTING_SYSTEM, &prompt).await?;
        debug!(decision = %raw.trim(), "model routing decision");
        Ok(parse_routing(&raw))
    }
}

/// The content of the last message when a task node produced it.
fn specialist_reply(history: &ConversationState) -> Option<String> {
    history
        .last()
        .filter(|m| m.origin.is_some())
        .map(|m| m.content.clone())
}

/// Maps a raw model reply onto a routing decision.
///
/// Anything unrecognized routes to the search node, the safe default for
/// a travel request the model failed to classify.
fn parse_routing(raw: &str) -> RoutingDecision {
    let trimmed = raw.trim();
    for prefix in ["ANSWER:", "DONE:"] {
        if let Some(answer) = strip_prefix_ci(trimmed, prefix) {
            return RoutingDecision::direct(answer.trim(), "model answered directly");
        }
    }
    match trimmed.to_uppercase().as_str() {
        "SEARCH" => RoutingDecision::delegate(NodeName::Search, "model routed to search"),
        "PLANNING" => RoutingDecision::delegate(NodeName::Planning, "model routed to planning"),
        "BOOKING" => RoutingDecision::delegate(NodeName::Booking, "model routed to booking"),
        "REJECT" => RoutingDecision::reject("model classified as off-topic"),
        other => {
            warn!(decision = other, "unrecognized routing decision, defaulting to search");
            RoutingDecision::delegate(NodeName::Search, "unrecognized decision")
        }
    }
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Deterministic keyword-based routing, for offline runs and tests.
///
/// Applies the same wrap-up rule as [`LlmOracle`]: a specialist reply in
/// the last position becomes the final answer.
#[derive(Default)]
pub struct KeywordOracle;

impl KeywordOracle {
    /// Creates the oracle.
    pub fn new() -> Self {
        Self
    }
}

const BOOKING_WORDS: &[&str] = &["book", "reserve", "reservation", "confirm", "flight", "hotel", "accommodation"];
const PLANNING_WORDS: &[&str] = &["plan", "itinerary", "budget", "schedule", "days"];
const TRAVEL_WORDS: &[&str] = &[
    "travel", "trip", "destination", "weather", "beach", "culture", "adventure", "visit",
    "vacation", "holiday", "island", "city", "where",
];

#[async_trait]
impl DecisionOracle for KeywordOracle {
    async fn decide(
        &self,
        latest_user: &Message,
        history: &ConversationState,
    ) -> TripflowResult<RoutingDecision> {
        if let Some(reply) = specialist_reply(history) {
            return Ok(RoutingDecision::direct(reply, "specialist replied"));
        }

        let text = latest_user.content.to_lowercase();
        let contains_any = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if contains_any(BOOKING_WORDS) {
            Ok(RoutingDecision::delegate(NodeName::Booking, "booking keywords"))
        } else if contains_any(PLANNING_WORDS) {
            Ok(RoutingDecision::delegate(NodeName::Planning, "planning keywords"))
        } else if contains_any(TRAVEL_WORDS) {
            Ok(RoutingDecision::delegate(NodeName::Search, "travel keywords"))
        } else {
            Ok(RoutingDecision::reject("no travel keywords"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tripflow_core::RouteTarget;

    #[test]
    fn one_token_decisions_parse() {
        assert!(matches!(
            parse_routing("SEARCH").target,
            RouteTarget::Delegate(NodeName::Search)
        ));
        assert!(matches!(
            parse_routing("  booking \n").target,
            RouteTarget::Delegate(NodeName::Booking)
        ));
        assert!(matches!(parse_routing("REJECT").target, RouteTarget::Reject));
    }

    #[test]
    fn answer_prefix_becomes_a_direct_reply() {
        let decision = parse_routing("answer: Pack light, Rome is warm in May.");
        match decision.target {
            RouteTarget::HandleDirectly { answer } => {
                assert_eq!(answer, "Pack light, Rome is warm in May.");
            }
            other => panic!("expected direct answer, got {other:?}"),
        }
    }

    #[test]
    fn done_prefix_also_ends_the_turn() {
        let decision = parse_routing("DONE: Your trip is all set.");
        assert!(matches!(decision.target, RouteTarget::HandleDirectly { .. }));
    }

    #[test]
    fn garbage_defaults_to_search() {
        assert!(matches!(
            parse_routing("I think maybe the user wants...").target,
            RouteTarget::Delegate(NodeName::Search)
        ));
    }

    #[tokio::test]
    async fn keyword_oracle_routes_by_intent() {
        let oracle = KeywordOracle::new();
        let history = ConversationState::new();

        let decision = oracle
            .decide(&Message::user("Book a hotel in Bali"), &history)
            .await
            .unwrap();
        assert!(matches!(decision.target, RouteTarget::Delegate(NodeName::Booking)));

        let decision = oracle
            .decide(&Message::user("Plan a 5 day itinerary for Kyoto"), &history)
            .await
            .unwrap();
        assert!(matches!(decision.target, RouteTarget::Delegate(NodeName::Planning)));

        let decision = oracle
            .decide(&Message::user("What's the weather in Rome?"), &history)
            .await
            .unwrap();
        assert!(matches!(decision.target, RouteTarget::Delegate(NodeName::Search)));

        let decision = oracle
            .decide(&Message::user("Write me a sorting algorithm"), &history)
            .await
            .unwrap();
        assert!(matches!(decision.target, RouteTarget::Reject));
    }

    #[tokio::test]
    async fn specialist_reply_ends_the_turn() {
        let oracle = KeywordOracle::new();
        let mut history = ConversationState::new();
        history.push(Message::user("What's the weather in Rome?"));
        history.push(Message::node(NodeName::Search, "Rome: 18-28C, low rainfall."));

        let decision = oracle
            .decide(&Message::user("What's the weather in Rome?"), &history)
            .await
            .unwrap();
        match decision.target {
            RouteTarget::HandleDirectly { answer } => assert!(answer.contains("18-28C")),
            other => panic!("expected direct answer, got {other:?}"),
        }
    }
}
