//! Specialist task nodes and decision oracles for the Tripflow orchestrator.
//!
//! The three nodes mirror a travel-planning assistant: destination and
//! weather search, itinerary and budget planning, and bookings. Booking
//! confirmations run behind the orchestrator's approval gate. Two
//! [`DecisionOracle`](tripflow_graph::DecisionOracle) implementations are
//! provided: an LLM-backed one speaking the OpenAI chat completions API,
//! and a deterministic keyword heuristic for offline use and tests.

/// The booking node and its approval-gated confirmation.
pub mod booking;
/// OpenAI-compatible chat client.
pub mod llm;
/// Decision oracle implementations.
pub mod oracle;
/// The itinerary and budget planning node.
pub mod planning;
/// The destination and weather search node.
pub mod search;

mod catalog;

pub use booking::BookingNode;
pub use llm::{ChatClient, ChatConfig};
pub use oracle::{KeywordOracle, LlmOracle};
pub use planning::PlanningNode;
pub use search::SearchNode;
