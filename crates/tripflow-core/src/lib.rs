//! Core types and error definitions for the Tripflow orchestrator.
//!
//! This crate provides the foundational types shared across all Tripflow
//! crates: the conversation data model, routing decisions, approval
//! payloads, and the unified error taxonomy.
//!
//! # Main types
//!
//! - [`TripflowError`] — Closed error taxonomy for all Tripflow subsystems.
//! - [`TripflowResult`] — Convenience alias for `Result<T, TripflowError>`.
//! - [`ConversationId`] / [`ConversationState`] / [`Message`] — The
//!   append-only conversation model.
//! - [`NodeName`] / [`RoutingDecision`] — Router vocabulary.
//! - [`PendingApproval`] / [`ApprovalVerdict`] — Approval-gate payloads.

/// Approval-gate payload types.
pub mod approval;
/// Conversation identifiers, messages, and state.
pub mod conversation;
/// Task-node names and router decisions.
pub mod routing;

pub use approval::{ApprovalVerdict, PendingApproval};
pub use conversation::{ConversationId, ConversationState, Message, Role};
pub use routing::{NodeName, RouteTarget, RoutingDecision};

/// Top-level error type for the Tripflow orchestrator.
///
/// Node-level failures are absorbed into conversation content by the graph
/// engine; the variants here are the failures that surface to callers.
#[derive(Debug, thiserror::Error)]
pub enum TripflowError {
    /// The decision oracle could not be reached after local retries.
    #[error("routing unavailable: {0}")]
    OracleUnavailable(String),

    /// A task node failed while executing. Captured by the engine and turned
    /// into conversation content; surfaced directly only on resume failures.
    #[error("node '{node}' failed: {reason}")]
    NodeExecution {
        /// The node that failed.
        node: routing::NodeName,
        /// Human-readable failure description.
        reason: String,
    },

    /// The router did not converge within the configured delegation cap.
    #[error("routing did not converge after {0} delegations")]
    RoutingNotConverged(usize),

    /// `resume` was called for a conversation with no outstanding approval.
    #[error("nothing to approve for conversation '{0}'")]
    NoPendingApproval(conversation::ConversationId),

    /// `submit` was called while an approval is still outstanding. The
    /// pending action must be settled through `resume` first.
    #[error("conversation '{0}' has a pending approval; resume it first")]
    ApprovalPending(conversation::ConversationId),

    /// A stored checkpoint exists but cannot be decoded. Fatal for that
    /// conversation only.
    #[error("malformed checkpoint for conversation '{0}': {1}")]
    MalformedCheckpoint(conversation::ConversationId, String),

    /// An error from a conversation or checkpoint store backend.
    #[error("store error: {0}")]
    Store(String),

    /// An error from an outbound HTTP request (e.g. LLM API call).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`TripflowError`].
pub type TripflowResult<T> = Result<T, TripflowError>;
