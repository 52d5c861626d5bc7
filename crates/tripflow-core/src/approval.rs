//! Approval-gate payloads.
//!
//! These types live in `tripflow-core` so that the graph engine (which
//! suspends on them), the session layer (which persists them inside
//! checkpoints), and the task nodes (which raise them) can share them
//! without circular dependencies.

use crate::routing::NodeName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A request for external confirmation of one effectful action.
///
/// Exists only while a conversation is suspended; at most one may be
/// outstanding per conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingApproval {
    /// Name of the guarded action (e.g. `confirm_booking`).
    pub action: String,
    /// Fully-resolved arguments captured at the gate call-site.
    pub args: HashMap<String, serde_json::Value>,
    /// Human-readable summary shown to the approver.
    pub summary: String,
    /// The task node that raised the gate.
    pub node: NodeName,
}

impl PendingApproval {
    /// Creates a pending approval for the given action and originating node.
    pub fn new(action: impl Into<String>, node: NodeName, summary: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            args: HashMap::new(),
            summary: summary.into(),
            node,
        }
    }

    /// Adds one argument to the captured call-site.
    pub fn with_arg(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }
}

/// The verdict supplied by the external approver at resume time.
/// Not persisted once consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalVerdict {
    /// Whether the guarded action may take effect.
    pub approved: bool,
    /// Optional free-form note from the approver.
    pub note: Option<String>,
}

impl ApprovalVerdict {
    /// An approving verdict with no note.
    pub fn approve() -> Self {
        Self {
            approved: true,
            note: None,
        }
    }

    /// A rejecting verdict with no note.
    pub fn deny() -> Self {
        Self {
            approved: false,
            note: None,
        }
    }

    /// Attaches a free-form note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
