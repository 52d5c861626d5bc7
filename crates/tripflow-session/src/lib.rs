//! Session layer for the Tripflow orchestrator.
//!
//! Owns durable per-conversation storage (conversation state and run
//! checkpoints, each with in-memory and file-backed implementations) and
//! the session front door — the single `submit`/`resume` entry point
//! external callers use.

/// Checkpoint persistence.
pub mod checkpoints;
/// The session front door.
pub mod service;
/// Conversation-state persistence.
pub mod store;

pub use checkpoints::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
pub use service::{SessionService, TurnResult};
pub use store::{ConversationStore, FileConversationStore, MemoryConversationStore};
