//! Orchestration graph for the Tripflow supervisor.
//!
//! Implements the router/worker state machine for one conversation turn:
//! `START → ROUTER → task node → ROUTER → … → END`, with an interrupt
//! protocol that lets a task node suspend mid-turn behind an approval gate
//! and resume later from exactly that point.
//!
//! # Main types
//!
//! - [`SupervisorGraph`] — Executes one turn to completion or suspension.
//! - [`TaskNode`] / [`NodeOutcome`] — The unit-of-work seam; suspension is
//!   an ordinary result variant, never an error.
//! - [`NodeRegistry`] — Closed name → handler mapping, validated at
//!   construction.
//! - [`DecisionOracle`] — The injected routing capability.
//! - [`RunCheckpoint`] — The durable snapshot that survives between
//!   suspension and resume.

/// Resumable execution snapshots.
pub mod checkpoint;
/// The router loop and resume protocol.
pub mod engine;
/// Task-node trait, outcomes, and the node registry.
pub mod node;
/// The decision-oracle seam.
pub mod oracle;

pub use checkpoint::RunCheckpoint;
pub use engine::{GraphConfig, RunOutcome, SupervisorGraph};
pub use node::{GraphBuildError, NodeOutcome, NodeRegistry, TaskNode};
pub use oracle::DecisionOracle;
