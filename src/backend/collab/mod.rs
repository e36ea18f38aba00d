//! Collaborative Editing Core
//!
//! The concurrent edit-ingestion and conflict-resolution pipeline:
//!
//! ```text
//! socket read ──> worker queue (hash(doc_id) % N)
//!                    │ decode → validate → transform → apply → commit
//!                    ▼
//!              broadcast channel ──> fan-out sweep (originator excluded)
//! ```
//!
//! Edits for one document are serialized by deterministic worker routing;
//! different documents run in parallel. Every queue on the hot path is
//! bounded.

/// Connection set and broadcast sweep
pub mod pool;

/// WebSocket upgrade and per-connection tasks
pub mod connection;

/// Worker pool and the per-message pipeline
pub mod worker;

/// Operational transform engine
pub mod transform;

/// Document apply engine
pub mod apply;

/// Single-consumer fan-out task
pub mod broadcast;

pub use broadcast::{run_broadcaster, BroadcastSender};
pub use pool::{BroadcastMessage, ConnectionId, ConnectionPool};
pub use worker::{QueuedMessage, WorkerPool};
