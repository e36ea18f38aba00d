//! codraft - Real-Time Collaborative Text Editing Backend
//!
//! codraft is a collaborative text-editing server: clients hold persistent
//! WebSocket connections, submit insert/delete/replace operations, and the
//! server reconciles concurrent edits with a positional operational
//! transform, persists a versioned document plus an immutable event log,
//! and fans the resolved edit out to every other connection.
//!
//! # Module Structure
//!
//! - **`shared`** - the data model and JSON wire frames clients also use
//! - **`backend`** - the server: edit pipeline, storage, auth, HTTP surface
//!
//! # Pipeline
//!
//! Every inbound frame is routed by `hash(doc_id) % N` to one of N worker
//! tasks, which runs decode, validate, transform, apply and an atomic
//! commit before handing the resolved update to a single broadcaster task.
//! Same-document edits are therefore serialized in arrival order while
//! different documents proceed in parallel.

/// Types shared with client implementations
pub mod shared;

/// Server-side implementation
pub mod backend;
