//! Document HTTP Module
//!
//! CRUD routes for document snapshots. The edit path never goes through
//! HTTP; these routes only bootstrap clients before they join the
//! WebSocket session.

/// CRUD handlers
pub mod handlers;

pub use handlers::{create_document, get_document, list_documents};
