//! Shared Module
//!
//! Types shared between the server and client implementations of the edit
//! protocol: the document data model, the JSON wire frames, and the errors
//! both sides can produce while handling them.

/// Document and event data model
pub mod document;

/// Edit wire frames
pub mod event;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use document::{Document, DocumentEvent};
pub use error::SharedError;
pub use event::{EditEvent, RouteKey, OP_DELETE, OP_INSERT, OP_REPLACE};
