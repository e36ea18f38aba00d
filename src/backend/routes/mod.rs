//! Routes Module
//!
//! HTTP and WebSocket route assembly.

/// Router construction
pub mod router;

pub use router::create_router;
