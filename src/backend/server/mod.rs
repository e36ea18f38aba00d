//! Server Module
//!
//! Configuration, shared application state, and server assembly.

/// Environment configuration
pub mod config;

/// Application state container
pub mod state;

/// Application assembly
pub mod init;

pub use config::ServerConfig;
pub use init::create_app;
pub use state::AppState;
