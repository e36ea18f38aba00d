//! Backend Error Module
//!
//! Error types for the server: the stage-tagged `PipelineError` used by
//! the edit workers, and the `ApiError` returned by HTTP handlers.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::{ApiError, PipelineError};
