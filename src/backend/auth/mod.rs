//! Authentication Module
//!
//! JWT-based authentication: user rows in PostgreSQL, bcrypt password
//! hashing, token issue/verify, and the bearer middleware for the HTTP
//! surface. Authentication gates the document API and the WebSocket
//! upgrade; the edit pipeline itself never touches it.

/// JWT session tokens
pub mod sessions;

/// User rows and queries
pub mod users;

/// Signup/login/me handlers and bearer middleware
pub mod handlers;

pub use handlers::auth_middleware;
pub use sessions::{create_token, verify_token, Claims};
