//! Backend Module
//!
//! Server-side implementation of the collaborative editing service.
//!
//! # Architecture
//!
//! - **`collab`** - the edit pipeline core: connection pool, workers,
//!   operational transform, apply engine, broadcaster
//! - **`store`** - document storage seam (PostgreSQL or in-memory)
//! - **`auth`** - JWT sessions, user accounts, bearer middleware
//! - **`docs`** - document CRUD over HTTP
//! - **`server`** - configuration, state, assembly
//! - **`routes`** - route table
//! - **`error`** - pipeline and API error types

/// Collaborative editing core
pub mod collab;

/// Document storage
pub mod store;

/// Authentication
pub mod auth;

/// Document CRUD HTTP surface
pub mod docs;

/// Server configuration and assembly
pub mod server;

/// Route assembly
pub mod routes;

/// Error types
pub mod error;
