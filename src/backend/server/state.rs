/**
 * Application State
 *
 * Central state container for the Axum application. Every component
 * receives its dependencies from here; there is no process-global state.
 *
 * # Thread Safety
 *
 * - `Arc<dyn DocumentStore>` - storage handle shared by workers and the
 *   HTTP surface
 * - `Arc<ConnectionPool>` - the only directly shared mutable structure,
 *   internally mutex-guarded
 * - `WorkerPool` - clone-able bundle of queue senders
 * - `Option<PgPool>` - user database; `None` disables the auth surface
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::collab::{ConnectionPool, WorkerPool};
use crate::backend::store::DocumentStore;

/// Application state shared across all handlers and tasks
#[derive(Clone)]
pub struct AppState {
    /// Document storage handle
    pub store: Arc<dyn DocumentStore>,

    /// Live connection set
    pub connections: Arc<ConnectionPool>,

    /// Edit worker pool (inbound queue senders)
    pub workers: WorkerPool,

    /// User database; `None` when running storage-only
    pub db_pool: Option<PgPool>,
}

/// Allow auth handlers to extract just the user database pool
impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}
