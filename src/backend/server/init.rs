/**
 * Server Initialization
 *
 * Assembles the application: storage, connection pool, broadcaster, edit
 * workers, and the router.
 *
 * # Initialization Steps
 *
 * 1. Connect storage: PostgreSQL when configured, in-memory otherwise.
 * 2. Create the connection pool and the bounded broadcast channel.
 * 3. Spawn the single broadcaster task.
 * 4. Spawn the worker pool with its bounded per-worker queues.
 * 5. Build the router over the shared state.
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::collab::{broadcast, ConnectionPool, WorkerPool};
use crate::backend::routes::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::{DocumentStore, MemoryStore, PgStore};

/// Create and configure the Axum application
pub async fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!("Initializing codraft server");

    // Step 1: storage
    let db_pool = load_database(config).await;
    let store: Arc<dyn DocumentStore> = match &db_pool {
        Some(pool) => Arc::new(PgStore::new(pool.clone())),
        None => Arc::new(MemoryStore::new()),
    };

    // Step 2: connection pool and broadcast channel
    let connections = Arc::new(ConnectionPool::new());
    let (broadcast_tx, broadcast_rx) = broadcast::channel(config.queue_capacity);

    // Step 3: broadcaster task
    tokio::spawn(broadcast::run_broadcaster(connections.clone(), broadcast_rx));

    // Step 4: edit workers
    let workers = WorkerPool::spawn(
        config.workers,
        config.queue_capacity,
        store.clone(),
        broadcast_tx,
    );
    tracing::info!(
        "Edit pipeline ready: {} workers, queue capacity {}",
        workers.len(),
        config.queue_capacity
    );

    // Step 5: router
    let app_state = AppState {
        store,
        connections,
        workers,
        db_pool,
    };

    create_router(app_state)
}
