/**
 * Broadcaster Task
 *
 * Single consumer loop between the worker pool and the connection set.
 * Workers hand resolved edits to a bounded channel; this task drains it and
 * runs one broadcast sweep per message, always excluding the originator.
 *
 * Keeping fan-out on one task preserves the ordering contract: for a single
 * document, clients observe updates in commit order, because the document's
 * worker pushed them into this channel in commit order and one consumer
 * delivers them sequentially. Across documents no order is promised.
 */

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::backend::collab::pool::{BroadcastMessage, ConnectionPool};

/// Sending half handed to every worker
pub type BroadcastSender = mpsc::Sender<BroadcastMessage>;

/// Create the broadcast channel with the given capacity
///
/// The channel is bounded: a slow sweep backpressures the workers instead
/// of queueing unboundedly.
pub fn channel(capacity: usize) -> (BroadcastSender, mpsc::Receiver<BroadcastMessage>) {
    mpsc::channel(capacity)
}

/// Run the fan-out loop until every sender is gone
pub async fn run_broadcaster(
    pool: Arc<ConnectionPool>,
    mut rx: mpsc::Receiver<BroadcastMessage>,
) {
    tracing::info!("[Broadcast] fan-out task started");
    while let Some(message) = rx.recv().await {
        tracing::debug!(
            "[Broadcast] delivering {} bytes to {} connections (excluding {})",
            message.payload.len(),
            pool.len().saturating_sub(1),
            message.exclude
        );
        pool.broadcast(&message.payload, message.exclude);
    }
    tracing::info!("[Broadcast] fan-out task stopped");
}
