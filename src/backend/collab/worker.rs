/**
 * Edit Worker Pool
 *
 * Fixed-size pool of worker tasks, each draining its own bounded inbound
 * queue and running the full pipeline for one message end to end:
 *
 * decode -> validate -> transform -> apply -> commit -> encode -> broadcast
 *
 * # Per-document ordering
 *
 * Dispatch routes every message deterministically by `hash(doc_id) % N`, so
 * all edits for one document land on one single-threaded worker and are
 * processed in arrival order, while different documents run fully in
 * parallel. This is the pool's correctness invariant: two concurrent
 * transform-apply cycles against one document's current version can never
 * happen.
 *
 * # Failure policy
 *
 * Any stage failure drops the message after a log line naming the failing
 * stage. No retry, no partial broadcast, no notification to the sender.
 *
 * # Backpressure
 *
 * Queues are bounded; `dispatch` awaits queue space, which blocks only the
 * producing connection's read task.
 */

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::backend::collab::apply::apply_event;
use crate::backend::collab::broadcast::BroadcastSender;
use crate::backend::collab::pool::{BroadcastMessage, ConnectionId};
use crate::backend::collab::transform::transform_event;
use crate::backend::error::PipelineError;
use crate::backend::store::DocumentStore;
use crate::shared::{DocumentEvent, EditEvent, RouteKey};

/// One raw frame queued for processing
#[derive(Debug)]
pub struct QueuedMessage {
    /// Raw JSON text frame as received from the socket
    pub payload: String,
    /// Connection that sent it, kept only for broadcast exclusion
    pub origin: ConnectionId,
}

/// Handle to the running worker pool
///
/// Cheap to clone; holds the sending half of every worker queue.
#[derive(Clone)]
pub struct WorkerPool {
    queues: Vec<mpsc::Sender<QueuedMessage>>,
}

impl WorkerPool {
    /// Spawn `workers` worker tasks, each with a bounded queue
    pub fn spawn(
        workers: usize,
        queue_capacity: usize,
        store: Arc<dyn DocumentStore>,
        broadcast_tx: BroadcastSender,
    ) -> Self {
        let workers = workers.max(1);
        let mut queues = Vec::with_capacity(workers);

        for index in 0..workers {
            let (tx, mut rx) = mpsc::channel::<QueuedMessage>(queue_capacity.max(1));
            let store = store.clone();
            let broadcast_tx = broadcast_tx.clone();

            tokio::spawn(async move {
                tracing::info!("[Worker {}] started", index);
                while let Some(message) = rx.recv().await {
                    match process_message(store.as_ref(), &broadcast_tx, message).await {
                        Ok(doc_id) => {
                            tracing::debug!("[Worker {}] committed edit for doc {}", index, doc_id);
                        }
                        Err(err) => {
                            tracing::warn!(
                                "[Worker {}] dropped message at {} stage: {}",
                                index,
                                err.stage(),
                                err
                            );
                        }
                    }
                }
                tracing::info!("[Worker {}] stopped", index);
            });

            queues.push(tx);
        }

        Self { queues }
    }

    /// Worker index a frame routes to
    ///
    /// The route key is the parsed numeric document ID, not the raw string:
    /// every wire encoding of one document ("42", "042", "+42") must land on
    /// the same worker, or two workers could run transform-apply cycles
    /// against that document concurrently. Frames whose `doc_id` does not
    /// parse go to worker 0, where the pipeline rejects them properly.
    pub fn route(&self, payload: &str) -> usize {
        let doc_id = serde_json::from_str::<RouteKey>(payload)
            .ok()
            .and_then(|key| key.doc_id.parse::<i64>().ok());
        match doc_id {
            Some(id) => {
                let mut hasher = DefaultHasher::new();
                id.hash(&mut hasher);
                (hasher.finish() % self.queues.len() as u64) as usize
            }
            None => 0,
        }
    }

    /// Enqueue one raw frame onto its document's worker
    ///
    /// Awaits queue space when the worker is saturated.
    pub async fn dispatch(&self, message: QueuedMessage) {
        let index = self.route(&message.payload);
        if self.queues[index].send(message).await.is_err() {
            tracing::error!("[Worker {}] queue closed, frame lost", index);
        }
    }

    /// Number of workers in the pool
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    /// True when the pool has no workers; `spawn` always creates at least one
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

/// Run the full pipeline for one queued frame
///
/// Returns the document ID on success so the worker can log it.
async fn process_message(
    store: &dyn DocumentStore,
    broadcast_tx: &BroadcastSender,
    message: QueuedMessage,
) -> Result<i64, PipelineError> {
    // decode
    let mut event: EditEvent = serde_json::from_str(&message.payload)?;

    // validate
    validate_event(&event)?;

    // transform against missed history, then apply to the snapshot
    let mut document = transform_event(store, &mut event).await?;
    apply_event(&mut document, &mut event)?;

    // commit: snapshot + event record, all-or-nothing
    let record = DocumentEvent {
        doc_id: document.id,
        user_id: event.user_id.clone(),
        operation: event.operation.clone(),
        position: event.position,
        length: event.length,
        content: event.content.clone(),
        version: event.version,
        timestamp: Utc::now(),
    };
    store.commit_edit(&document, &record).await?;

    // encode the fan-out frame: full post-apply content, server version
    let update = event.into_update(&document);
    let payload = serde_json::to_string(&update)?;

    if broadcast_tx
        .send(BroadcastMessage {
            payload,
            exclude: message.origin,
        })
        .await
        .is_err()
    {
        tracing::warn!(
            "[Worker] broadcaster gone, update for doc {} not fanned out",
            document.id
        );
    }

    Ok(document.id)
}

/// Reject frames missing the fields the pipeline cannot run without
///
/// Only `doc_id` and `operation` are checked here; positional bounds belong
/// to the apply engine.
fn validate_event(event: &EditEvent) -> Result<(), PipelineError> {
    if event.doc_id.is_empty() {
        return Err(PipelineError::MissingField { field: "doc_id" });
    }
    if event.operation.is_empty() {
        return Err(PipelineError::MissingField { field: "operation" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::collab::broadcast;
    use crate::backend::store::MemoryStore;
    use crate::shared::{Document, OP_INSERT};
    use assert_matches::assert_matches;
    use uuid::Uuid;

    fn frame(doc_id: &str, operation: &str, position: i64, content: &str, version: i64) -> String {
        serde_json::json!({
            "doc_id": doc_id,
            "user_id": "alice",
            "operation": operation,
            "position": position,
            "length": 0,
            "content": content,
            "doc_version": version,
        })
        .to_string()
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut event = EditEvent {
            doc_id: String::new(),
            user_id: "u".to_string(),
            operation: OP_INSERT.to_string(),
            position: 0,
            length: 0,
            content: String::new(),
            version: 0,
        };
        assert_matches!(
            validate_event(&event),
            Err(PipelineError::MissingField { field: "doc_id" })
        );

        event.doc_id = "1".to_string();
        event.operation = String::new();
        assert_matches!(
            validate_event(&event),
            Err(PipelineError::MissingField { field: "operation" })
        );
    }

    #[tokio::test]
    async fn test_routing_is_deterministic_per_document() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let (broadcast_tx, _broadcast_rx) = broadcast::channel(8);
        let pool = WorkerPool::spawn(4, 8, store, broadcast_tx);

        let first = pool.route(&frame("42", OP_INSERT, 0, "a", 0));
        for _ in 0..16 {
            assert_eq!(pool.route(&frame("42", OP_INSERT, 3, "b", 1)), first);
        }
        assert!(pool.route("not json at all") == 0);
        assert!(!pool.is_empty());
    }

    #[tokio::test]
    async fn test_equivalent_id_encodings_route_to_one_worker() {
        // "042" and "+42" name the same document as "42"; splitting them
        // across workers would break same-document serialization.
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let (broadcast_tx, _broadcast_rx) = broadcast::channel(8);
        let pool = WorkerPool::spawn(8, 8, store, broadcast_tx);

        let canonical = pool.route(&frame("42", OP_INSERT, 0, "a", 0));
        for alias in ["042", "+42", "0042"] {
            assert_eq!(
                pool.route(&frame(alias, OP_INSERT, 0, "a", 0)),
                canonical,
                "doc_id '{}' must route like '42'",
                alias
            );
        }

        // unparseable ids fall through to worker 0 and die in the pipeline
        assert_eq!(pool.route(&frame("not-a-number", OP_INSERT, 0, "a", 0)), 0);
    }

    #[tokio::test]
    async fn test_pipeline_commits_and_broadcasts() {
        let store = Arc::new(MemoryStore::new());
        let mut doc = Document::new(1, "doc", "hello");
        doc.version = 1;
        store.insert_document(doc);

        let (broadcast_tx, mut broadcast_rx) = broadcast::channel(8);
        let pool = WorkerPool::spawn(2, 8, store.clone() as Arc<dyn DocumentStore>, broadcast_tx);

        let origin = Uuid::new_v4();
        pool.dispatch(QueuedMessage {
            payload: frame("1", OP_INSERT, 5, " world", 1),
            origin,
        })
        .await;

        let out = broadcast_rx.recv().await.unwrap();
        assert_eq!(out.exclude, origin);
        let update: EditEvent = serde_json::from_str(&out.payload).unwrap();
        assert_eq!(update.content, "hello world", "fan-out carries full content");
        assert_eq!(update.version, 2);

        let stored = store.document(1).await.unwrap().unwrap();
        assert_eq!(stored.content, "hello world");
        assert_eq!(stored.version, 2);
        let events = store.events_after(1, 0).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].version, 2);
    }

    #[tokio::test]
    async fn test_failed_message_is_dropped_silently() {
        let store = Arc::new(MemoryStore::new());
        store.insert_document(Document::new(1, "doc", "abc"));

        let (broadcast_tx, mut broadcast_rx) = broadcast::channel(8);
        let pool = WorkerPool::spawn(1, 8, store.clone() as Arc<dyn DocumentStore>, broadcast_tx);

        // out-of-range delete, then a valid insert
        pool.dispatch(QueuedMessage {
            payload: serde_json::json!({
                "doc_id": "1", "user_id": "alice", "operation": "delete",
                "position": 1, "length": 5, "doc_version": 0,
            })
            .to_string(),
            origin: Uuid::new_v4(),
        })
        .await;
        pool.dispatch(QueuedMessage {
            payload: frame("1", OP_INSERT, 3, "!", 0),
            origin: Uuid::new_v4(),
        })
        .await;

        // only the valid edit produces a broadcast, and the bad delete
        // left the document untouched
        let out = broadcast_rx.recv().await.unwrap();
        let update: EditEvent = serde_json::from_str(&out.payload).unwrap();
        assert_eq!(update.content, "abc!");
        assert_eq!(update.version, 1);

        let stored = store.document(1).await.unwrap().unwrap();
        assert_eq!(stored.version, 1, "dropped edit never advanced the version");
    }
}
