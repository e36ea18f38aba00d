/**
 * Connection Pool
 *
 * Owns the live connection set. Each registered connection is represented
 * by the sending half of an unbounded channel; a per-connection writer task
 * drains the receiving half into the WebSocket sink. One mutex guards the
 * whole set and spans register, deregister and the broadcast sweep.
 *
 * # Failure handling
 *
 * A send into a connection's channel fails only when its writer task has
 * dropped the receiver (the socket died). The broadcast sweep removes such
 * members inline and keeps going; `deregister` is idempotent, so the writer
 * task and the read loop can both report the same death safely.
 */

use std::collections::HashMap;
use std::sync::Mutex;

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identifier for one live connection
pub type ConnectionId = Uuid;

/// One resolved edit queued for fan-out
#[derive(Debug)]
pub struct BroadcastMessage {
    /// Encoded outbound frame
    pub payload: String,
    /// Originating connection, excluded from the sweep
    pub exclude: ConnectionId,
}

/// Live connection set
pub struct ConnectionPool {
    connections: Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<Message>>>,
}

impl ConnectionPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Add a connection to the set
    ///
    /// Returns the assigned connection ID and the receiving half the
    /// connection's writer task drains into its socket.
    pub fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<Message>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.lock().unwrap().insert(id, tx);
        tracing::info!("[Pool] connection {} registered", id);
        (id, rx)
    }

    /// Remove a connection from the set
    ///
    /// Idempotent: removing an already-removed connection is a no-op.
    pub fn deregister(&self, id: ConnectionId) {
        if self.connections.lock().unwrap().remove(&id).is_some() {
            tracing::info!("[Pool] connection {} deregistered", id);
        }
    }

    /// Deliver a payload to every member except `exclude`
    ///
    /// Members whose channel is closed are removed during the sweep; the
    /// sweep continues for the rest.
    pub fn broadcast(&self, payload: &str, exclude: ConnectionId) {
        let mut connections = self.connections.lock().unwrap();
        let before = connections.len();
        connections.retain(|id, tx| {
            if *id == exclude {
                return true;
            }
            match tx.send(Message::text(payload)) {
                Ok(()) => true,
                Err(_) => {
                    tracing::warn!("[Pool] connection {} dropped during broadcast", id);
                    false
                }
            }
        });
        let swept = before - connections.len();
        if swept > 0 {
            tracing::debug!("[Pool] removed {} dead connections in sweep", swept);
        }
    }

    /// Number of live connections
    pub fn len(&self) -> usize {
        self.connections.lock().unwrap().len()
    }

    /// True when no connections are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::new()
    }
}
