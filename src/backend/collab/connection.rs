/**
 * WebSocket Connection Handling
 *
 * Upgrade endpoint and per-connection tasks for the edit transport.
 *
 * # Lifecycle
 *
 * 1. `GET /ws?token=<jwt>` - the token is verified BEFORE the upgrade;
 *    authentication gates the connection only and is never consulted again
 *    inside the pipeline.
 * 2. On upgrade the connection registers with the pool and two tasks run:
 *    a writer draining the pool's outbound channel into the socket sink,
 *    and a read loop feeding inbound text frames to the worker pool.
 * 3. The first read or write error ends the connection. Deregistration is
 *    idempotent, so the read loop and the writer can both report it.
 *    Frames the connection already queued still process to completion.
 *
 * Transport errors stay in this module and the pool; they never propagate
 * into worker or broadcaster logic.
 */

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::backend::auth::sessions::verify_token;
use crate::backend::collab::worker::QueuedMessage;
use crate::backend::server::state::AppState;

/// Query parameters of the upgrade request
///
/// Browsers cannot set headers on a WebSocket handshake, so the bearer
/// token travels as a query parameter.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// JWT issued by login/signup
    pub token: String,
}

/// Handle `GET /ws`: authenticate, then upgrade
pub async fn handle_ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let claims = match verify_token(&params.token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!("[Collab] upgrade refused, invalid token: {}", err);
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_connection(socket, state, claims.sub))
}

/// Drive one live connection until its socket dies
pub async fn handle_connection(socket: WebSocket, state: AppState, user_id: String) {
    let (conn_id, mut outbound_rx) = state.connections.register();
    tracing::info!("[Collab] connection {} opened for user {}", conn_id, user_id);

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer task: pool -> socket. A write failure deregisters this
    // connection only; the pool sweep keeps every other member alive.
    let writer_pool = state.connections.clone();
    tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if let Err(err) = ws_tx.send(message).await {
                tracing::warn!("[Collab] connection {} write failed: {}", conn_id, err);
                break;
            }
        }
        // Also reached when deregistration elsewhere closes the channel.
        writer_pool.deregister(conn_id);
    });

    // Read loop: socket -> worker queues. Enqueueing awaits queue space
    // (backpressure) but never runs any business logic here.
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                state
                    .workers
                    .dispatch(QueuedMessage {
                        payload: text.to_string(),
                        origin: conn_id,
                    })
                    .await;
            }
            Ok(Message::Close(_)) => {
                tracing::info!("[Collab] connection {} closed by client", conn_id);
                break;
            }
            Ok(_) => {
                // ping/pong and binary frames carry no edits
            }
            Err(err) => {
                tracing::warn!("[Collab] connection {} read failed: {}", conn_id, err);
                break;
            }
        }
    }

    state.connections.deregister(conn_id);
}
