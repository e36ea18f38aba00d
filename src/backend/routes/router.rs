/**
 * Router Configuration
 *
 * Route table:
 *
 * - `GET  /ws`                  - WebSocket upgrade (token-gated)
 * - `POST /api/auth/signup`     - user registration
 * - `POST /api/auth/login`      - user login
 * - `GET  /api/auth/me`         - current user (bearer-gated)
 * - `POST /api/documents`       - create document (bearer-gated)
 * - `GET  /api/documents`       - list documents (bearer-gated)
 * - `GET  /api/documents/{id}`  - fetch one document (bearer-gated)
 *
 * CORS is permissive: the reference editor is a browser client served
 * from elsewhere.
 */

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::backend::auth::handlers::{auth_middleware, login, me, signup};
use crate::backend::collab::connection::handle_ws_upgrade;
use crate::backend::docs::handlers::{create_document, get_document, list_documents};
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/documents", post(create_document).get(list_documents))
        .route("/api/documents/{id}", get(get_document))
        .layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/ws", get(handle_ws_upgrade))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
