/**
 * Document CRUD Handlers
 *
 * HTTP surface for creating and fetching documents. Edits never travel
 * through here; they go over the WebSocket pipeline. These routes exist so
 * clients can create a document before connecting and load its current
 * snapshot on open.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::backend::error::ApiError;
use crate::backend::server::state::AppState;
use crate::shared::Document;

/// Create-document request
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    /// Document title
    pub title: String,
    /// Initial content, empty when omitted
    #[serde(default)]
    pub content: String,
}

/// Handle `POST /api/documents`
///
/// Creates the document at version 0 and returns it with its assigned ID.
pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    if request.title.is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }

    let document = state
        .store
        .create_document(&request.title, &request.content)
        .await?;

    tracing::info!("[Docs] created document {} '{}'", document.id, document.title);
    Ok((StatusCode::CREATED, Json(document)))
}

/// Handle `GET /api/documents`
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let documents = state.store.list_documents().await?;
    Ok(Json(documents))
}

/// Handle `GET /api/documents/{id}`
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .store
        .document(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("document {} not found", id)))?;

    Ok(Json(document))
}
