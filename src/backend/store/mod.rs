/**
 * Document Store
 *
 * Storage seam for the edit pipeline. Components receive the store as an
 * injected `Arc<dyn DocumentStore>` in their constructors; there is no
 * process-global storage handle.
 *
 * # Implementations
 *
 * - `PgStore` - PostgreSQL via sqlx; `commit_edit` runs as one transaction.
 * - `MemoryStore` - in-process maps; backs tests and database-less runs.
 *
 * # Atomicity and serialization
 *
 * `commit_edit` persists the document snapshot and appends its event as one
 * all-or-nothing unit. Same-document serialization itself is the worker
 * pool's job (deterministic routing); the store only reinforces it with a
 * version guard that rejects a snapshot not exactly one version ahead of the
 * stored row.
 */

use async_trait::async_trait;
use thiserror::Error;

use crate::shared::{Document, DocumentEvent};

/// In-memory store implementation
pub mod memory;

/// PostgreSQL store implementation
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage failure
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure; the whole commit unit rolled back
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The committed snapshot was not exactly one version ahead of the row
    ///
    /// Indicates a lost-update race that per-document routing should make
    /// impossible; surfaced loudly instead of silently overwriting history.
    #[error("version conflict on document {doc_id}: tried to commit version {attempted}")]
    VersionConflict {
        /// Document the commit targeted
        doc_id: i64,
        /// Version the commit tried to write
        attempted: i64,
    },
}

/// Transactional storage of document snapshots and their event log
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a new document at version 0 and return it with its assigned ID
    async fn create_document(&self, title: &str, content: &str) -> Result<Document, StoreError>;

    /// Fetch one document by ID
    async fn document(&self, id: i64) -> Result<Option<Document>, StoreError>;

    /// List all documents
    async fn list_documents(&self) -> Result<Vec<Document>, StoreError>;

    /// Events for `doc_id` with version strictly greater than
    /// `min_version_exclusive`, ascending by version
    async fn events_after(
        &self,
        doc_id: i64,
        min_version_exclusive: i64,
    ) -> Result<Vec<DocumentEvent>, StoreError>;

    /// Atomically save the document snapshot and append its event
    ///
    /// `document.version` must equal the stored version + 1 and must match
    /// `event.version`; both are persisted together or not at all.
    async fn commit_edit(
        &self,
        document: &Document,
        event: &DocumentEvent,
    ) -> Result<(), StoreError>;
}
