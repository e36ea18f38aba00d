/**
 * PostgreSQL Document Store
 *
 * `DocumentStore` backed by PostgreSQL via sqlx. The commit path runs the
 * snapshot update and the event append inside one transaction: either both
 * land or the whole unit rolls back.
 */

use async_trait::async_trait;
use sqlx::PgPool;

use crate::backend::store::{DocumentStore, StoreError};
use crate::shared::{Document, DocumentEvent};

/// PostgreSQL-backed document store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn create_document(&self, title: &str, content: &str) -> Result<Document, StoreError> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (title, content, version)
            VALUES ($1, $2, 0)
            RETURNING id, title, content, version
            "#,
        )
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    async fn document(&self, id: i64) -> Result<Option<Document>, StoreError> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, title, content, version
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, title, content, version
            FROM documents
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    async fn events_after(
        &self,
        doc_id: i64,
        min_version_exclusive: i64,
    ) -> Result<Vec<DocumentEvent>, StoreError> {
        let events = sqlx::query_as::<_, DocumentEvent>(
            r#"
            SELECT doc_id, user_id, operation, position, length, content, version, timestamp
            FROM document_events
            WHERE doc_id = $1 AND version > $2
            ORDER BY version ASC
            "#,
        )
        .bind(doc_id)
        .bind(min_version_exclusive)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn commit_edit(
        &self,
        document: &Document,
        event: &DocumentEvent,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Database)?;

        // The version guard rejects any snapshot that is not exactly one
        // ahead of the stored row. Per-document worker routing makes a
        // conflict unreachable in normal operation.
        let updated = sqlx::query(
            r#"
            UPDATE documents
            SET content = $1, version = $2, title = $3
            WHERE id = $4 AND version = $5
            "#,
        )
        .bind(&document.content)
        .bind(document.version)
        .bind(&document.title)
        .bind(document.id)
        .bind(document.version - 1)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(StoreError::Database)?;
            return Err(StoreError::VersionConflict {
                doc_id: document.id,
                attempted: document.version,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO document_events
                (doc_id, user_id, operation, position, length, content, version, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.doc_id)
        .bind(&event.user_id)
        .bind(&event.operation)
        .bind(event.position)
        .bind(event.length)
        .bind(&event.content)
        .bind(event.version)
        .bind(event.timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(StoreError::Database)?;
        Ok(())
    }
}
