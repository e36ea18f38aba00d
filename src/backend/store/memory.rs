/**
 * In-Memory Document Store
 *
 * `DocumentStore` backed by in-process maps. Used by the test suite and as
 * the fallback store when `DATABASE_URL` is not configured, so the server
 * still runs (without persistence across restarts) in local development.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::store::{DocumentStore, StoreError};
use crate::shared::{Document, DocumentEvent};

/// In-process document store
///
/// One mutex guards both maps so `commit_edit` stays all-or-nothing: the
/// snapshot update and the event append happen under a single lock hold.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    next_id: AtomicI64,
}

struct Inner {
    documents: HashMap<i64, Document>,
    events: HashMap<i64, Vec<DocumentEvent>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                documents: HashMap::new(),
                events: HashMap::new(),
            }),
            next_id: AtomicI64::new(1),
        }
    }

    /// Seed a document at a known ID and version, for tests
    pub fn insert_document(&self, document: Document) {
        let mut inner = self.inner.lock().unwrap();
        self.next_id.fetch_max(document.id + 1, Ordering::SeqCst);
        inner.documents.insert(document.id, document);
    }

    /// Seed an event record directly, for tests
    pub fn insert_event(&self, event: DocumentEvent) {
        let mut inner = self.inner.lock().unwrap();
        inner.events.entry(event.doc_id).or_default().push(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, title: &str, content: &str) -> Result<Document, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let document = Document::new(id, title, content);
        let mut inner = self.inner.lock().unwrap();
        inner.documents.insert(id, document.clone());
        Ok(document)
    }

    async fn document(&self, id: i64) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.documents.get(&id).cloned())
    }

    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut documents: Vec<Document> = inner.documents.values().cloned().collect();
        documents.sort_by_key(|d| d.id);
        Ok(documents)
    }

    async fn events_after(
        &self,
        doc_id: i64,
        min_version_exclusive: i64,
    ) -> Result<Vec<DocumentEvent>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut missed: Vec<DocumentEvent> = inner
            .events
            .get(&doc_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.version > min_version_exclusive)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        missed.sort_by_key(|e| e.version);
        Ok(missed)
    }

    async fn commit_edit(
        &self,
        document: &Document,
        event: &DocumentEvent,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let stored_version = inner
            .documents
            .get(&document.id)
            .map(|d| d.version)
            .unwrap_or(-1);
        if document.version != stored_version + 1 {
            return Err(StoreError::VersionConflict {
                doc_id: document.id,
                attempted: document.version,
            });
        }
        inner.documents.insert(document.id, document.clone());
        inner.events.entry(event.doc_id).or_default().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn event(doc_id: i64, version: i64) -> DocumentEvent {
        DocumentEvent {
            doc_id,
            user_id: "u".to_string(),
            operation: "insert".to_string(),
            position: 0,
            length: 0,
            content: "x".to_string(),
            version,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.create_document("a", "").await.unwrap();
        let b = store.create_document("b", "").await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.version, 0);
    }

    #[tokio::test]
    async fn test_commit_requires_next_version() {
        let store = MemoryStore::new();
        let mut doc = store.create_document("doc", "hello").await.unwrap();

        doc.version = 2; // skips version 1
        let err = store.commit_edit(&doc, &event(doc.id, 2)).await.unwrap_err();
        assert_matches!(err, StoreError::VersionConflict { attempted: 2, .. });

        doc.version = 1;
        store.commit_edit(&doc, &event(doc.id, 1)).await.unwrap();
        let stored = store.document(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_events_after_filters_and_sorts() {
        let store = MemoryStore::new();
        store.insert_document(Document::new(5, "d", ""));
        store.insert_event(event(5, 3));
        store.insert_event(event(5, 1));
        store.insert_event(event(5, 2));

        let missed = store.events_after(5, 1).await.unwrap();
        let versions: Vec<i64> = missed.iter().map(|e| e.version).collect();
        assert_eq!(versions, vec![2, 3]);
    }
}
