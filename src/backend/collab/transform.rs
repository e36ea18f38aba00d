/**
 * Operational Transform Engine
 *
 * Adjusts an incoming edit's position against the edits the server accepted
 * after the version the client last saw. This is a positional OT, not an
 * intention-preserving one: only `position` is ever rewritten, never
 * `length` or `content`.
 *
 * # Algorithm
 *
 * 1. Resolve the numeric document ID from the event's `doc_id`.
 * 2. Fetch the authoritative document.
 * 3. If the event is stale (`doc_version < document.version`), fetch the
 *    missed events in ascending version order and fold the position through
 *    each one.
 *
 * # Transform rules
 *
 * The position moves only when `current.position > missed.position`:
 *
 * | current | missed | adjustment            |
 * |---------|--------|-----------------------|
 * | insert  | insert | position += missed.length |
 * | insert  | delete | position -= missed.length |
 * | delete  | insert | position += missed.length |
 * | delete  | delete | position -= missed.length |
 *
 * Ties (`current.position == missed.position`) are left unadjusted, and
 * `replace` participates in no rule. Overlapping delete ranges and
 * simultaneous inserts at one offset are likewise not reconciled here; this
 * is a documented limitation and the extension point for a fuller OT.
 */

use crate::backend::error::PipelineError;
use crate::backend::store::DocumentStore;
use crate::shared::{Document, DocumentEvent, EditEvent, OP_DELETE, OP_INSERT};

/// Resolve the numeric document ID from an edit's wire `doc_id`
pub fn resolve_doc_id(event: &EditEvent) -> Result<i64, PipelineError> {
    event
        .doc_id
        .parse::<i64>()
        .map_err(|_| PipelineError::InvalidDocumentId(event.doc_id.clone()))
}

/// Transform one stale edit against the history it missed
///
/// Fetches the authoritative document, folds the event position through the
/// missed events when the edit is stale, and returns the document for the
/// apply stage. A fresh edit (`doc_version >= document.version`) skips the
/// fold entirely.
pub async fn transform_event(
    store: &dyn DocumentStore,
    event: &mut EditEvent,
) -> Result<Document, PipelineError> {
    let doc_id = resolve_doc_id(event)?;

    let document = store
        .document(doc_id)
        .await?
        .ok_or(PipelineError::NotFound(doc_id))?;

    if event.version < document.version {
        let missed = store.events_after(doc_id, event.version).await?;
        tracing::debug!(
            "[Transform] doc {}: event at version {} folds through {} missed events",
            doc_id,
            event.version,
            missed.len()
        );
        for missed_event in &missed {
            transform_position(event, missed_event);
        }
    }

    Ok(document)
}

/// Fold one missed event into the current edit's position
///
/// Pure single-step transform; `transform_event` applies it over the whole
/// missed history in ascending version order.
pub fn transform_position(current: &mut EditEvent, missed: &DocumentEvent) {
    if current.position <= missed.position {
        return;
    }

    match (current.operation.as_str(), missed.operation.as_str()) {
        (OP_INSERT, OP_INSERT) | (OP_DELETE, OP_INSERT) => {
            current.position += missed.length;
        }
        (OP_INSERT, OP_DELETE) | (OP_DELETE, OP_DELETE) => {
            current.position -= missed.length;
        }
        // replace interactions are out of scope for this transform
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::MemoryStore;
    use crate::shared::OP_REPLACE;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn edit(operation: &str, position: i64, version: i64) -> EditEvent {
        EditEvent {
            doc_id: "1".to_string(),
            user_id: "alice".to_string(),
            operation: operation.to_string(),
            position,
            length: 0,
            content: String::new(),
            version,
        }
    }

    fn missed(operation: &str, position: i64, length: i64, version: i64) -> DocumentEvent {
        DocumentEvent {
            doc_id: 1,
            user_id: "bob".to_string(),
            operation: operation.to_string(),
            position,
            length,
            content: String::new(),
            version,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_insert_after_missed_insert_shifts_right() {
        let mut current = edit(OP_INSERT, 10, 3);
        transform_position(&mut current, &missed(OP_INSERT, 2, 4, 4));
        assert_eq!(current.position, 14);
    }

    #[test]
    fn test_insert_after_missed_delete_shifts_left() {
        let mut current = edit(OP_INSERT, 10, 3);
        transform_position(&mut current, &missed(OP_DELETE, 2, 4, 4));
        assert_eq!(current.position, 6);
    }

    #[test]
    fn test_no_adjustment_at_or_before_missed_position() {
        let mut current = edit(OP_DELETE, 5, 3);
        transform_position(&mut current, &missed(OP_INSERT, 5, 4, 4));
        assert_eq!(current.position, 5, "tie stays unadjusted");

        transform_position(&mut current, &missed(OP_INSERT, 9, 4, 5));
        assert_eq!(current.position, 5);
    }

    #[test]
    fn test_replace_participates_in_no_rule() {
        let mut current = edit(OP_REPLACE, 10, 3);
        transform_position(&mut current, &missed(OP_INSERT, 2, 4, 4));
        assert_eq!(current.position, 10);

        let mut current = edit(OP_INSERT, 10, 3);
        transform_position(&mut current, &missed(OP_REPLACE, 2, 4, 4));
        assert_eq!(current.position, 10);
    }

    #[test]
    fn test_only_position_changes() {
        let mut current = edit(OP_DELETE, 10, 3);
        current.length = 2;
        current.content = "payload".to_string();
        transform_position(&mut current, &missed(OP_DELETE, 1, 3, 4));
        assert_eq!(current.position, 7);
        assert_eq!(current.length, 2);
        assert_eq!(current.content, "payload");
    }

    #[tokio::test]
    async fn test_fold_through_missed_history() {
        // A{position 10, version 3, insert} against a document at version 5:
        // B{insert, position 2, length 4, v4} moves it to 14; C{delete,
        // position 20, length 2, v5} leaves it alone (14 < 20).
        let store = MemoryStore::new();
        let mut doc = Document::new(1, "doc", "x".repeat(30));
        doc.version = 5;
        store.insert_document(doc);
        store.insert_event(missed(OP_INSERT, 2, 4, 4));
        store.insert_event(missed(OP_DELETE, 20, 2, 5));

        let mut current = edit(OP_INSERT, 10, 3);
        let document = transform_event(&store, &mut current).await.unwrap();
        assert_eq!(current.position, 14);
        assert_eq!(document.version, 5);
    }

    #[tokio::test]
    async fn test_fresh_event_skips_fold() {
        let store = MemoryStore::new();
        let mut doc = Document::new(1, "doc", "hello");
        doc.version = 2;
        store.insert_document(doc);
        // Seeded history would shift the position if the fold ran.
        store.insert_event(missed(OP_INSERT, 0, 4, 1));

        let mut current = edit(OP_INSERT, 3, 2);
        transform_event(&store, &mut current).await.unwrap();
        assert_eq!(current.position, 3);
    }

    #[tokio::test]
    async fn test_unparseable_doc_id() {
        let store = MemoryStore::new();
        let mut current = edit(OP_INSERT, 0, 0);
        current.doc_id = "not-a-number".to_string();
        let err = transform_event(&store, &mut current).await.unwrap_err();
        assert_matches!(err, PipelineError::InvalidDocumentId(_));
    }

    #[tokio::test]
    async fn test_unknown_document() {
        let store = MemoryStore::new();
        let mut current = edit(OP_INSERT, 0, 0);
        current.doc_id = "99".to_string();
        let err = transform_event(&store, &mut current).await.unwrap_err();
        assert_matches!(err, PipelineError::NotFound(99));
    }
}
