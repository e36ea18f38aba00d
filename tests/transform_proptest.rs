//! Property-based tests for the transform and apply engines

use proptest::prelude::*;

use codraft::backend::collab::apply::apply_event;
use codraft::backend::collab::transform::transform_position;
use codraft::shared::{Document, DocumentEvent, EditEvent, OP_DELETE, OP_INSERT};

fn edit(operation: &str, position: i64, length: i64, content: &str) -> EditEvent {
    EditEvent {
        doc_id: "1".to_string(),
        user_id: "alice".to_string(),
        operation: operation.to_string(),
        position,
        length,
        content: content.to_string(),
        version: 0,
    }
}

fn missed(operation: &str, position: i64, length: i64) -> DocumentEvent {
    DocumentEvent {
        doc_id: 1,
        user_id: "bob".to_string(),
        operation: operation.to_string(),
        position,
        length,
        content: String::new(),
        version: 1,
        timestamp: chrono::Utc::now(),
    }
}

proptest! {
    #[test]
    fn test_transform_moves_position_by_missed_length_or_not_at_all(
        current_op in prop::sample::select(vec![OP_INSERT, OP_DELETE]),
        missed_op in prop::sample::select(vec![OP_INSERT, OP_DELETE]),
        current_position in 0i64..1000,
        missed_position in 0i64..1000,
        missed_length in 0i64..100,
    ) {
        let mut current = edit(current_op, current_position, 7, "payload");
        transform_position(&mut current, &missed(missed_op, missed_position, missed_length));

        let delta = current.position - current_position;
        if current_position > missed_position {
            let expected = if missed_op == OP_INSERT { missed_length } else { -missed_length };
            prop_assert_eq!(delta, expected);
        } else {
            prop_assert_eq!(delta, 0);
        }

        // position is the only field the transform may touch
        prop_assert_eq!(current.length, 7);
        prop_assert_eq!(current.content, "payload");
        prop_assert_eq!(current.operation, current_op);
    }

    #[test]
    fn test_insert_grows_content_by_payload_chars(
        base in "[a-zéü]{0,20}",
        payload in "[a-zéü]{0,8}",
        pos_seed in 0usize..64,
    ) {
        let mut doc = Document::new(1, "doc", base.clone());
        let base_chars = base.chars().count();
        let position = (pos_seed % (base_chars + 1)) as i64;

        let mut event = edit(OP_INSERT, position, 0, &payload);
        apply_event(&mut doc, &mut event).unwrap();

        prop_assert_eq!(
            doc.content.chars().count(),
            base_chars + payload.chars().count()
        );
        prop_assert_eq!(doc.version, 1);
        prop_assert_eq!(event.version, 1);
    }

    #[test]
    fn test_delete_shrinks_content_by_length(
        base in "[a-zéü]{1,20}",
        pos_seed in 0usize..64,
        len_seed in 0usize..64,
    ) {
        let base_chars = base.chars().count();
        let position = pos_seed % base_chars;
        let length = len_seed % (base_chars - position + 1);

        let mut doc = Document::new(1, "doc", base.clone());
        let mut event = edit(OP_DELETE, position as i64, length as i64, "");
        apply_event(&mut doc, &mut event).unwrap();

        prop_assert_eq!(doc.content.chars().count(), base_chars - length);
        prop_assert_eq!(doc.version, 1);
    }

    #[test]
    fn test_failed_apply_leaves_document_untouched(
        base in "[a-z]{0,10}",
        overshoot in 1i64..50,
        length in 0i64..10,
    ) {
        let mut doc = Document::new(1, "doc", base);
        doc.version = 3;
        let snapshot = doc.clone();

        let past_end = doc.content.chars().count() as i64 + overshoot;
        let mut event = edit(OP_DELETE, past_end, length, "");
        prop_assert!(apply_event(&mut doc, &mut event).is_err());
        prop_assert_eq!(doc, snapshot);
    }

    #[test]
    fn test_replay_is_deterministic(
        seeds in prop::collection::vec((0usize..64, "[a-z]{1,4}"), 1..12),
    ) {
        let mut first = Document::new(1, "doc", "");
        let mut second = Document::new(1, "doc", "");

        for doc in [&mut first, &mut second] {
            for (pos_seed, payload) in &seeds {
                let position = (pos_seed % (doc.content.chars().count() + 1)) as i64;
                let mut event = edit(OP_INSERT, position, 0, payload);
                apply_event(doc, &mut event).unwrap();
            }
        }

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.version, seeds.len() as i64);
    }
}
