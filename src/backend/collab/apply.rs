/**
 * Document Apply Engine
 *
 * Deterministically mutates document content for one transformed edit and
 * advances the version counter. All offsets are character offsets; content
 * is spliced as a char sequence so a hostile position can never split a
 * UTF-8 codepoint.
 *
 * # Bound checks
 *
 * Bounds are verified before any mutation: a failing edit leaves the
 * document untouched.
 *
 * - insert: `0 <= position <= len`
 * - delete/replace: `0 <= position`, `length >= 0`, `position + length <= len`
 *
 * # Versioning
 *
 * On success the document version advances by exactly one and the event is
 * stamped with the server-assigned version. The version the client
 * submitted is staleness input for the transform stage only; it never
 * survives into storage.
 */

use crate::backend::error::PipelineError;
use crate::shared::{Document, EditEvent, OP_DELETE, OP_INSERT, OP_REPLACE};

/// Apply one transformed edit to the document
///
/// Splices content per the operation tag, bumps `document.version`, and
/// overwrites `event.version` with the server-assigned value.
pub fn apply_event(document: &mut Document, event: &mut EditEvent) -> Result<(), PipelineError> {
    let new_content = match event.operation.as_str() {
        OP_INSERT => splice(&document.content, event, false)?,
        OP_DELETE => splice(&document.content, event, true)?,
        OP_REPLACE => splice(&document.content, event, true)?,
        other => return Err(PipelineError::UnsupportedOperation(other.to_string())),
    };

    document.content = new_content;
    document.version += 1;
    event.version = document.version;
    Ok(())
}

/// Splice the event into `content`, removing the deletion range when `remove`
///
/// insert keeps `length` out of the picture (payload only); delete drops its
/// payload (nothing to insert); replace does both.
fn splice(content: &str, event: &EditEvent, remove: bool) -> Result<String, PipelineError> {
    let chars: Vec<char> = content.chars().collect();
    let content_len = chars.len();

    let out_of_range = |_| PipelineError::OutOfRange {
        position: event.position,
        length: event.length,
        content_len,
    };
    let position = usize::try_from(event.position).map_err(out_of_range)?;
    let removed = if remove {
        usize::try_from(event.length).map_err(out_of_range)?
    } else {
        0
    };

    let end = position.checked_add(removed).ok_or(PipelineError::OutOfRange {
        position: event.position,
        length: event.length,
        content_len,
    })?;
    if end > content_len {
        return Err(PipelineError::OutOfRange {
            position: event.position,
            length: event.length,
            content_len,
        });
    }

    let payload = if event.operation == OP_DELETE {
        ""
    } else {
        event.content.as_str()
    };

    let mut result = String::with_capacity(content.len() + payload.len());
    result.extend(&chars[..position]);
    result.push_str(payload);
    result.extend(&chars[end..]);
    Ok(result)
}
