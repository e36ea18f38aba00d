/**
 * Edit Wire Frames
 *
 * This module defines the JSON frame clients exchange with the server over
 * the WebSocket connection.
 *
 * # Client -> server
 *
 * ```json
 * {"doc_id": "42", "user_id": "alice", "operation": "insert",
 *  "position": 5, "length": 0, "content": " world", "doc_version": 1}
 * ```
 *
 * `user_id`, `length`, `content` and `doc_version` may be omitted and
 * default to zero/empty.
 *
 * # Server -> other clients
 *
 * The same shape, with `content` replaced by the full post-apply document
 * text and `doc_version` set to the server-assigned version. Receivers
 * re-render the whole document rather than patching locally.
 */

use serde::{Deserialize, Serialize};

use crate::shared::document::Document;

/// Operation tag for inserting text
pub const OP_INSERT: &str = "insert";
/// Operation tag for deleting a range
pub const OP_DELETE: &str = "delete";
/// Operation tag for replacing a range
pub const OP_REPLACE: &str = "replace";

/// One edit submitted by a client
///
/// `doc_id` stays a string on the wire; the transform stage resolves it to
/// the numeric document ID. `doc_version` is the document version the client
/// had when it produced the edit and is used only for staleness detection:
/// the server overwrites it with the authoritative version on persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditEvent {
    /// Target document ID (stringly typed on the wire)
    pub doc_id: String,
    /// Submitting user
    #[serde(default)]
    pub user_id: String,
    /// Operation tag: "insert", "delete" or "replace"
    pub operation: String,
    /// 0-based character offset
    pub position: i64,
    /// Extent of delete/replace, in characters
    #[serde(default)]
    pub length: i64,
    /// Insert/replace payload; full document text on the outbound frame
    #[serde(default)]
    pub content: String,
    /// Client-known document version (inbound) / server version (outbound)
    #[serde(rename = "doc_version", default)]
    pub version: i64,
}

impl EditEvent {
    /// Rewrite this event into the fan-out frame for other clients
    ///
    /// Replaces `content` with the full post-apply document text and stamps
    /// the server-assigned version: receivers render the authoritative
    /// snapshot instead of replaying the raw operation.
    pub fn into_update(mut self, document: &Document) -> EditEvent {
        self.content = document.content.clone();
        self.version = document.version;
        self
    }
}

/// Minimal view of an edit frame used for worker routing
///
/// Dispatch needs the document ID before the pipeline decodes the frame
/// properly, so only `doc_id` is extracted here and every other field is
/// ignored.
#[derive(Debug, Deserialize)]
pub struct RouteKey {
    /// Target document ID
    pub doc_id: String,
}
