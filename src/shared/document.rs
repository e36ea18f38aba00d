/**
 * Document Data Model
 *
 * This module defines the canonical document snapshot and the immutable
 * event records that make up a document's edit history.
 *
 * # Versioning
 *
 * Every accepted edit advances `Document.version` by exactly one and is
 * recorded as a `DocumentEvent` carrying the server-assigned version.
 * Events are append-only: once persisted they are never mutated, and no
 * two events for one document share a version.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical document snapshot
///
/// The server-side source of truth for one collaboratively edited text.
/// `content` is treated as a character sequence everywhere: all positions
/// and lengths in the edit pipeline are character offsets, never bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    /// Unique numeric document ID
    pub id: i64,
    /// Human-readable document title
    pub title: String,
    /// Full document text
    pub content: String,
    /// Monotonic version counter, bumped by exactly 1 per accepted edit
    pub version: i64,
}

impl Document {
    /// Create a fresh document at version 0
    pub fn new(id: i64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            version: 0,
        }
    }
}

/// Immutable record of one accepted edit
///
/// Created by a worker after transform and apply succeed, persisted in the
/// same atomic unit as the document snapshot it produced. The `version`
/// field is always the server-assigned post-apply version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DocumentEvent {
    /// Document this event belongs to
    pub doc_id: i64,
    /// User who submitted the edit
    pub user_id: String,
    /// Operation tag: "insert", "delete" or "replace"
    pub operation: String,
    /// 0-based character offset the operation acts at
    pub position: i64,
    /// Extent of delete/replace operations, in characters
    pub length: i64,
    /// Payload for insert/replace operations
    pub content: String,
    /// Server-assigned post-apply document version
    pub version: i64,
    /// Server-side commit timestamp
    pub timestamp: DateTime<Utc>,
}
