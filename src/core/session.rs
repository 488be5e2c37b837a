//! Session entity and its caller-supplied payload

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entity::Versioned;

/// A registered session.
///
/// `id`, `etag` and `created_at` are assigned by the store; callers only
/// supply the payload fields via [`SessionDraft`]. A session handed out by
/// the store is always fully populated, and `id` and `created_at` never
/// change after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Unique identifier, assigned on creation
    pub id: Uuid,
    /// Opaque version tag, regenerated on every successful write
    pub etag: String,
    /// Creation timestamp, stamped once
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub duration: Duration,
    /// Tag set, case-insensitively unique, original casing preserved
    pub tags: Vec<String>,
}

/// Caller-supplied payload fields for creating or updating a session.
#[derive(Debug, Clone, Default)]
pub struct SessionDraft {
    pub name: String,
    pub duration: Duration,
    pub tags: Vec<String>,
}

impl Session {
    /// Build a fresh session from a draft, assigning identity, creation
    /// time and an initial version tag.
    pub fn create(draft: SessionDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            etag: new_etag(),
            created_at: Utc::now(),
            name: draft.name,
            duration: draft.duration,
            tags: dedup_tags(draft.tags),
        }
    }

    /// Replace the payload fields and regenerate the version tag.
    ///
    /// Identity and creation time are never touched.
    pub fn apply(&mut self, draft: SessionDraft) {
        self.name = draft.name;
        self.duration = draft.duration;
        self.tags = dedup_tags(draft.tags);
        self.etag = new_etag();
    }

    /// Case-insensitive membership test against the tag set.
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == needle)
    }
}

impl Versioned for Session {
    fn etag(&self) -> &str {
        &self.etag
    }
}

/// Generate a fresh opaque version tag.
pub(crate) fn new_etag() -> String {
    Uuid::new_v4().to_string()
}

/// Drop case-insensitive duplicates, keeping the first occurrence and its
/// original casing.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .collect()
}
