//! Repository seam for session storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::StoreError;
use super::query::{Page, PagedList, SessionFilter};
use super::session::{Session, SessionDraft};

/// Storage contract for sessions.
///
/// Implementations must be safe for concurrent callers. `update` and
/// `delete` are conditional: they take effect only when the supplied tag
/// still matches the stored revision, so concurrent writers cannot lose
/// each other's updates.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Get the current session for `id`, if any
    async fn get(&self, id: &Uuid) -> Result<Option<Session>, StoreError>;

    /// Get the first session whose name matches case-insensitively, if any.
    ///
    /// Duplicate names are not prevented at this layer; which duplicate is
    /// returned is unspecified.
    async fn get_by_name(&self, name: &str) -> Result<Option<Session>, StoreError>;

    /// Store a new session, assigning id, creation time and version tag
    async fn add(&self, draft: SessionDraft) -> Result<Session, StoreError>;

    /// Replace the payload of `id` if its current tag equals `etag`.
    ///
    /// Fails with [`StoreError::NotFound`] when `id` does not exist and
    /// with [`StoreError::Conflict`] when the tag is stale.
    async fn update(
        &self,
        id: &Uuid,
        draft: SessionDraft,
        etag: &str,
    ) -> Result<Session, StoreError>;

    /// Remove `id` if its current tag equals `etag`.
    ///
    /// Deleting an id that does not exist is a no-op, so retries are safe.
    /// A stale tag on a live session fails with [`StoreError::Conflict`].
    async fn delete(&self, id: &Uuid, etag: &str) -> Result<(), StoreError>;

    /// One page of sessions passing `filter`, newest first
    async fn list(
        &self,
        page: Page,
        filter: SessionFilter,
    ) -> Result<PagedList<Session>, StoreError>;

    /// Mean duration in whole seconds over sessions created within
    /// `[from, to]`, `0` when nothing qualifies
    async fn average_duration(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, StoreError>;
}
