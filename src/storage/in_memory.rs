//! In-memory implementation of SessionRepository

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::occ::mutate_versioned;
use crate::core::{
    Page, PagedList, Session, SessionDraft, SessionFilter, SessionRepository, StoreError,
};

type Slot = Arc<RwLock<Session>>;

/// Thread-safe in-memory session store.
///
/// Every entry carries its own lock, so conditional mutations serialize per
/// id while operations on distinct sessions proceed in parallel. The outer
/// map lock guards structure only: shared for lookups and payload updates,
/// exclusive for insert and remove.
#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, Slot>>>,
}

impl InMemorySessionRepository {
    /// Create a new, empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the current value of every live session.
    fn snapshot(&self) -> Result<Vec<Session>, StoreError> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Lock)?;
        sessions
            .values()
            .map(|slot| Ok(slot.read().map_err(|_| StoreError::Lock)?.clone()))
            .collect()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn get(&self, id: &Uuid) -> Result<Option<Session>, StoreError> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Lock)?;
        match sessions.get(id) {
            Some(slot) => Ok(Some(slot.read().map_err(|_| StoreError::Lock)?.clone())),
            None => Ok(None),
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Session>, StoreError> {
        let needle = name.to_lowercase();
        let sessions = self.sessions.read().map_err(|_| StoreError::Lock)?;
        for slot in sessions.values() {
            let session = slot.read().map_err(|_| StoreError::Lock)?;
            if session.name.to_lowercase() == needle {
                return Ok(Some(session.clone()));
            }
        }
        Ok(None)
    }

    async fn add(&self, draft: SessionDraft) -> Result<Session, StoreError> {
        let session = Session::create(draft);
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Lock)?;
        sessions.insert(session.id, Arc::new(RwLock::new(session.clone())));
        tracing::debug!(id = %session.id, name = %session.name, "session added");
        Ok(session)
    }

    async fn update(
        &self,
        id: &Uuid,
        draft: SessionDraft,
        etag: &str,
    ) -> Result<Session, StoreError> {
        // The map read lock is held across the whole mutation: a racing
        // delete needs the write lock, so the entry cannot vanish between
        // the lookup and the commit. Updates on other ids share the lock.
        let sessions = self.sessions.read().map_err(|_| StoreError::Lock)?;
        let slot = sessions.get(id).ok_or(StoreError::NotFound { id: *id })?;

        let updated = mutate_versioned(slot, etag, |session| {
            session.apply(draft);
            session.clone()
        })?;

        tracing::debug!(id = %updated.id, etag = %updated.etag, "session updated");
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid, etag: &str) -> Result<(), StoreError> {
        // Removal is structural, so this takes the exclusive map lock. That
        // also keeps updates out until the entry is gone, which makes the
        // tag check below authoritative.
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Lock)?;
        let Some(slot) = sessions.get(id).map(Arc::clone) else {
            // Already gone; deletes are idempotent under retries
            return Ok(());
        };

        mutate_versioned(&slot, etag, |_| ())?;
        sessions.remove(id);

        tracing::debug!(%id, "session deleted");
        Ok(())
    }

    async fn list(
        &self,
        page: Page,
        filter: SessionFilter,
    ) -> Result<PagedList<Session>, StoreError> {
        let mut matches: Vec<Session> = self
            .snapshot()?
            .into_iter()
            .filter(|session| filter.matches(session))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(PagedList::slice(matches, &page))
    }

    async fn average_duration(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let durations: Vec<u64> = self
            .snapshot()?
            .into_iter()
            .filter(|session| session.created_at >= from && session.created_at <= to)
            .map(|session| session.duration.as_secs())
            .collect();

        if durations.is_empty() {
            return Ok(0);
        }

        let sum: u64 = durations.iter().sum();
        Ok((sum as f64 / durations.len() as f64) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    fn draft(name: &str) -> SessionDraft {
        SessionDraft {
            name: name.to_string(),
            duration: Duration::from_secs(10),
            tags: vec!["Test".to_string(), "Test2".to_string()],
        }
    }

    fn timed_draft(name: &str, seconds: u64) -> SessionDraft {
        SessionDraft {
            name: name.to_string(),
            duration: Duration::from_secs(seconds),
            tags: vec![],
        }
    }

    fn wide_window() -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - chrono::Duration::minutes(5), now + chrono::Duration::minutes(5))
    }

    // ==================================================================
    // Create & read
    // ==================================================================

    #[tokio::test]
    async fn test_add_assigns_identity_and_round_trips() {
        let repository = InMemorySessionRepository::new();

        let session = repository.add(draft("Test Session")).await.unwrap();

        assert!(!session.id.is_nil());
        assert!(!session.etag.is_empty());
        assert!(session.created_at <= Utc::now());

        let stored = repository.get(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Test Session");
        assert_eq!(stored.duration, Duration::from_secs(10));
        assert_eq!(stored.tags, vec!["Test", "Test2"]);
        assert_eq!(stored.etag, session.etag);
    }

    #[tokio::test]
    async fn test_add_generates_pairwise_distinct_ids() {
        let repository = InMemorySessionRepository::new();
        let mut ids = HashSet::new();
        let mut etags = HashSet::new();

        for i in 0..50 {
            let session = repository.add(timed_draft(&format!("s{i}"), 10)).await.unwrap();
            assert!(ids.insert(session.id));
            assert!(etags.insert(session.etag));
        }
    }

    #[tokio::test]
    async fn test_get_unknown_id_returns_none() {
        let repository = InMemorySessionRepository::new();
        assert!(repository.get(&Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_name_is_case_insensitive_exact_match() {
        let repository = InMemorySessionRepository::new();
        repository.add(draft("Test Session")).await.unwrap();

        let found = repository.get_by_name("test session").await.unwrap();
        assert_eq!(found.unwrap().name, "Test Session");

        // Substrings do not count as a name match
        assert!(repository.get_by_name("Session").await.unwrap().is_none());
    }

    // ==================================================================
    // Conditional update
    // ==================================================================

    #[tokio::test]
    async fn test_update_with_matching_tag_replaces_payload() {
        let repository = InMemorySessionRepository::new();
        let session = repository.add(draft("Test Session")).await.unwrap();

        let updated = repository
            .update(&session.id, timed_draft("Updated Name", 20), &session.etag)
            .await
            .unwrap();

        assert_eq!(updated.id, session.id);
        assert_eq!(updated.created_at, session.created_at);
        assert_eq!(updated.name, "Updated Name");
        assert_eq!(updated.duration, Duration::from_secs(20));
        assert_ne!(updated.etag, session.etag, "tag must rotate on update");

        let stored = repository.get(&session.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_with_stale_tag_fails_and_leaves_entity_unchanged() {
        let repository = InMemorySessionRepository::new();
        let session = repository.add(draft("Test Session")).await.unwrap();

        let result = repository
            .update(&session.id, timed_draft("Updated Name", 20), "IncorrectEtag")
            .await;

        assert!(matches!(result, Err(StoreError::Conflict)));
        let stored = repository.get(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Test Session");
        assert_eq!(stored.etag, session.etag);
    }

    #[tokio::test]
    async fn test_update_rejects_tag_from_before_a_successful_update() {
        let repository = InMemorySessionRepository::new();
        let session = repository.add(draft("Test Session")).await.unwrap();

        repository
            .update(&session.id, timed_draft("Second", 10), &session.etag)
            .await
            .unwrap();

        let result = repository
            .update(&session.id, timed_draft("Third", 10), &session.etag)
            .await;
        assert!(matches!(result, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repository = InMemorySessionRepository::new();
        let session = repository.add(draft("Test Session")).await.unwrap();

        let missing = Uuid::new_v4();
        let result = repository
            .update(&missing, timed_draft("Updated Name", 10), &session.etag)
            .await;

        assert!(matches!(result, Err(StoreError::NotFound { id }) if id == missing));
    }

    // ==================================================================
    // Conditional delete
    // ==================================================================

    #[tokio::test]
    async fn test_delete_with_matching_tag_removes_entity() {
        let repository = InMemorySessionRepository::new();
        let session = repository.add(draft("Test Session")).await.unwrap();

        repository.delete(&session.id, &session.etag).await.unwrap();

        assert!(repository.get(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_with_stale_tag_fails_and_keeps_entity() {
        let repository = InMemorySessionRepository::new();
        let session = repository.add(draft("Test Session")).await.unwrap();

        let result = repository.delete(&session.id, "IncorrectEtag").await;

        assert!(matches!(result, Err(StoreError::Conflict)));
        assert!(repository.get(&session.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_a_noop() {
        let repository = InMemorySessionRepository::new();

        repository.delete(&Uuid::new_v4(), "any-tag").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_is_idempotent_under_retry() {
        let repository = InMemorySessionRepository::new();
        let session = repository.add(draft("Test Session")).await.unwrap();

        repository.delete(&session.id, &session.etag).await.unwrap();
        // Retrying the same delete after it succeeded is still fine
        repository.delete(&session.id, &session.etag).await.unwrap();
    }

    // ==================================================================
    // Listing
    // ==================================================================

    #[tokio::test]
    async fn test_list_pages_report_total_and_next() {
        let repository = InMemorySessionRepository::new();
        for i in 0..3 {
            repository.add(timed_draft(&format!("s{i}"), 10)).await.unwrap();
        }

        let first = repository
            .list(Page::new(0, 2), SessionFilter::default())
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total, 3);
        assert_eq!(first.next_page, Some(1));

        let second = repository
            .list(Page::new(1, 2), SessionFilter::default())
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.total, 3);
        assert_eq!(second.next_page, None);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let repository = InMemorySessionRepository::new();
        for name in ["first", "second", "third"] {
            repository.add(timed_draft(name, 10)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let result = repository
            .list(Page::default(), SessionFilter::default())
            .await
            .unwrap();
        let names: Vec<&str> = result.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_list_filters_by_name_and_tag() {
        let repository = InMemorySessionRepository::new();
        repository.add(draft("Test Session")).await.unwrap();
        repository.add(timed_draft("Morning Run", 10)).await.unwrap();

        let filter = SessionFilter {
            name: Some("Session".to_string()),
            tag: Some("Test".to_string()),
        };
        let result = repository.list(Page::default(), filter).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].name, "Test Session");

        let filter = SessionFilter {
            name: None,
            tag: Some("Nonexistent".to_string()),
        };
        let result = repository.list(Page::default(), filter).await.unwrap();
        assert_eq!(result.total, 0);
        assert!(result.items.is_empty());
        assert_eq!(result.next_page, None);
    }

    #[tokio::test]
    async fn test_list_blank_filters_match_everything() {
        let repository = InMemorySessionRepository::new();
        repository.add(draft("Test Session")).await.unwrap();

        let filter = SessionFilter {
            name: Some("  ".to_string()),
            tag: Some(String::new()),
        };
        let result = repository.list(Page::default(), filter).await.unwrap();
        assert_eq!(result.total, 1);
    }

    #[tokio::test]
    async fn test_list_page_past_end_is_empty_with_true_total() {
        let repository = InMemorySessionRepository::new();
        for i in 0..3 {
            repository.add(timed_draft(&format!("s{i}"), 10)).await.unwrap();
        }

        let result = repository
            .list(Page::new(5, 2), SessionFilter::default())
            .await
            .unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total, 3);
        assert_eq!(result.next_page, None);
    }

    // ==================================================================
    // Average duration
    // ==================================================================

    #[tokio::test]
    async fn test_average_duration_on_empty_store_is_zero() {
        let repository = InMemorySessionRepository::new();
        let (from, to) = wide_window();

        assert_eq!(repository.average_duration(from, to).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_average_duration_truncates_to_whole_seconds() {
        let repository = InMemorySessionRepository::new();
        repository.add(timed_draft("a", 10)).await.unwrap();
        repository.add(timed_draft("b", 15)).await.unwrap();
        let (from, to) = wide_window();

        // (10 + 15) / 2 = 12.5, truncated
        assert_eq!(repository.average_duration(from, to).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_average_duration_over_empty_window_is_zero() {
        let repository = InMemorySessionRepository::new();
        repository.add(timed_draft("a", 10)).await.unwrap();

        let from = Utc::now() - chrono::Duration::hours(2);
        let to = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(repository.average_duration(from, to).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_average_duration_window_bounds_are_inclusive() {
        let repository = InMemorySessionRepository::new();
        let session = repository.add(timed_draft("a", 30)).await.unwrap();

        let average = repository
            .average_duration(session.created_at, session.created_at)
            .await
            .unwrap();
        assert_eq!(average, 30);
    }
}
