//! Request and response shapes for the session endpoints
//!
//! The version tag never appears in a body; it travels in the `ETag`
//! response header and the `If-Match` request header, like any other
//! optimistic-locking HTTP API.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::core::{DEFAULT_PAGE_SIZE, Page, PagedList, Session, SessionDraft};

/// Body accepted by the create and update endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,

    #[validate(range(min = 1, max = 3600))]
    pub duration_seconds: u64,

    #[validate(custom(function = valid_tags))]
    pub tags: Option<Vec<String>>,
}

impl SessionRequest {
    /// Convert into the payload shape the store accepts.
    pub fn into_draft(self) -> SessionDraft {
        SessionDraft {
            name: self.name,
            duration: Duration::from_secs(self.duration_seconds),
            tags: self.tags.unwrap_or_default(),
        }
    }
}

/// Each tag must be 1..=50 characters and case-insensitively unique within
/// the request.
fn valid_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for tag in tags {
        if tag.is_empty() || tag.chars().count() > 50 {
            return Err(ValidationError::new("tag_length"));
        }
        if !seen.insert(tag.to_lowercase()) {
            return Err(ValidationError::new("tags_not_unique"));
        }
    }
    Ok(())
}

/// Session as returned to clients.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub duration_seconds: u64,
    pub tags: Vec<String>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            name: session.name,
            duration_seconds: session.duration.as_secs(),
            tags: session.tags,
        }
    }
}

/// Query parameters accepted by the listing endpoint.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ListParams {
    pub page: i64,
    pub page_size: Option<i64>,
    pub name: Option<String>,
    pub tag: Option<String>,
}

impl ListParams {
    /// Normalize raw query input into a page request.
    ///
    /// Negative input is raised to the minimum rather than rejected; the
    /// upper bound is handled by [`Page`] itself.
    pub fn page_request(&self) -> Page {
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE as i64).max(1);
        Page::new(self.page.max(0) as usize, page_size as usize)
    }
}

/// Paged listing body, with a ready-to-follow `next` URL when more pages
/// remain.
#[derive(Debug, Serialize)]
pub struct PagedSessionsResponse {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub items: Vec<SessionResponse>,
}

impl PagedSessionsResponse {
    pub fn from_page(list: PagedList<Session>, params: &ListParams) -> Self {
        let next = list
            .next_page
            .map(|next_page| next_url(next_page, list.page_size, params));
        Self {
            page: list.page,
            page_size: list.page_size,
            total: list.total,
            next,
            items: list.items.into_iter().map(SessionResponse::from).collect(),
        }
    }
}

fn next_url(page: usize, page_size: usize, params: &ListParams) -> String {
    let mut url = format!("/sessions?page={page}&page_size={page_size}");
    if let Some(name) = present(&params.name) {
        url.push_str(&format!("&name={name}"));
    }
    if let Some(tag) = present(&params.tag) {
        url.push_str(&format!("&tag={tag}"));
    }
    url
}

fn present(param: &Option<String>) -> Option<&str> {
    param.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

/// Query parameters for the average-duration endpoint (RFC 3339 bounds).
#[derive(Debug, Deserialize)]
pub struct AverageParams {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Body returned by the average-duration endpoint.
#[derive(Debug, Serialize)]
pub struct AverageDurationResponse {
    pub average_duration_seconds: i64,
}
