//! Paging and filtering for session queries

use serde::Serialize;

use super::session::Session;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size used when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A zero-based page request with a clamped page size.
///
/// Out-of-range input is normalized at construction rather than rejected:
/// a page size below 1 is raised to 1, one above [`MAX_PAGE_SIZE`] is
/// capped.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    page: usize,
    page_size: usize,
}

impl Page {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Zero-based page index
    pub fn page(&self) -> usize {
        self.page
    }

    /// Items per page, always within `[1, MAX_PAGE_SIZE]`
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Optional filters applied to a session listing.
///
/// Blank or whitespace-only filter text counts as absent.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    /// Case-insensitive substring match against the session name
    pub name: Option<String>,
    /// Case-insensitive membership test against the tag set
    pub tag: Option<String>,
}

impl SessionFilter {
    /// True when the session passes every active filter.
    pub fn matches(&self, session: &Session) -> bool {
        if let Some(name) = active(&self.name) {
            if !session.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(tag) = active(&self.tag) {
            if !session.has_tag(tag) {
                return false;
            }
        }
        true
    }
}

fn active(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

/// One page of matching items plus the pre-pagination total.
#[derive(Debug, Clone, Serialize)]
pub struct PagedList<T> {
    pub page: usize,
    pub page_size: usize,
    /// Count of matching items before pagination
    pub total: usize,
    /// Index of the next page, present only when more matches remain
    pub next_page: Option<usize>,
    pub items: Vec<T>,
}

impl<T> PagedList<T> {
    /// Slice one page out of the full, already-ordered match list.
    ///
    /// A page starting past the end of the matches yields an empty item
    /// list while still reporting the true total.
    pub fn slice(matches: Vec<T>, page: &Page) -> Self {
        let total = matches.len();
        let items: Vec<T> = matches
            .into_iter()
            .skip(page.offset())
            .take(page.page_size())
            .collect();
        let next_page = (total > page.page().saturating_add(1).saturating_mul(page.page_size()))
            .then(|| page.page() + 1);

        Self {
            page: page.page(),
            page_size: page.page_size(),
            total,
            next_page,
            items,
        }
    }
}
