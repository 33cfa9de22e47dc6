//! Paginated list pages (vendors, agencies).
//!
//! Holds the uncommitted search draft, the committed query, and the
//! 1-indexed page. Submitting the form commits the draft and resets the
//! page; the fetch key changes with `(committed_query, page)` and the cache
//! refetches on its own.

use crate::query::QueryKey;

/// Which list resource the page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListResource {
    Vendors,
    Agencies,
}

impl ListResource {
    /// Resource noun for count lines ("15 vendors").
    pub fn noun(&self) -> &'static str {
        match self {
            ListResource::Vendors => "vendors",
            ListResource::Agencies => "agencies",
        }
    }

    /// Fixed human-readable failure message; the raw status never shows.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ListResource::Vendors => "Failed to load vendors.",
            ListResource::Agencies => "Failed to load agencies.",
        }
    }
}

pub struct ListPage {
    pub resource: ListResource,
    pub search_draft: String,
    pub committed_query: Option<String>,
    /// 1-indexed.
    pub page: u32,
    pub size: u32,
}

impl ListPage {
    pub fn new(resource: ListResource, size: u32) -> Self {
        Self {
            resource,
            search_draft: String::new(),
            committed_query: None,
            page: 1,
            size,
        }
    }

    /// The fetch for the current `(committed_query, page)` tuple.
    pub fn query_key(&self) -> QueryKey {
        match self.resource {
            ListResource::Vendors => QueryKey::Vendors {
                query: self.committed_query.clone(),
                page: self.page,
            },
            ListResource::Agencies => QueryKey::Agencies {
                query: self.committed_query.clone(),
                page: self.page,
            },
        }
    }

    /// Commit the draft and reset to page 1. An empty draft commits to "no
    /// query" so `q` is omitted from the request entirely.
    pub fn submit_search(&mut self) -> QueryKey {
        self.committed_query = if self.search_draft.is_empty() {
            None
        } else {
            Some(self.search_draft.clone())
        };
        self.page = 1;
        self.query_key()
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_next(&self, total: u64) -> bool {
        u64::from(self.page) * u64::from(self.size) < total
    }

    /// Previous page, bounded at 1. Returns the new fetch when the page moved.
    pub fn prev_page(&mut self) -> Option<QueryKey> {
        if !self.can_prev() {
            return None;
        }
        self.page -= 1;
        Some(self.query_key())
    }

    /// Next page, bounded by the last known total.
    pub fn next_page(&mut self, total: u64) -> Option<QueryKey> {
        if !self.can_next(total) {
            return None;
        }
        self.page += 1;
        Some(self.query_key())
    }

    /// Count line, e.g. "1,503 vendors".
    pub fn count_line(&self, total: u64) -> String {
        format!("{} {}", crate::format::format_count(total), self.resource.noun())
    }
}
