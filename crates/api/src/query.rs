//! Shared query parameter types for API handlers.

use buildtrack_core::pagination::Page;
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `(limit, offset)` clamped to the accepted page window.
    pub fn clamped(&self) -> (i64, i64) {
        let page = Page::new(self.limit, self.offset);
        (page.limit, page.offset)
    }
}

/// `?status=` filter shared by project, task and contract listings.
#[derive(Debug, Default, Deserialize)]
pub struct StatusFilterParams {
    pub status: Option<String>,
}

/// `?category=` filter for documents and expenses.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryFilterParams {
    pub category: Option<String>,
}
