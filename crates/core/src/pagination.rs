//! Page window for list endpoints.

/// Page size used when the caller does not pass `limit`.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Upper bound on `limit`.
pub const MAX_PAGE_SIZE: i64 = 200;

/// A `LIMIT`/`OFFSET` pair that is always safe to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Build a page from raw query values. `limit` falls back to
    /// [`DEFAULT_PAGE_SIZE`] and is held within `1..=MAX_PAGE_SIZE`;
    /// a negative `offset` becomes 0.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}
