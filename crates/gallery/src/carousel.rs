//! Per-artist album carousel paging

use serde::Serialize;

/// Default number of albums visible at once.
pub const DEFAULT_PAGE_SIZE: usize = 4;

/// Start of the previous window.
pub fn prev_start(start: usize, page_size: usize) -> usize {
    start.saturating_sub(page_size)
}

/// Start of the next window; never past the last full page.
pub fn next_start(start: usize, len: usize, page_size: usize) -> usize {
    (start + page_size).min(len.saturating_sub(page_size))
}

/// Visible slice of a carousel and the starts its arrows lead to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub prev: usize,
    pub next: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Window {
    /// Window over `len` items starting near `start`. An out-of-range start
    /// is clamped onto the last full page.
    pub fn new(start: usize, len: usize, page_size: usize) -> Self {
        let start = start.min(len.saturating_sub(page_size));
        let end = (start + page_size).min(len);
        Self {
            start,
            end,
            prev: prev_start(start, page_size),
            next: next_start(start, len, page_size),
            has_prev: start > 0,
            has_next: end < len,
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.start.min(items.len())..self.end.min(items.len())]
    }
}
