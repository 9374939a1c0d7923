//! Page-based pagination.
//!
//! [`PageRequest`] turns a 1-based page number and a page size into an
//! `OFFSET`/`LIMIT` pair. [`PageResult`] wraps one page of rows together with
//! the totals needed to render a pager.
//!
//! # Example
//!
//! ```ignore
//! use roster_core::pagination::{PageRequest, PageResult};
//!
//! let page = PageRequest::new(2, 10);
//! assert_eq!(page.offset(), 10);
//!
//! let result = PageResult::new(2, 10, 25, rows);
//! assert_eq!(result.total_pages(), 3);
//! assert!(result.has_next());
//! ```

use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Number of pages needed for `total_count` rows, or `None` for a
/// non-positive `page_size`.
#[must_use]
pub fn total_pages(total_count: i64, page_size: i64) -> Option<i64> {
    if page_size <= 0 {
        return None;
    }
    let total_count = total_count.max(0);
    Some(total_count / page_size + i64::from(total_count % page_size != 0))
}

/// Rows skipped before page `current_page`. Never negative; pages far past
/// the end saturate instead of overflowing.
fn page_offset(current_page: i64, page_size: i64) -> i64 {
    current_page
        .saturating_sub(1)
        .saturating_mul(page_size)
        .max(0)
}

/// A requested page. The values are taken as given; call
/// [`PageRequest::normalized`] to apply the defaults for out-of-range input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub current_page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            current_page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(current_page: i64, page_size: i64) -> Self {
        Self {
            current_page,
            page_size,
        }
    }

    /// Pages below 1 become 1, sizes below 1 become the default size.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            current_page: if self.current_page < 1 {
                DEFAULT_PAGE
            } else {
                self.current_page
            },
            page_size: if self.page_size < 1 {
                DEFAULT_PAGE_SIZE
            } else {
                self.page_size
            },
        }
    }

    /// `(current_page - 1) * page_size`, saturating at `i64::MAX`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        page_offset(self.current_page, self.page_size)
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// One page of results plus pagination metadata.
///
/// `total_pages` is derived from `total_count` and `page_size` and is
/// recomputed whenever either changes through a setter. A non-positive page
/// size leaves `total_pages` untouched; [`PageResult::is_valid`] reports it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    current_page: i64,
    page_size: i64,
    total_count: i64,
    total_pages: i64,
    data: Vec<T>,
}

impl<T> PageResult<T> {
    pub fn new(current_page: i64, page_size: i64, total_count: i64, data: Vec<T>) -> Self {
        Self {
            current_page,
            page_size,
            total_count,
            total_pages: total_pages(total_count, page_size).unwrap_or(0),
            data,
        }
    }

    /// A zero-row page for the given request.
    pub fn empty(current_page: i64, page_size: i64) -> Self {
        Self::new(current_page, page_size, 0, Vec::new())
    }

    pub fn current_page(&self) -> i64 {
        self.current_page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn total_count(&self) -> i64 {
        self.total_count
    }

    pub fn total_pages(&self) -> i64 {
        self.total_pages
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn set_total_count(&mut self, total_count: i64) {
        self.total_count = total_count;
        self.recompute_total_pages();
    }

    pub fn set_page_size(&mut self, page_size: i64) {
        self.page_size = page_size;
        self.recompute_total_pages();
    }

    fn recompute_total_pages(&mut self) {
        if let Some(pages) = total_pages(self.total_count, self.page_size) {
            self.total_pages = pages;
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Row offset of the first entry on this page.
    pub fn offset(&self) -> i64 {
        page_offset(self.current_page, self.page_size)
    }

    pub fn is_valid(&self) -> bool {
        self.page_size > 0
    }

    /// Converts every row, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnMut(T) -> U,
    {
        PageResult {
            current_page: self.current_page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
