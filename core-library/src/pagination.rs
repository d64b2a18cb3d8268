//! Paging over view rows
//!
//! The library grid shows the filtered ordering a screenful at a time. These
//! types cut an already-computed row list into pages; they never re-run the
//! sort or filter.

use serde::{Deserialize, Serialize};

/// Which slice of the rows to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (0-indexed)
    pub page: u32,
    /// Rows per page
    pub page_size: u32,
}

impl PageRequest {
    /// Create a new page request
    ///
    /// # Examples
    ///
    /// ```
    /// use core_library::pagination::PageRequest;
    ///
    /// let request = PageRequest::new(2, 20);
    /// assert_eq!(request.offset(), 40);
    /// ```
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Index of the first row on this page
    pub fn offset(&self) -> usize {
        (self.page as usize).saturating_mul(self.page_size as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 50,
        }
    }
}

/// One page of rows plus enough metadata to render a pager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Rows across all pages
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl<T: Clone> Page<T> {
    /// Cut `request`'s page out of `rows`.
    ///
    /// Pages past the end come back empty with the real totals, so a pager
    /// can still clamp itself.
    ///
    /// ```
    /// use core_library::pagination::{Page, PageRequest};
    ///
    /// let rows: Vec<usize> = (0..25).collect();
    /// let page = Page::from_rows(&rows, PageRequest::new(2, 10));
    ///
    /// assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
    /// assert_eq!(page.total_pages, 3);
    /// assert!(!page.has_next());
    /// ```
    pub fn from_rows(rows: &[T], request: PageRequest) -> Self {
        let items = if request.page_size == 0 {
            Vec::new()
        } else {
            rows.iter()
                .skip(request.offset())
                .take(request.page_size as usize)
                .cloned()
                .collect()
        };

        Self::new(items, rows.len() as u64, request)
    }
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let total_pages = if request.page_size == 0 {
            0
        } else {
            total.div_ceil(request.page_size as u64) as u32
        };

        Self {
            items,
            total,
            page: request.page,
            total_pages,
            page_size: request.page_size,
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < u64::from(self.total_pages)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Map the items to a different type, e.g. row indices to titles
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
            page_size: self.page_size,
        }
    }
}
