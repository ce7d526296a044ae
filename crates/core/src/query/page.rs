use serde::{Deserialize, Serialize};

use super::PageSpec;

/// One page of a paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of items matching the filter across all pages.
    pub total_count: usize,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Wraps already-paginated items.
    pub fn new(items: Vec<T>, total_count: usize, page: PageSpec) -> Self {
        let size = page.size.max(1) as usize;
        let total_pages = u32::try_from(total_count.div_ceil(size)).unwrap_or(u32::MAX);
        Self {
            items,
            total_count,
            page_number: page.number,
            page_size: page.size,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }
}
