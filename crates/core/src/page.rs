//! Pagination value types shared by listings.

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// Requested page window. Out-of-range values are clamped, not rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(DEFAULT_PAGE),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Zero-based offset of the first item in the window.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the totals the listing UIs need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, params: PageParams, total: u64) -> Self {
        Self {
            items,
            page: params.page,
            limit: params.limit,
            total,
        }
    }

    pub fn total_pages(&self) -> u64 {
        (self.total + u64::from(self.limit) - 1) / u64::from(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_and_limit() {
        let p = PageParams::new(0, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 1);

        let p = PageParams::new(3, 500);
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset(), 200);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], PageParams::new(1, 10), 21);
        assert_eq!(page.total_pages(), 3);
    }
}
