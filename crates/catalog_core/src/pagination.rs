//! Page arithmetic shared by query derivation and the pagination controls.

use serde::Serialize;

/// Fixed number of products requested per page.
pub const PAGE_SIZE: u32 = 12;
/// Maximum number of page-number buttons shown at once.
pub const PAGE_WINDOW: u32 = 5;

pub fn total_pages(total_count: u64) -> u32 {
    u32::try_from(total_count.div_ceil(u64::from(PAGE_SIZE))).unwrap_or(u32::MAX)
}

pub fn offset_for_page(page: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(PAGE_SIZE)
}

/// Page numbers to render as buttons, centred on `page` where possible.
pub fn page_window(page: u32, total_pages: u32) -> Vec<u32> {
    let half = PAGE_WINDOW / 2;
    let start = if total_pages <= PAGE_WINDOW || page <= half + 1 {
        1
    } else if page >= total_pages - half {
        total_pages - (PAGE_WINDOW - 1)
    } else {
        page - half
    };
    let len = total_pages.min(PAGE_WINDOW);
    (start..start + len).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
    pub window: Vec<u32>,
}

impl PaginationView {
    pub fn new(page: u32, total_count: u64) -> Self {
        let total_pages = total_pages(total_count);
        Self {
            page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
            window: page_window(page, total_pages),
        }
    }

    /// Controls are hidden when everything fits on one page.
    pub fn shows_controls(&self) -> bool {
        self.total_pages > 1
    }
}
