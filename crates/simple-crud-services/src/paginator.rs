//! Page bookkeeping and the sliding window of direct page links

use serde::Serialize;
use std::ops::Range;

pub const DEFAULT_DIRECT_LINKS_COUNT: usize = 3;

/// Pagination state for one rendering of a table.
///
/// Pages are numbered from `base`. The requested page is clamped into
/// `first_page()..=last_page()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginator {
    base: usize,
    page: usize,
    items_per_page: usize,
    item_count: usize,
    direct_links_count: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            base: 0,
            page: 0,
            items_per_page: 1,
            item_count: 0,
            direct_links_count: DEFAULT_DIRECT_LINKS_COUNT,
        }
    }
}

impl Paginator {
    pub fn new(page: usize, items_per_page: usize, item_count: usize) -> Self {
        Self::default()
            .with_items_per_page(items_per_page)
            .with_item_count(item_count)
            .with_page(page)
    }

    pub fn with_base(mut self, base: usize) -> Self {
        self.base = base;
        self
    }

    /// Requested page number, in `base` numbering
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page.max(1);
        self
    }

    pub fn with_item_count(mut self, item_count: usize) -> Self {
        self.item_count = item_count;
        self
    }

    pub fn with_direct_links_count(mut self, count: usize) -> Self {
        self.direct_links_count = count;
        self
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn direct_links_count(&self) -> usize {
        self.direct_links_count
    }

    pub fn page_count(&self) -> usize {
        self.item_count.div_ceil(self.items_per_page)
    }

    pub fn first_page(&self) -> usize {
        self.base
    }

    pub fn last_page(&self) -> usize {
        self.base + self.page_count().saturating_sub(1)
    }

    /// Zero-based index of the current page after clamping
    fn page_index(&self) -> usize {
        self.page
            .saturating_sub(self.base)
            .min(self.page_count().saturating_sub(1))
    }

    /// Current page, clamped to the existing pages
    pub fn page(&self) -> usize {
        self.base + self.page_index()
    }

    pub fn is_first(&self) -> bool {
        self.page() == self.first_page()
    }

    pub fn is_last(&self) -> bool {
        self.page() == self.last_page()
    }

    /// Number of items skipped before the current page
    pub fn offset(&self) -> usize {
        self.page_index() * self.items_per_page
    }

    /// Number of items on the current page
    pub fn length(&self) -> usize {
        self.items_per_page
            .min(self.item_count.saturating_sub(self.offset()))
    }

    /// One-based position of the first item on the page, 0 when empty
    pub fn first_item_on_page(&self) -> usize {
        if self.item_count == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    pub fn last_item_on_page(&self) -> usize {
        self.offset() + self.length()
    }

    /// First page of the direct link window (inclusive)
    pub fn direct_links_from(&self) -> usize {
        if self.direct_links_count >= self.page_count() {
            self.first_page()
        } else {
            self.page()
                .saturating_sub(self.direct_links_count / 2)
                .max(self.first_page())
        }
    }

    /// End of the direct link window (exclusive)
    pub fn direct_links_to(&self) -> usize {
        let end = self.first_page() + self.page_count();
        if self.direct_links_count >= self.page_count() {
            end
        } else {
            (self.direct_links_from() + self.direct_links_count).min(end)
        }
    }

    /// Pages to render as direct links
    pub fn direct_links(&self) -> Range<usize> {
        self.direct_links_from()..self.direct_links_to()
    }
}
