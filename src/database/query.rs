//! Paginated query results.

/// A page request: 1-based page number plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    /// Page size used when the caller does not ask for one.
    pub const DEFAULT_SIZE: usize = 20;

    /// Build a page request. Page numbers below 1 are bumped to 1.
    #[must_use]
    pub fn new(number: usize, size: usize) -> Self {
        Self {
            number: number.max(1),
            size,
        }
    }

    /// How many records precede this page.
    #[must_use]
    pub fn offset(self) -> usize {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_SIZE)
    }
}

/// One page of results plus the metadata an API response needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Paged<T> {
    /// Collect an iterator into a single page, recording the total count.
    pub fn collect(items: impl IntoIterator<Item = T>, page: Page) -> Self {
        let all: Vec<T> = items.into_iter().collect();
        let total = all.len();

        let data = all
            .into_iter()
            .skip(page.offset())
            .take(page.size)
            .collect();

        Self {
            data,
            total,
            page: page.number,
            page_size: page.size,
        }
    }

    /// Whether records exist beyond this page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page.saturating_mul(self.page_size) < self.total
    }

    /// Whether this is any page but the first.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}
