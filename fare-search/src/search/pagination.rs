//! Row-limit pagination.
//!
//! The fare API has no offsets, so "load more" re-requests the whole list
//! with a larger limit. A page that comes back with fewer rows than were
//! asked for marks the end of the data.

use crate::domain::ResultPage;

/// Tracks the growing row limit of one parameter set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page_size: u32,
    current_limit: u32,
    last_page_size: usize,
    saturated: bool,
}

impl Pagination {
    /// Start at one page of `page_size` rows. Zero is raised to one.
    pub fn new(page_size: u32) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            current_limit: page_size,
            last_page_size: page_size as usize,
            saturated: true,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The limit of the most recently applied page.
    pub fn current_limit(&self) -> u32 {
        self.current_limit
    }

    /// Rows returned by the most recently applied page.
    pub fn last_page_size(&self) -> usize {
        self.last_page_size
    }

    /// Whether the last page was saturated, so more rows may exist.
    pub fn has_more(&self) -> bool {
        self.saturated
    }

    /// The limit a "load more" should request, or `None` at end of data.
    ///
    /// Does not change any state; the new limit only takes effect once its
    /// page is recorded.
    pub fn next_limit(&self) -> Option<u32> {
        if !self.has_more() {
            return None;
        }
        self.current_limit.checked_add(self.page_size)
    }

    /// Record an applied page; its limit becomes the current one.
    pub fn record_page(&mut self, page: &ResultPage) {
        self.current_limit = page.requested_limit().max(1);
        self.last_page_size = page.len();
        self.saturated = page.is_saturated();
    }

    /// Back to the first page, optimistically assuming more data exists.
    pub fn reset(&mut self) {
        self.current_limit = self.page_size;
        self.last_page_size = self.page_size as usize;
        self.saturated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineRecord;

    fn page(limit: u32, rows: usize) -> ResultPage {
        let lines = (0..rows).map(|i| LineRecord::new(i.to_string())).collect();
        ResultPage::new(lines, limit)
    }

    #[test]
    fn starts_optimistic() {
        let p = Pagination::new(20);
        assert_eq!(p.current_limit(), 20);
        assert!(p.has_more());
        assert_eq!(p.next_limit(), Some(40));
    }

    #[test]
    fn saturated_page_grows_limit() {
        let mut p = Pagination::new(20);
        p.record_page(&page(20, 20));
        assert_eq!(p.next_limit(), Some(40));

        p.record_page(&page(40, 40));
        assert_eq!(p.next_limit(), Some(60));
    }

    #[test]
    fn short_page_ends_pagination() {
        let mut p = Pagination::new(20);
        p.record_page(&page(20, 20));
        p.record_page(&page(40, 25));
        assert!(!p.has_more());
        assert_eq!(p.next_limit(), None);
        assert_eq!(p.next_limit(), None);
    }

    #[test]
    fn empty_page_ends_pagination() {
        let mut p = Pagination::new(20);
        p.record_page(&page(20, 0));
        assert_eq!(p.next_limit(), None);
    }

    #[test]
    fn next_limit_is_side_effect_free() {
        let p = Pagination::new(20);
        let _ = p.next_limit();
        assert_eq!(p.current_limit(), 20);
    }

    #[test]
    fn reset_restores_first_page() {
        let mut p = Pagination::new(20);
        p.record_page(&page(60, 3));
        p.reset();
        assert_eq!(p.current_limit(), 20);
        assert_eq!(p.last_page_size(), 20);
        assert!(p.has_more());
    }

    #[test]
    fn limit_overflow_stops_pagination() {
        let p = Pagination::new(u32::MAX - 5);
        assert!(p.has_more());
        assert_eq!(p.next_limit(), None);
    }

    #[test]
    fn follows_page_saturation() {
        let mut p = Pagination::new(20);
        let full = page(20, 20);
        p.record_page(&full);
        assert_eq!(p.has_more(), full.is_saturated());

        let short = page(40, 39);
        p.record_page(&short);
        assert_eq!(p.has_more(), short.is_saturated());
        assert_eq!(p.last_page_size(), 39);
    }
}
