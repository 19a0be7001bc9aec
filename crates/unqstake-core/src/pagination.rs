//! Client-side pagination of history tables.

use std::ops::Range;

/// Page sizes offered to the user.
pub const PAGE_SIZE_OPTIONS: &[usize] = &[10, 25, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page strips with at most this many pages list every page.
const FULL_STRIP_MAX_PAGES: usize = 7;

/// One entry of a page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

/// Pagination state for one table. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total_items: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// A zero page size falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
            total_items: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// `ceil(total_items / page_size)`; zero for an empty table.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size)
    }

    /// Replace the item count, keeping the current page when it still exists.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        let total_pages = self.total_pages();
        if self.page > total_pages {
            self.page = total_pages.max(1);
        }
    }

    /// Jump to a page. Pages outside `[1, total_pages]` are ignored.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.total_pages() {
            self.page = page;
            true
        } else {
            false
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.page > 1 && self.go_to_page(self.page - 1)
    }

    /// Change the page size and return to page 1. Zero is ignored.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        if page_size == 0 {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        true
    }

    /// Index range of the current page.
    pub fn range(&self) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    /// Items of the current page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }

    /// Page-number strip: every page when there are few, otherwise the first
    /// and last page, the current page with its neighbours, and ellipses for
    /// the gaps.
    pub fn page_markers(&self) -> Vec<PageMarker> {
        let total = self.total_pages();
        if total <= FULL_STRIP_MAX_PAGES {
            return (1..=total).map(PageMarker::Page).collect();
        }

        let current = self.page;
        let start = current.saturating_sub(1).max(2);
        let end = (current + 1).min(total - 1);

        let mut markers = vec![PageMarker::Page(1)];
        if start > 2 {
            markers.push(PageMarker::Ellipsis);
        }
        markers.extend((start..=end).map(PageMarker::Page));
        if end < total - 1 {
            markers.push(PageMarker::Ellipsis);
        }
        markers.push(PageMarker::Page(total));
        markers
    }
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub page: usize,
    pub total_pages: usize,
    pub items: &'a [T],
}

/// Slice `items` into pages of `page_size` and return page `page`.
///
/// An out-of-range page leaves the view on page 1.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Page<'_, T> {
    let mut state = Pagination::new(page_size);
    state.set_total_items(items.len());
    state.go_to_page(page);
    Page {
        page: state.page(),
        total_pages: state.total_pages(),
        items: state.slice(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(total: usize, size: usize) -> Pagination {
        let mut p = Pagination::new(size);
        p.set_total_items(total);
        p
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(state(25, 10).total_pages(), 3);
        assert_eq!(state(30, 10).total_pages(), 3);
        assert_eq!(state(0, 10).total_pages(), 0);
        assert_eq!(state(1, 50).total_pages(), 1);
    }

    #[test]
    fn test_last_page_slice() {
        let items: Vec<u32> = (0..25).collect();
        let mut p = state(items.len(), 10);
        assert!(p.go_to_page(3));
        assert_eq!(p.slice(&items), &[20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut p = state(25, 10);
        assert!(p.go_to_page(2));
        assert!(!p.go_to_page(0));
        assert!(!p.go_to_page(4));
        assert_eq!(p.page(), 2);
    }

    #[test]
    fn test_page_size_change_resets() {
        let mut p = state(25, 10);
        p.go_to_page(3);
        assert!(p.set_page_size(25));
        assert_eq!(p.page(), 1);
        assert_eq!(p.total_pages(), 1);
        assert!(!p.set_page_size(0));
        assert_eq!(p.page_size(), 25);
    }

    #[test]
    fn test_next_prev() {
        let mut p = state(15, 10);
        assert!(!p.prev_page());
        assert!(p.next_page());
        assert!(!p.next_page());
        assert_eq!(p.page(), 2);
        assert!(p.prev_page());
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn test_shrinking_items_clamps_page() {
        let mut p = state(50, 10);
        p.go_to_page(5);
        p.set_total_items(12);
        assert_eq!(p.page(), 2);
        p.set_total_items(0);
        assert_eq!(p.page(), 1);
        assert!(p.slice::<u8>(&[]).is_empty());
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 10, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.first(), Some(&11));

        let page = paginate(&items, 10, 9);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 10);
    }

    #[test]
    fn test_page_markers_small() {
        let p = state(70, 10);
        assert_eq!(
            p.page_markers(),
            (1..=7).map(PageMarker::Page).collect::<Vec<_>>()
        );
        assert!(state(0, 10).page_markers().is_empty());
    }

    #[test]
    fn test_page_markers_large() {
        use PageMarker::*;
        let mut p = state(200, 10);
        assert_eq!(p.page_markers(), vec![Page(1), Page(2), Ellipsis, Page(20)]);

        p.go_to_page(10);
        assert_eq!(
            p.page_markers(),
            vec![Page(1), Ellipsis, Page(9), Page(10), Page(11), Ellipsis, Page(20)]
        );

        p.go_to_page(20);
        assert_eq!(p.page_markers(), vec![Page(1), Ellipsis, Page(19), Page(20)]);

        p.go_to_page(3);
        assert_eq!(
            p.page_markers(),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(20)]
        );
    }
}
