//! Client-side paging over a list the store already returned newest first.
//!
//! Rows are numbered from the list length down to 1 regardless of page, so
//! the newest post always carries the highest number.

use std::ops::RangeInclusive;

pub const POSTS_PER_PAGE: usize = 5;

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Items of 1-indexed `page`. Out of range pages are empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let Some(start) = page.checked_sub(1).and_then(|p| p.checked_mul(page_size)) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<'a, T> {
    pub number: usize,
    pub item: &'a T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    current: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.page_size)
    }

    /// Moves to `page` as requested; the view shows nothing if it is past
    /// the end.
    pub fn go_to(&mut self, page: usize) {
        self.current = page.max(1);
    }

    /// Call whenever the source list changes: keeps the current page inside
    /// `1..=max(1, total_pages)`.
    pub fn sync(&mut self, len: usize) {
        let last = self.total_pages(len).max(1);
        self.current = self.current.clamp(1, last);
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        page_slice(items, self.current, self.page_size)
    }

    pub fn rows<'a, T>(&self, items: &'a [T]) -> Vec<Row<'a, T>> {
        let first = items
            .len()
            .saturating_sub((self.current - 1).saturating_mul(self.page_size));
        self.visible(items)
            .iter()
            .enumerate()
            .map(|(offset, item)| Row {
                number: first - offset,
                item,
            })
            .collect()
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.current < self.total_pages(len)
    }

    /// Buttons for the page bar, `1..=total_pages`. Empty when there are no
    /// items.
    pub fn page_numbers(&self, len: usize) -> RangeInclusive<usize> {
        1..=self.total_pages(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(p: &Paginator, items: &[u32]) -> Vec<usize> {
        p.rows(items).iter().map(|r| r.number).collect()
    }

    #[test]
    fn page_count_is_ceiling() {
        for n in 0..40 {
            let expected = (n + POSTS_PER_PAGE - 1) / POSTS_PER_PAGE;
            assert_eq!(total_pages(n, POSTS_PER_PAGE), expected);
            assert_eq!(total_pages(n, POSTS_PER_PAGE) == 0, n == 0);
        }
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn slices_are_contiguous_and_sized() {
        let items: Vec<usize> = (0..23).collect();
        let pages = total_pages(items.len(), POSTS_PER_PAGE);
        let mut seen = Vec::new();
        for k in 1..=pages {
            let slice = page_slice(&items, k, POSTS_PER_PAGE);
            let expected = POSTS_PER_PAGE.min(items.len() - (k - 1) * POSTS_PER_PAGE);
            assert_eq!(slice.len(), expected);
            seen.extend_from_slice(slice);
        }
        assert_eq!(seen, items);
        assert!(page_slice(&items, 0, POSTS_PER_PAGE).is_empty());
        assert!(page_slice(&items, pages + 1, POSTS_PER_PAGE).is_empty());
        assert!(page_slice(&items, usize::MAX, POSTS_PER_PAGE).is_empty());
    }

    #[test]
    fn eleven_posts_over_three_pages() {
        let items: Vec<u32> = (0..11).collect();
        let mut p = Paginator::default();
        assert_eq!(p.total_pages(items.len()), 3);

        assert_eq!(numbers(&p, &items), vec![11, 10, 9, 8, 7]);
        assert!(!p.has_previous());
        assert!(p.has_next(items.len()));

        p.go_to(2);
        assert_eq!(numbers(&p, &items), vec![6, 5, 4, 3, 2]);

        p.go_to(3);
        assert_eq!(numbers(&p, &items), vec![1]);
        assert_eq!(p.visible(&items), &items[10..]);
        assert!(!p.has_next(items.len()));
    }

    #[test]
    fn twelve_posts_leave_two_on_the_last_page() {
        let items: Vec<u32> = (0..12).collect();
        let mut p = Paginator::default();
        p.go_to(3);
        assert_eq!(numbers(&p, &items), vec![2, 1]);
    }

    #[test]
    fn first_row_number_on_each_page() {
        let items: Vec<u32> = (0..17).collect();
        let mut p = Paginator::default();
        for k in 1..=p.total_pages(items.len()) {
            p.go_to(k);
            let rows = numbers(&p, &items);
            assert_eq!(rows[0], items.len() - (k - 1) * POSTS_PER_PAGE);
            assert!(rows.windows(2).all(|w| w[0] == w[1] + 1));
        }
    }

    #[test]
    fn sync_clamps_after_list_shrinks() {
        let mut p = Paginator::default();
        p.go_to(3);
        p.sync(4);
        assert_eq!(p.current_page(), 1);
        assert_eq!(numbers(&p, &[1, 2, 3, 4]), vec![4, 3, 2, 1]);

        p.go_to(2);
        p.sync(0);
        assert_eq!(p.current_page(), 1);
        assert!(p.rows::<u32>(&[]).is_empty());
        assert!(p.page_numbers(0).is_empty());
        assert!(!p.has_next(0));
    }

    #[test]
    fn unsynced_page_past_end_is_empty() {
        let mut p = Paginator::default();
        p.go_to(4);
        assert!(p.rows(&[1, 2, 3]).is_empty());
        assert_eq!(p.current_page(), 4);
    }
}
