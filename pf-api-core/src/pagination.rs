// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! In-memory pagination over an already-fetched result list.

pub static DEFAULT_PAGE_SIZE: i32 = 15;

/// A normalized page request. Stateless; all methods are pure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paginator {
    pub page: i32,
    pub page_size: i32,
}

/// The clamped window a `Paginator` resolves to for a given total count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub page: i32,
    pub pages: i32,
    pub start: usize,
    pub end: usize,
}

impl Paginator {
    /// A non-positive or missing page size falls back to the default.
    pub fn new(page: Option<i32>, page_size: Option<i32>) -> Self {
        let page_size = match page_size {
            Some(size) if size > 0 => size,
            _ => DEFAULT_PAGE_SIZE,
        };
        Paginator {
            page: page.unwrap_or(1),
            page_size,
        }
    }

    pub fn pages(&self, total_count: usize) -> i32 {
        (total_count as f64 / self.page_size as f64).ceil() as i32
    }

    /// Clamp the requested page into `[1, pages]` (high bound first, then
    /// low) and compute the half-open index window over `total_count` items.
    pub fn window(&self, total_count: usize) -> Window {
        let pages = self.pages(total_count);

        let mut page = self.page;
        if page > pages {
            page = pages;
        }
        if page <= 0 {
            page = 1;
        }

        let start = usize::min(((page - 1) * self.page_size) as usize, total_count);
        let end = usize::min(start + self.page_size as usize, total_count);

        Window { page, pages, start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_zero_clamps_to_first_page() {
        let window = Paginator::new(Some(0), Some(15)).window(10);
        assert_eq!(window.page, 1);
        assert_eq!(window.pages, 1);
        assert_eq!((window.start, window.end), (0, 10));
    }

    #[test]
    fn page_past_the_end_clamps_to_last_page() {
        let window = Paginator::new(Some(100), Some(10)).window(25);
        assert_eq!(window.page, 3);
        assert_eq!(window.pages, 3);
        assert_eq!((window.start, window.end), (20, 25));
    }

    #[test]
    fn non_positive_page_size_defaults() {
        let paginator = Paginator::new(Some(1), Some(0));
        assert_eq!(paginator.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(Paginator::new(Some(1), None).page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(Paginator::new(Some(1), Some(-3)).page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn pages_is_ceiling_of_total_over_size() {
        let paginator = Paginator::new(Some(1), Some(10));
        assert_eq!(paginator.pages(0), 0);
        assert_eq!(paginator.pages(1), 1);
        assert_eq!(paginator.pages(10), 1);
        assert_eq!(paginator.pages(11), 2);
        assert_eq!(paginator.pages(25), 3);
    }

    #[test]
    fn window_length_is_min_of_size_and_remainder() {
        for total in 0..40usize {
            for page in -2..6 {
                let window = Paginator::new(Some(page), Some(7)).window(total);
                let expected = usize::min(7, total - window.start);
                assert_eq!(window.end - window.start, expected);
                assert!(window.end <= total);
            }
        }
    }

    #[test]
    fn empty_list_yields_empty_window() {
        let window = Paginator::new(Some(3), Some(15)).window(0);
        assert_eq!(window.pages, 0);
        assert_eq!((window.start, window.end), (0, 0));
    }
}
