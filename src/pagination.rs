//! Page windows for listing endpoints.

use serde::Serialize;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Highest page number a listing accepts.
pub const MAX_PAGE: usize = 1_000_000;

/// Page numbers to render around `current_page`; `None` marks a gap.
fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current)
        .saturating_add(1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    /// Wraps one page of `items` out of `total` rows split into pages of
    /// `per_page`.
    pub fn new(items: Vec<T>, current_page: usize, total: usize, per_page: usize) -> Self {
        let current_page = current_page.max(1);
        let total_pages = total.div_ceil(per_page.max(1));

        let pages = get_pages(total_pages, current_page, 2, 2, 4, 2);

        Self {
            items,
            pages,
            page: current_page,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_listings_show_every_page() {
        let page = Paginated::new(vec![1, 2, 3], 1, 45, 20);
        assert_eq!(page.pages, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(page.total, 45);
    }

    #[test]
    fn long_listings_collapse_into_gaps() {
        let page = Paginated::<u8>::new(vec![], 10, 400, 20);
        assert_eq!(
            page.pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20)
            ]
        );
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let page = Paginated::<u8>::new(vec![], usize::MAX, 45, 20);
        assert_eq!(page.page, usize::MAX);
        assert_eq!(page.pages, vec![Some(1), Some(2), None]);
    }

    #[test]
    fn page_zero_is_treated_as_first() {
        let page = Paginated::<u8>::new(vec![], 0, 0, 20);
        assert_eq!(page.page, 1);
        assert!(page.pages.is_empty());
    }
}
