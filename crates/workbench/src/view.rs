//! Derived listing views. Everything here is a pure function of the store
//! contents plus cursor inputs; nothing mutates the collection.

use std::ops::Range;

use clinicase_core::PatientCase;

use crate::store::CaseStore;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// One rendered page of the (possibly filtered) listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CasePage<'a> {
    /// 1-based, already clamped into `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
    /// Number of cases matching the search term.
    pub total_items: usize,
    pub page_size: usize,
    pub items: Vec<&'a PatientCase>,
}

impl CasePage<'_> {
    /// 1-based inclusive `(first, last)` positions on this page, or `None`
    /// when nothing matched.
    pub fn showing(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = (self.page - 1) * self.page_size + 1;
        Some((first, first + self.items.len() - 1))
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Normalize a raw search input into the lowercase needle used for matching.
pub fn normalize_search(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Cases whose title contains `term`, case-insensitively, in store order.
pub fn filter_cases<'a, I>(cases: I, term: &str) -> Vec<&'a PatientCase>
where
    I: IntoIterator<Item = &'a PatientCase>,
{
    let needle = normalize_search(term);
    cases
        .into_iter()
        .filter(|case| case.title_matches(&needle))
        .collect()
}

/// `ceil(total / page_size)`, never less than 1.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if total == 0 {
        1
    } else {
        total.div_ceil(page_size.max(1))
    }
}

/// Clamp a requested 1-based page into `1..=total_pages`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Index range of `page` (1-based, clamped) within `total` items.
pub fn page_range(page: usize, page_size: usize, total: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let page = clamp_page(page, total_pages(total, page_size));
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    start.min(end)..end
}

/// Slice an already-filtered sequence into one page.
pub fn paginate<'a>(filtered: &[&'a PatientCase], page: usize, page_size: usize) -> CasePage<'a> {
    let page_size = page_size.max(1);
    let total_items = filtered.len();
    let total_pages = total_pages(total_items, page_size);
    let page = clamp_page(page, total_pages);
    CasePage {
        page,
        total_pages,
        total_items,
        page_size,
        items: filtered[page_range(page, page_size, total_items)].to_vec(),
    }
}

/// Filter then paginate the store for display.
pub fn derive_page<'a>(
    store: &'a CaseStore,
    search: &str,
    page: usize,
    page_size: usize,
) -> CasePage<'a> {
    paginate(&filter_cases(store, search), page, page_size)
}
