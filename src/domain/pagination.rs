use std::ops::Range;

use crate::domain::{Article, RawContentPayload};

/// One-based page index plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page_index: usize,
    page_size: usize,
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 1,
            page_size,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index 0 is clamped to the first page.
    pub fn set_page_index(&mut self, page_index: usize) {
        self.page_index = page_index.max(1);
    }

    /// Explicit page-size choice. Always returns to the first page.
    pub fn select_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page_index = 1;
    }

    /// Auto-grow step. Keeps the current page.
    pub fn grow(&mut self, step: usize) {
        self.page_size = self.page_size.saturating_add(step);
    }

    /// Slice bounds for a list of `total` items. `start <= end <= total`.
    pub fn bounds(&self, total: usize) -> Range<usize> {
        let start = (self.page_index - 1)
            .saturating_mul(self.page_size)
            .min(total);
        let end = self.page_index.saturating_mul(self.page_size).min(total);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.bounds(items.len())]
    }

    pub fn page_count(&self, total: usize) -> usize {
        if self.page_size == 0 {
            0
        } else {
            total.div_ceil(self.page_size)
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(0)
    }
}

/// The visible slice of the most-read list and the unsliced total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginatedView {
    pub articles: Vec<Article>,
    pub count: usize,
}

impl PaginatedView {
    pub fn derive(payload: Option<&RawContentPayload>, pagination: &PaginationState) -> Self {
        let all = payload.map(|p| p.most_read()).unwrap_or(&[]);
        Self {
            articles: pagination.slice(all).to_vec(),
            count: all.len(),
        }
    }
}
