use serde::Serialize;

use crate::marketplace::error::MarketplaceError;

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub current_page: usize,
    pub items_per_page: usize,
}

impl PageRequest {
    /// Pages below one are read as the first page; a zero page size is rejected.
    pub fn new(current_page: usize, items_per_page: usize) -> Result<Self, MarketplaceError> {
        if items_per_page == 0 {
            return Err(MarketplaceError::Validation(
                "itemsPerPage must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            current_page: current_page.max(1),
            items_per_page,
        })
    }

    pub fn start_index(&self) -> usize {
        (self.current_page - 1).saturating_mul(self.items_per_page)
    }

    pub fn end_index(&self) -> usize {
        self.start_index().saturating_add(self.items_per_page)
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.items_per_page)
    }
}

/// A slice of a filtered result set plus the arithmetic that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl<T> Page<T> {
    /// Slice `items`. A page past the last one is empty rather than an error.
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total_items = items.len();
        let start_index = request.start_index();
        let end_index = request.end_index();
        let items = items
            .into_iter()
            .skip(start_index)
            .take(request.items_per_page)
            .collect();

        Self {
            items,
            current_page: request.current_page,
            items_per_page: request.items_per_page,
            total_items,
            total_pages: request.total_pages(total_items),
            start_index,
            end_index,
        }
    }
}
