use serde::{Deserialize, Serialize};

/// Pagination metadata as reported by the CMS (`meta.pagination`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub total: u32,
}

impl Pagination {
    /// Derives `page_count = ceil(total / page_size)`.
    pub fn from_total(page: u32, page_size: u32, total: u32) -> Self {
        let page_count = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };
        Self {
            page,
            page_size,
            page_count,
            total,
        }
    }

    /// Used when a list response carries no `meta` block.
    pub fn single_page(len: usize) -> Self {
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        Self::from_total(1, len.max(1), len)
    }

    pub fn has_more(&self) -> bool {
        self.page < self.page_count
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.pagination.has_more()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
