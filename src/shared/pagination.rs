use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?page=&page_size=` as sent by clients. Zero or missing values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,

    #[serde(default)]
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.per_page as u64
    }

    pub fn limit(&self) -> u64 {
        self.per_page as u64
    }
}

impl From<PageQuery> for PageRequest {
    fn from(q: PageQuery) -> Self {
        Self {
            page: if q.page == 0 { 1 } else { q.page },
            per_page: match q.page_size {
                0 => DEFAULT_PAGE_SIZE,
                n => n.min(MAX_PAGE_SIZE),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, page: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        }
    }

    pub fn empty(page: PageRequest) -> Self {
        Self::new(Vec::new(), page, 0)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_use_defaults() {
        let page: PageRequest = PageQuery::default().into();
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_size_is_capped() {
        let page: PageRequest = PageQuery {
            page: 3,
            page_size: 500,
        }
        .into();

        assert_eq!(page.per_page, MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 200);
        assert_eq!(page.limit(), 100);
    }

    #[test]
    fn map_keeps_paging_metadata() {
        let page = PageRequest { page: 2, per_page: 5 };
        let result = PageResult::new(vec![1, 2], page, 7).map(|n| n * 10);

        assert_eq!(result.items, vec![10, 20]);
        assert_eq!(result.page, 2);
        assert_eq!(result.per_page, 5);
        assert_eq!(result.total, 7);
    }
}
