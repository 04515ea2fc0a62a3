use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 1000;

/// Pagination parameters for listing projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: usize,
    pub offset: usize,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl PageQuery {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Query for the page following `page`, if any remain.
    pub fn next<T>(&self, page: &Page<T>) -> Option<Self> {
        let consumed = self.offset + page.items.len();
        (consumed < page.total && !page.items.is_empty()).then(|| self.with_offset(consumed))
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(PageQuery::new().limit, 50);
        assert_eq!(PageQuery::new().with_limit(5000).limit, 1000);
        assert_eq!(PageQuery::new().with_limit(0).limit, 1);
    }

    #[test]
    fn next_page_until_exhausted() {
        let q = PageQuery::new().with_limit(2);
        let page = Page {
            items: vec![1, 2],
            total: 3,
        };
        let next = q.next(&page).expect("one item left");
        assert_eq!(next.offset, 2);

        let last = Page {
            items: vec![3],
            total: 3,
        };
        assert!(next.next(&last).is_none());
    }
}
