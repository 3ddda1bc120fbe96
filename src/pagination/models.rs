use serde::Serialize;

/// First page of every list, whatever the endpoint's own numbering.
pub const FIRST_PAGE: u32 = 1;

/// One page of a paged list, normalized to 1-based numbering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_page: u32,
    pub total_items: u64,
}

impl<T> PageResult<T> {
    /// The "nothing fetched" result: no items, zero pages.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            current_page: 0,
            total_page: 0,
            total_items: 0,
        }
    }

    /// An empty page also ends the list, whatever `total_page` claims.
    pub fn has_next_page(&self) -> bool {
        !self.items.is_empty() && self.current_page < self.total_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_next_page() {
        let page = PageResult {
            items: vec![1, 2],
            current_page: 1,
            total_page: 3,
            total_items: 5,
        };
        assert!(page.has_next_page());

        let last = PageResult {
            current_page: 3,
            ..page.clone()
        };
        assert!(!last.has_next_page());

        let hollow = PageResult::<i32> {
            items: vec![],
            ..page
        };
        assert!(!hollow.has_next_page());
        assert!(!PageResult::<i32>::empty().has_next_page());
    }
}
