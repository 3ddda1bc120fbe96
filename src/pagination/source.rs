use async_trait::async_trait;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use super::models::PageResult;
use crate::api::ApiError;

/// A paged list endpoint, addressed by a filter tuple and a 1-based page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Every filter input of the list. Doubles as the cache key.
    type Query: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    type Item: Clone + Send + Sync + 'static;

    /// `false` when a required filter is missing; no request is made then.
    fn is_ready(&self, query: &Self::Query) -> bool {
        let _ = query;
        true
    }

    async fn fetch_page(
        &self,
        query: &Self::Query,
        page: u32,
    ) -> Result<PageResult<Self::Item>, ApiError>;
}

#[async_trait]
impl<S: PageSource> PageSource for Arc<S> {
    type Query = S::Query;
    type Item = S::Item;

    fn is_ready(&self, query: &Self::Query) -> bool {
        (**self).is_ready(query)
    }

    async fn fetch_page(
        &self,
        query: &Self::Query,
        page: u32,
    ) -> Result<PageResult<Self::Item>, ApiError> {
        (**self).fetch_page(query, page).await
    }
}
