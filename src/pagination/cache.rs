//! Short-lived page cache keyed by the full filter tuple.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use super::models::PageResult;
use super::source::PageSource;
use crate::api::ApiError;

/// Default lifetime of a cached page.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Something holding data that a mutation can make stale.
pub trait Invalidate: Send + Sync {
    fn invalidate_all(&self);
}

struct CacheEntry<T> {
    stored_at: Instant,
    page: PageResult<T>,
}

/// Wraps a [`PageSource`], serving repeated (query, page) requests from
/// memory until they are older than the TTL. Errors are never cached.
///
/// A page fetched across an invalidation is returned to its caller but not
/// stored.
pub struct CachedSource<S: PageSource> {
    inner: S,
    ttl: Duration,
    entries: DashMap<(S::Query, u32), CacheEntry<S::Item>>,
    /// Bumped by every invalidation.
    epoch: AtomicU64,
}

impl<S: PageSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
            epoch: AtomicU64::new(0),
        }
    }

    /// Drops every cached page of `query`.
    pub fn invalidate(&self, query: &S::Query) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.entries.retain(|(cached, _), _| cached != query);
    }

    /// Drops entries older than the TTL.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, key: &(S::Query, u32)) -> Option<PageResult<S::Item>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.page.clone());
            }
        }
        let ttl = self.ttl;
        self.entries
            .remove_if(key, |_, entry| entry.stored_at.elapsed() >= ttl);
        None
    }
}

impl<S: PageSource> Invalidate for CachedSource<S> {
    fn invalidate_all(&self) {
        tracing::debug!(entries = self.entries.len(), "Invalidating page cache");
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
    }
}

#[async_trait]
impl<S: PageSource> PageSource for CachedSource<S> {
    type Query = S::Query;
    type Item = S::Item;

    fn is_ready(&self, query: &Self::Query) -> bool {
        self.inner.is_ready(query)
    }

    async fn fetch_page(
        &self,
        query: &Self::Query,
        page: u32,
    ) -> Result<PageResult<Self::Item>, ApiError> {
        let key = (query.clone(), page);
        if let Some(hit) = self.lookup(&key) {
            tracing::trace!(?query, page, "Page cache hit");
            return Ok(hit);
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let fetched = self.inner.fetch_page(query, page).await?;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(?query, page, "Not caching page fetched across an invalidation");
            return Ok(fetched);
        }

        self.purge_expired();
        self.entries.insert(
            key.clone(),
            CacheEntry {
                stored_at: Instant::now(),
                page: fetched.clone(),
            },
        );
        // An invalidation that raced the insert may have missed the entry.
        if self.epoch.load(Ordering::SeqCst) != epoch {
            self.entries.remove(&key);
        }
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::fetch_all;
    use crate::pagination::testing::FakeSource;
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    #[tokio::test]
    async fn test_repeated_query_is_served_from_cache() {
        let source = Arc::new(FakeSource::new(vec![vec![1, 2], vec![3]]));
        let cached = CachedSource::new(source.clone(), DEFAULT_CACHE_TTL);

        let first = fetch_all(&cached, &Some("B1")).await.unwrap();
        let second = fetch_all(&cached, &Some("B1")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.requested_pages(), vec![1, 2]);
        assert_eq!(cached.len(), 2);
    }

    #[tokio::test]
    async fn test_different_filters_are_distinct_entries() {
        let source = Arc::new(FakeSource::new(vec![vec![1]]));
        let cached = CachedSource::new(source.clone(), DEFAULT_CACHE_TTL);

        fetch_all(&cached, &Some("B1")).await.unwrap();
        fetch_all(&cached, &Some("B2")).await.unwrap();

        assert_eq!(
            source.requests(),
            vec![(Some("B1"), 1), (Some("B2"), 1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let source = Arc::new(FakeSource::new(vec![vec![1]]));
        let cached = CachedSource::new(source.clone(), Duration::from_secs(60));

        fetch_all(&cached, &Some("B1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        fetch_all(&cached, &Some("B1")).await.unwrap();
        assert_eq!(source.requested_pages().len(), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        cached.purge_expired();
        assert!(cached.is_empty());
        fetch_all(&cached, &Some("B1")).await.unwrap();
        assert_eq!(source.requested_pages().len(), 2);
    }

    #[tokio::test]
    async fn test_invalidation_forces_refetch() {
        let source = Arc::new(FakeSource::new(vec![vec![1]]));
        let cached = CachedSource::new(source.clone(), DEFAULT_CACHE_TTL);

        fetch_all(&cached, &Some("B1")).await.unwrap();
        fetch_all(&cached, &Some("B2")).await.unwrap();

        cached.invalidate(&Some("B1"));
        fetch_all(&cached, &Some("B1")).await.unwrap();
        fetch_all(&cached, &Some("B2")).await.unwrap();
        assert_eq!(source.requested_pages().len(), 3);

        cached.invalidate_all();
        fetch_all(&cached, &Some("B2")).await.unwrap();
        assert_eq!(source.requested_pages().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_do_not_accumulate() {
        const KEYWORDS: [&str; 5] = ["cat", "dog", "fish", "bird", "hamster"];
        let source = Arc::new(FakeSource::new(vec![vec![1]]));
        let cached = CachedSource::new(source.clone(), Duration::from_secs(1));

        for keyword in KEYWORDS {
            fetch_all(&cached, &Some(keyword)).await.unwrap();
            tokio::time::advance(Duration::from_secs(5)).await;
        }
        assert_eq!(cached.len(), 1);

        // An expired entry is dropped as soon as it is looked up.
        fetch_all(&cached, &Some("hamster")).await.unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(source.requests().len(), 6);
    }

    #[tokio::test]
    async fn test_page_in_flight_during_invalidation_is_not_stored() {
        let gate = Arc::new(Semaphore::new(0));
        let source = Arc::new(FakeSource::new(vec![vec![1]]).gated(gate.clone()));
        let cached = Arc::new(CachedSource::new(source.clone(), DEFAULT_CACHE_TTL));

        let pending = tokio::spawn({
            let cached = cached.clone();
            async move { fetch_all(cached.as_ref(), &Some("B1")).await }
        });
        while source.requests().is_empty() {
            tokio::task::yield_now().await;
        }

        cached.invalidate_all();
        gate.add_permits(1);
        assert_eq!(pending.await.unwrap().unwrap(), vec![1]);
        assert!(cached.is_empty());

        gate.add_permits(1);
        fetch_all(cached.as_ref(), &Some("B1")).await.unwrap();
        assert_eq!(source.requests(), vec![(Some("B1"), 1), (Some("B1"), 1)]);
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let source = Arc::new(FakeSource::new(vec![vec![1], vec![2]]).failing_at(2));
        let cached = CachedSource::new(source.clone(), DEFAULT_CACHE_TTL);

        assert!(fetch_all(&cached, &Some("B1")).await.is_err());
        assert!(fetch_all(&cached, &Some("B1")).await.is_err());
        assert_eq!(source.requested_pages(), vec![1, 2, 2]);
    }
}
