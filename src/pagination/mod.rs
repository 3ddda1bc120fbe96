//! Paginated Fetch Accumulator
//!
//! Bridges page-based list endpoints to two consumption modes:
//! - eager ([`fetch_all`]): every page fetched up front, flattened;
//! - infinite ([`InfiniteList`]): one page per trigger, for scroll-driven UI.
//!
//! Both work over any [`PageSource`]; [`CachedSource`] adds a short-lived
//! cache keyed by the full filter tuple.

pub mod cache;
pub mod eager;
pub mod infinite;
pub mod models;
pub mod source;

// Re-export commonly used types for convenience
pub use cache::{CachedSource, Invalidate};
pub use eager::{fetch_all, fetch_all_map};
pub use infinite::{FetchOutcome, InfiniteList, InfiniteSnapshot};
pub use models::{PageResult, FIRST_PAGE};
pub use source::PageSource;
