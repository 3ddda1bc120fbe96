//! Typed list endpoints
//!
//! Each filter struct names its endpoint, its page numbering and its required
//! fields. [`ApiSource`] turns any of them into a [`PageSource`].

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use super::client::ApiClient;
use super::error::ApiError;
use super::models::{Branch, Doctor, PageBase, Pet, Product};
use crate::pagination::{PageResult, PageSource};

/// Default page size requested from list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub trait ListEndpoint: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    type Item: DeserializeOwned + Clone + Send + Sync + 'static;

    const PATH: &'static str;
    const PAGE_BASE: PageBase;
    const PAGE_SIZE: u32 = DEFAULT_PAGE_SIZE;

    /// `false` when a required filter field is missing.
    fn is_ready(&self) -> bool {
        true
    }

    /// Filter query-string parameters (paging is added by the client).
    fn params(&self) -> Vec<(&'static str, String)>;
}

/// [`PageSource`] over a remote list endpoint.
pub struct ApiSource<Q> {
    client: ApiClient,
    _query: PhantomData<fn() -> Q>,
}

impl<Q> ApiSource<Q> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _query: PhantomData,
        }
    }
}

#[async_trait]
impl<Q: ListEndpoint> PageSource for ApiSource<Q> {
    type Query = Q;
    type Item = Q::Item;

    fn is_ready(&self, query: &Q) -> bool {
        query.is_ready()
    }

    async fn fetch_page(&self, query: &Q, page: u32) -> Result<PageResult<Q::Item>, ApiError> {
        self.client
            .get_page(Q::PATH, &query.params(), Q::PAGE_BASE, page, Q::PAGE_SIZE)
            .await
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Branch directory, optionally narrowed by keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchQuery {
    #[serde(default)]
    pub keyword: Option<String>,
}

impl ListEndpoint for BranchQuery {
    type Item = Branch;
    const PATH: &'static str = "branches";
    const PAGE_BASE: PageBase = PageBase::OneBased;

    fn params(&self) -> Vec<(&'static str, String)> {
        self.keyword
            .iter()
            .map(|k| ("keyword", k.clone()))
            .collect()
    }
}

/// Doctors free at a branch for a given slot. All three fields are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDoctorQuery {
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
}

impl ListEndpoint for AvailableDoctorQuery {
    type Item = Doctor;
    const PATH: &'static str = "doctors/available";
    const PAGE_BASE: PageBase = PageBase::ZeroBased;

    fn is_ready(&self) -> bool {
        self.branch_id.as_deref().is_some_and(|id| !id.is_empty())
            && self.date.is_some()
            && self.time.is_some()
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(branch_id) = &self.branch_id {
            params.push(("branchId", branch_id.clone()));
        }
        if let Some(date) = self.date {
            params.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(time) = self.time {
            params.push(("time", time.format("%H:%M").to_string()));
        }
        params
    }
}

/// Pets of one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetQuery {
    #[serde(default)]
    pub owner_id: Option<String>,
}

impl ListEndpoint for PetQuery {
    type Item = Pet;
    const PATH: &'static str = "pets";
    const PAGE_BASE: PageBase = PageBase::OneBased;

    fn is_ready(&self) -> bool {
        self.owner_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        self.owner_id
            .iter()
            .map(|id| ("ownerId", id.clone()))
            .collect()
    }
}

/// Product catalog, optionally scoped to a branch and keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
}

impl ListEndpoint for ProductQuery {
    type Item = Product;
    const PATH: &'static str = "products";
    const PAGE_BASE: PageBase = PageBase::OneBased;

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(branch_id) = &self.branch_id {
            params.push(("branchId", branch_id.clone()));
        }
        if let Some(keyword) = &self.keyword {
            params.push(("keyword", keyword.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_doctor_query_requires_every_field() {
        let full = AvailableDoctorQuery {
            branch_id: Some("B1".into()),
            date: NaiveDate::from_ymd_opt(2026, 10, 20),
            time: NaiveTime::from_hms_opt(9, 30, 0),
        };
        assert!(full.is_ready());
        assert_eq!(
            full.params(),
            vec![
                ("branchId", "B1".to_string()),
                ("date", "2026-10-20".to_string()),
                ("time", "09:30".to_string()),
            ]
        );

        let no_branch = AvailableDoctorQuery {
            branch_id: None,
            ..full.clone()
        };
        assert!(!no_branch.is_ready());

        let blank_branch = AvailableDoctorQuery {
            branch_id: Some(String::new()),
            ..full.clone()
        };
        assert!(!blank_branch.is_ready());

        let no_time = AvailableDoctorQuery { time: None, ..full };
        assert!(!no_time.is_ready());
    }

    #[test]
    fn test_optional_filters_are_omitted() {
        assert!(BranchQuery::default().params().is_empty());
        assert!(BranchQuery::default().is_ready());
        assert!(!PetQuery::default().is_ready());
        assert_eq!(
            ProductQuery {
                branch_id: None,
                keyword: Some("flea".into()),
            }
            .params(),
            vec![("keyword", "flea".to_string())]
        );
    }
}
