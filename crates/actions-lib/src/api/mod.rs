//! Access to the Turbonomic REST API
//!
//! The [`MonitoringApi`] trait is the seam between the pipeline and the
//! network: [`TurboClient`] implements it over HTTP, tests implement it in
//! memory.

mod client;


pub use client::{ClientConfig, Credentials, Session, TurboClient};

use crate::models::{Action, Group, SearchQuery, SupplyChain};
use crate::paginate::PageInfo;
use anyhow::Result;
use serde_json::Value;

pub use async_trait::async_trait;

/// One page of a paginated collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    /// A page with no further pages after it
    pub fn complete(records: Vec<T>) -> Self {
        Self {
            records,
            info: PageInfo::Complete,
        }
    }
}

/// Operations the pipeline needs from the monitoring system
#[async_trait]
pub trait MonitoringApi: Send + Sync {
    /// Fetch one page of `Market` actions matching `filter`.
    /// `None` requests the first page.
    async fn actions_page(&self, filter: &Value, cursor: Option<u64>) -> Result<Page<Action>>;

    /// Fetch one page of search results
    async fn search_page(&self, query: &SearchQuery, cursor: Option<u64>) -> Result<Page<Group>>;

    /// Fetch the supply chain of `entity_type` entities for the given UUIDs
    async fn supply_chain(&self, entity_type: &str, uuids: &[String]) -> Result<SupplyChain>;
}
