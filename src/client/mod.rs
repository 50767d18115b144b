//! Content sources - where raw CMS documents come from
//!
//! [`PrismicClient`] talks to a Prismic-style REST API, [`MemorySource`]
//! serves documents loaded from a local JSON dump.

mod memory;
mod prismic;

use async_trait::async_trait;

use crate::config::CmsConfig;
use crate::content::{RawDocument, RawPage};
use crate::error::FetchError;

pub use memory::MemorySource;
pub use prismic::PrismicClient;

/// Query options for listing documents of a type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Results per page; the source default when `None`
    pub page_size: Option<usize>,
    /// Ordering expression, forwarded verbatim
    pub orderings: Option<String>,
    /// Restrict returned fields, e.g. `posts.title`
    pub fetch: Vec<String>,
}

impl QueryOptions {
    /// Options for listing pages, as set in the `cms` config section
    pub fn listing(cms: &CmsConfig) -> Self {
        Self::default()
            .with_page_size(cms.page_size)
            .with_orderings(cms.orderings.clone())
            .with_fetch(cms.fetch.clone())
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_orderings(mut self, orderings: Option<String>) -> Self {
        self.orderings = orderings;
        self
    }

    pub fn with_fetch(mut self, fetch: Vec<String>) -> Self {
        self.fetch = fetch;
        self
    }
}

/// The headless CMS as seen by the rest of the crate
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of documents of `document_type`
    async fn get_by_type(
        &self,
        document_type: &str,
        options: &QueryOptions,
    ) -> Result<RawPage, FetchError>;

    /// A single document by its uid
    async fn get_by_uid(&self, document_type: &str, uid: &str) -> Result<RawDocument, FetchError>;

    /// The page behind an opaque `next_page` token
    async fn fetch_page(&self, token: &str) -> Result<RawPage, FetchError>;
}
