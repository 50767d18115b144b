//! Incremental listing pagination
//!
//! [`PostsPagination`] accumulates listing pages by following the CMS
//! `next_page` cursor. It is owned by a single session (a build, a CLI run,
//! a browsing session) and is only changed through its methods:
//!
//! - the accumulated post count never decreases;
//! - once the last page has been reached, `has_more` stays `false`;
//! - a failed `load_next` leaves the walker exactly as it was, so the call
//!   can simply be retried.

use std::future::Future;

use crate::client::ContentSource;
use crate::content::{normalize_page, Post, PostPage, RawPage};
use crate::error::{Error, FetchError, Result};

/// Accumulated listing state for one session
#[derive(Debug, Clone)]
pub struct PostsPagination {
    posts: Vec<Post>,
    next_page: Option<String>,
}

impl PostsPagination {
    /// Start a session from the first listing page
    pub fn initialize(page: PostPage) -> Self {
        Self {
            posts: page.posts,
            next_page: page.next_page.filter(|t| !t.is_empty()),
        }
    }

    /// Posts accumulated so far, in CMS order
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Token of the page `load_next` would fetch
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }

    /// Fetch the next page with `fetch_page` and append its posts.
    ///
    /// Returns the number of appended posts.
    pub async fn load_next<F, Fut>(&mut self, fetch_page: F) -> Result<usize>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<RawPage, FetchError>>,
    {
        let token = self.next_page.clone().ok_or(Error::NoMorePages)?;

        let raw = fetch_page(token).await.map_err(|e| {
            tracing::warn!("Failed to fetch next listing page: {}", e);
            Error::PageFetchFailed(e)
        })?;
        let page = normalize_page(raw)?;

        let appended = page.posts.len();
        self.posts.extend(page.posts);
        self.next_page = page.next_page;

        tracing::debug!(
            "Loaded {} more posts ({} total, has_more={})",
            appended,
            self.posts.len(),
            self.has_more()
        );
        Ok(appended)
    }

    /// `load_next` against a content source
    pub async fn load_next_from(&mut self, source: &dyn ContentSource) -> Result<usize> {
        self.load_next(|token| async move { source.fetch_page(&token).await })
            .await
    }

    /// Follow the cursor until the last page. Returns the total post count.
    pub async fn load_all(&mut self, source: &dyn ContentSource) -> Result<usize> {
        while self.has_more() {
            self.load_next_from(source).await?;
        }
        Ok(self.posts.len())
    }
}
