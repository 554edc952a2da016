//! Sequential retrieval of every issue matching a JQL query.
//!
//! JIRA's enhanced search hands out an opaque `nextPageToken` with each page.
//! Each request needs the token from the previous response, so pages are
//! fetched strictly one after another.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::api::error::Result;
use crate::api::{Issue, SearchPage};

/// Page size requested from the search endpoint.
pub const PAGE_SIZE: u32 = 250;

/// A remote service that can count and page through issues.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fast, approximate number of issues matching `jql`.
    async fn approximate_count(&self, jql: &str) -> Result<u64>;

    /// Fetch one page of results, resuming from `next_page_token`.
    async fn search_page(
        &self,
        jql: &str,
        max_results: u32,
        next_page_token: Option<&str>,
    ) -> Result<SearchPage>;
}

/// Receives progress updates while issues are fetched.
pub trait ProgressSink {
    /// Set the expected number of issues.
    fn set_total(&self, total: u64);

    /// Record that `count` more issues have been fetched.
    fn advance(&self, count: u64);

    /// Fetching is over; clear any transient display.
    fn finish(&self) {}
}

/// A sink that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set_total(&self, _total: u64) {}

    fn advance(&self, _count: u64) {}
}

/// Drives page requests against an [`IssueSource`].
pub struct Paginator<'a, S: ?Sized> {
    source: &'a S,
    progress: &'a dyn ProgressSink,
}

impl<'a, S: IssueSource + ?Sized> Paginator<'a, S> {
    /// Create a paginator reporting to `progress`.
    pub fn new(source: &'a S, progress: &'a dyn ProgressSink) -> Self {
        Self { source, progress }
    }

    /// Ask the source for an approximate total and hand it to the progress sink.
    ///
    /// The value is for display only. A failure here still fails the export.
    #[instrument(skip(self))]
    pub async fn estimate_total(&self, jql: &str) -> Result<u64> {
        let total = self.source.approximate_count(jql).await?;
        self.progress.set_total(total);
        Ok(total)
    }

    /// Fetch every page for `jql` and return the issues in fetch order.
    ///
    /// Stops after the first page that is empty or that carries no
    /// continuation token.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, jql: &str, page_size: u32) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            debug!(next_page_token = ?next_page_token, "Fetching issues");
            let page = self
                .source
                .search_page(jql, page_size, next_page_token.as_deref())
                .await?;

            let fetched = page.issues.len();
            issues.extend(page.issues);
            self.progress.advance(fetched as u64);

            next_page_token = page.next_page_token.filter(|token| !token.is_empty());
            if fetched == 0 || next_page_token.is_none() {
                break;
            }
        }

        debug!("Fetched {} issues in total", issues.len());
        Ok(issues)
    }
}
