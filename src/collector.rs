use tracing::{debug, info, warn};

use crate::error::RequestError;
use crate::executor::RequestExecutor;
use crate::model::{ResultItem, ResultSet, SearchPage};

enum CollectState {
    FetchingPage(u32),
    Accumulating { page: u32, fetched: SearchPage },
    Exhausted,
    AbortedOnFailure { page: u32, error: RequestError },
}

/// Drives one query across successive result pages.
pub struct PageCollector<'a> {
    executor: &'a RequestExecutor,
    search_url: String,
    page_size: u32,
}

impl<'a> PageCollector<'a> {
    pub fn new(
        executor: &'a RequestExecutor,
        search_url: impl Into<String>,
        page_size: u32,
    ) -> Self {
        PageCollector {
            executor,
            search_url: search_url.into(),
            page_size,
        }
    }

    pub fn executor(&self) -> &RequestExecutor {
        self.executor
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Collect every reachable page of `query` and merge it onto `acc`.
    ///
    /// Never fails: if a page request fails, whatever was gathered before it is
    /// returned. The query's reported total is added once.
    pub async fn collect(&self, query: &str, acc: Option<ResultSet>) -> ResultSet {
        let mut results = ResultSet::new();
        let mut total_recorded = false;
        let mut state = CollectState::FetchingPage(1);

        loop {
            state = match state {
                CollectState::FetchingPage(page) => {
                    self.executor
                        .progress()
                        .set_message(format!("Searching {} - page {}", query, page));
                    match self.fetch_page(query, page).await {
                        Ok(fetched) => CollectState::Accumulating { page, fetched },
                        Err(error) => CollectState::AbortedOnFailure { page, error },
                    }
                }
                CollectState::Accumulating { page, fetched } => {
                    // Later pages may report a shifted total; count the first one only
                    if !total_recorded {
                        info!("Total results for '{}': {}", query, fetched.total_count);
                        results.total_count = fetched.total_count;
                        total_recorded = true;
                    }
                    if fetched.incomplete_results {
                        warn!("Incomplete results for '{}' page {}", query, page);
                    }

                    let page_len = fetched.items.len();
                    results
                        .items
                        .extend(fetched.items.into_iter().map(ResultItem::from_raw));
                    debug!(
                        "'{}' page {}: {} items, {} collected",
                        query,
                        page,
                        page_len,
                        results.len()
                    );

                    // A short (or empty) page is the last one
                    if page_len < self.page_size as usize {
                        CollectState::Exhausted
                    } else {
                        CollectState::FetchingPage(page + 1)
                    }
                }
                CollectState::Exhausted => {
                    info!("'{}' results done: {} items", query, results.len());
                    break;
                }
                CollectState::AbortedOnFailure { page, error } => {
                    // Keep what we have; the next query still runs
                    warn!(
                        "Stopping '{}' at page {} with {} items collected (status {:?}): {}",
                        query,
                        page,
                        results.len(),
                        error.status(),
                        error
                    );
                    break;
                }
            };
        }

        acc.unwrap_or_default().merge(results)
    }

    async fn fetch_page(&self, query: &str, page: u32) -> Result<SearchPage, RequestError> {
        let params = vec![
            ("q".to_string(), query.to_string()),
            ("per_page".to_string(), self.page_size.to_string()),
            ("page".to_string(), page.to_string()),
            ("sort".to_string(), "indexed".to_string()),
            ("order".to_string(), "desc".to_string()),
        ];
        let response = self.executor.get(&self.search_url, params).await?;
        Ok(serde_json::from_value(response.body)?)
    }
}
