use tracing::{error, info, warn};

use crate::collector::PageCollector;
use crate::config::SearchTerm;
use crate::error::RequestError;
use crate::model::{ResultSet, SearchPage};

/// How a single query string is going to be collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// Below the ceiling: collect the query as-is.
    Direct(String),
    /// At or above the ceiling: one derived query per configured extension.
    FanOut(Vec<String>),
}

/// Decides per query whether to search it directly or split it by file extension.
pub struct QueryPlanner<'a> {
    collector: PageCollector<'a>,
    extensions: &'a [String],
    ceiling: u64,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(collector: PageCollector<'a>, extensions: &'a [String], ceiling: u64) -> Self {
        QueryPlanner {
            collector,
            extensions,
            ceiling,
        }
    }

    /// Collect every query of `term` into one result set, in flavor order.
    pub async fn plan_and_collect(&self, term: &SearchTerm) -> ResultSet {
        let mut results = ResultSet::new();

        for query in term.queries() {
            info!("Processing '{}': {}", term.id(), query);
            match self.plan(query).await {
                Ok(plan) => results = self.run_plan(plan, results).await,
                Err(e) => error!(
                    "Probe failed for '{}' (status {:?}), skipping query: {}",
                    query,
                    e.status(),
                    e
                ),
            }
        }

        info!(
            "Found {} results (reported {}) for '{}'",
            results.len(),
            results.total_count,
            term.id()
        );
        results
    }

    /// Probe `query` and choose between a direct search and an extension fan-out.
    ///
    /// A query that already carries an `extension:` qualifier is never fanned
    /// out, even at or above the ceiling: adding a second qualifier would match
    /// nothing, so it is collected directly and may come back truncated.
    pub async fn plan(&self, query: &str) -> Result<QueryPlan, RequestError> {
        // Only the reported total matters here, not the item
        let total = self.probe(query).await?;
        info!("Probe for '{}' reports {} results", query, total);

        if total < self.ceiling {
            return Ok(QueryPlan::Direct(query.to_string()));
        }

        if has_extension_qualifier(query) {
            warn!(
                "'{}' exceeds the {} result ceiling but is already limited to one extension",
                query, self.ceiling
            );
            return Ok(QueryPlan::Direct(query.to_string()));
        }

        info!("Too many results for '{}', filtering by extension", query);
        Ok(QueryPlan::FanOut(fan_out(query, self.extensions)))
    }

    async fn run_plan(&self, plan: QueryPlan, acc: ResultSet) -> ResultSet {
        match plan {
            QueryPlan::Direct(query) => self.collector.collect(&query, Some(acc)).await,
            QueryPlan::FanOut(queries) => {
                // Every extension runs, whatever the earlier ones returned
                let mut acc = acc;
                for query in queries {
                    info!("Processing fan-out query: {}", query);
                    acc = self.collector.collect(&query, Some(acc)).await;
                }
                acc
            }
        }
    }

    /// Single one-item request to read the reported total.
    async fn probe(&self, query: &str) -> Result<u64, RequestError> {
        let params = vec![
            ("q".to_string(), query.to_string()),
            ("per_page".to_string(), "1".to_string()),
            ("page".to_string(), "1".to_string()),
        ];
        let response = self
            .collector
            .executor()
            .get(self.collector.search_url(), params)
            .await?;
        let page: SearchPage = serde_json::from_value(response.body)?;
        Ok(page.total_count)
    }
}

/// `"<query> extension:<ext>"` for every extension, in order.
pub fn fan_out(query: &str, extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| format!("{} extension:{}", query, ext))
        .collect()
}

fn has_extension_qualifier(query: &str) -> bool {
    query
        .split_whitespace()
        .any(|token| token.starts_with("extension:"))
}
