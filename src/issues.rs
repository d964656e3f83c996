use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::config::{IssueRepo, SearchConfig};
use crate::error::RequestError;
use crate::executor::RequestExecutor;
use crate::model::AggregateReport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilingSummary {
    pub created: usize,
    pub failed: usize,
}

/// Opens one tracking issue per matched repository.
pub struct IssueFiler<'a> {
    executor: &'a RequestExecutor,
    issues_url: String,
}

impl<'a> IssueFiler<'a> {
    pub fn new(executor: &'a RequestExecutor, config: &SearchConfig, target: &IssueRepo) -> Self {
        IssueFiler {
            executor,
            issues_url: config.issues_url(target),
        }
    }

    /// Create a single issue, returning its `html_url`.
    pub async fn file_issue(&self, issue: &NewIssue) -> Result<String, RequestError> {
        let response = self
            .executor
            .post_json(&self.issues_url, serde_json::to_value(issue)?)
            .await?;
        let html_url = response
            .body
            .get("html_url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(html_url)
    }

    /// File an issue for each distinct repository under each term, labelled with the term.
    /// Failures are logged and counted; the sweep always runs to the end.
    pub async fn file_report(&self, report: &AggregateReport) -> FilingSummary {
        let mut summary = FilingSummary::default();
        let body = format!("Issue created on: {}", Local::now().format("%Y-%m-%d"));

        for (term_id, results) in report.iter() {
            for repository in results.repositories() {
                let issue = NewIssue {
                    title: repository.to_string(),
                    body: body.clone(),
                    labels: vec![term_id.clone()],
                };
                match self.file_issue(&issue).await {
                    Ok(url) => {
                        info!("Issue created successfully: {}", url);
                        summary.created += 1;
                    }
                    Err(e) => {
                        error!("Failed to create issue for '{}': {}", repository, e);
                        summary.failed += 1;
                    }
                }
            }
        }

        summary
    }
}
