use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::Duration;
use tracing::info;

use crate::collector::PageCollector;
use crate::config::{IssueRepo, SearchConfig, SearchTerm};
use crate::error::{RequestError, SinkError};
use crate::executor::RequestExecutor;
use crate::issues::{FilingSummary, IssueFiler};
use crate::model::AggregateReport;
use crate::planner::QueryPlanner;
use crate::sink::save_report;

pub struct GitHubSearcher {
    config: SearchConfig,
    executor: RequestExecutor,
}

impl GitHubSearcher {
    /// Create a new GitHubSearcher. With `show_progress` a spinner tracks the
    /// current query and any rate-limit wait on stderr.
    pub fn new(config: SearchConfig, show_progress: bool) -> Result<Self, RequestError> {
        let progress = if show_progress {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
            {
                pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
            }
            pb.enable_steady_tick(Duration::from_millis(80));
            pb
        } else {
            ProgressBar::hidden()
        };

        let executor = RequestExecutor::new(&config, progress)?;
        Ok(GitHubSearcher { config, executor })
    }

    /// Sweep every term, one after another, into a single report.
    pub async fn run(&self, terms: &[SearchTerm]) -> AggregateReport {
        let collector = PageCollector::new(
            &self.executor,
            self.config.search_url(),
            self.config.page_size,
        );
        let planner = QueryPlanner::new(
            collector,
            &self.config.extensions,
            self.config.result_ceiling,
        );

        let mut report = AggregateReport::new();
        for term in terms {
            self.executor
                .progress()
                .set_message(format!("Starting search for '{}'", term.id()));
            let results = planner.plan_and_collect(term).await;
            if results.is_empty() {
                info!("No results found for '{}'", term.id());
            }
            report.insert(term.id(), results);
        }

        self.executor.progress().finish_and_clear();
        info!(
            "All searches completed: {} items across {} terms",
            report.total_items(),
            report.len()
        );
        report
    }

    /// Save the report, then file issues for it when a target is given.
    ///
    /// Issue filing can take a long time, so the report is on disk before it
    /// starts. The returned result is that of the save alone.
    pub async fn publish(
        &self,
        report: &AggregateReport,
        output: &str,
        target: Option<&IssueRepo>,
    ) -> Result<PathBuf, SinkError> {
        let saved = save_report(report, output).await;

        if let Some(target) = target {
            self.file_issues(report, target).await;
        }

        saved
    }

    /// Open a tracking issue in `target` for every matched repository.
    pub async fn file_issues(&self, report: &AggregateReport, target: &IssueRepo) -> FilingSummary {
        let filer = IssueFiler::new(&self.executor, &self.config, target);
        let summary = filer.file_report(report).await;
        info!(
            "Issue filing finished: {} created, {} failed",
            summary.created, summary.failed
        );
        summary
    }
}
