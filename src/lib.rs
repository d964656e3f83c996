//! # Component Usage Search
//!
//! Finds where UI component markup (CSS class names, template imports) is used
//! across GitHub code search, collects the matches into a JSON report, and can
//! open a tracking issue for every repository found.
//!
//! ## Main Components
//!
//! - [`RequestExecutor`]: single requests with retry-after-wait on HTTP 403
//! - [`PageCollector`]: walks the result pages of one query
//! - [`QueryPlanner`]: probes each query and splits it by file extension when it
//!   would run into the 1000 result ceiling
//! - [`GitHubSearcher`]: sweeps every configured term into an [`AggregateReport`]
//! - [`IssueFiler`] and [`save_report`]: the outputs
//!
//! ## Example
//!
//! ```no_run
//! use component_usage_search_lib::{default_terms, save_report, GitHubSearcher, SearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = SearchConfig::new(std::env::var("GH_TOKEN")?);
//!     config.validate()?;
//!
//!     let searcher = GitHubSearcher::new(config, true)?;
//!     let report = searcher.run(&default_terms()).await;
//!
//!     save_report(&report, "results.json").await?;
//!     Ok(())
//! }
//! ```

mod args;
mod collector;
mod config;
mod error;
mod executor;
mod github_searcher;
mod issues;
mod model;
mod planner;
mod sink;

pub use crate::args::Args;
pub use crate::collector::PageCollector;
pub use crate::config::{
    default_terms, load_terms_file, IssueRepo, QueryFlavor, RetryPolicy, SearchConfig, SearchTerm,
    DEFAULT_EXTENSIONS, MAX_PAGE_SIZE, RESULT_CEILING,
};
pub use crate::error::{ConfigError, RequestError, SinkError};
pub use crate::executor::{ApiResponse, Payload, RequestExecutor};
pub use crate::github_searcher::GitHubSearcher;
pub use crate::issues::{FilingSummary, IssueFiler, NewIssue};
pub use crate::model::{file_extension, AggregateReport, ResultItem, ResultSet, SearchPage};
pub use crate::planner::{fan_out, QueryPlan, QueryPlanner};
pub use crate::sink::{json_path, load_report, save_report};
