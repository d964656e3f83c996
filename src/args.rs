use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    default_terms, load_terms_file, IssueRepo, RetryPolicy, SearchConfig, SearchTerm,
    DEFAULT_API_URL, DEFAULT_EXTENSIONS, DEFAULT_MAX_ATTEMPTS, DEFAULT_WAIT_SECONDS,
    MAX_PAGE_SIZE, RESULT_CEILING,
};
use crate::error::ConfigError;

/// Find where UI component markup is used across GitHub and optionally file
/// a tracking issue for every repository that uses it.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Sweeps GitHub code search for component class names and template imports, \
                  splitting over-broad queries by file extension to get past the 1000 result \
                  ceiling, and writes the matches to a JSON report."
)]
pub struct Args {
    /// Output file for the JSON report (".json" is appended if missing).
    #[clap(short, long, default_value = "results.json")]
    pub output: String,

    /// GitHub API token. Falls back to GH_TOKEN, then GITHUB_TOKEN.
    #[clap(short, long)]
    pub token: Option<String>,

    /// Literal search strings, each reported under its own key.
    #[clap(short, long = "keyword", value_name = "QUERY")]
    pub keywords: Vec<String>,

    /// JSON file of components and keywords to search for.
    #[clap(long, value_name = "FILE")]
    pub terms_file: Option<PathBuf>,

    /// File extensions used to split queries that exceed the result ceiling.
    #[clap(
        short,
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_EXTENSIONS.map(String::from)
    )]
    pub extensions: Vec<String>,

    /// Attempts per request while the API keeps answering 403.
    #[clap(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_retries: u32,

    /// Seconds to wait after a 403 before retrying.
    #[clap(long, default_value_t = DEFAULT_WAIT_SECONDS)]
    pub wait_seconds: u64,

    /// Results per page (at most 100).
    #[clap(short = 'p', long, default_value_t = MAX_PAGE_SIZE)]
    pub page_size: u32,

    /// Base URL of the GitHub REST API.
    #[clap(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Open a tracking issue for every matched repository.
    #[clap(long)]
    pub file_issues: bool,

    /// Repository the tracking issues are opened in.
    #[clap(
        long,
        value_name = "OWNER/REPO",
        default_value = "ministryofjustice/moj-frontend-analytics"
    )]
    pub issue_repo: String,

    /// Hide the progress spinner.
    #[clap(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Build the validated run configuration around an already resolved token.
    pub fn search_config(&self, token: String) -> Result<SearchConfig, ConfigError> {
        let config = SearchConfig {
            api_url: self.api_url.clone(),
            token,
            extensions: self
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect(),
            retry: RetryPolicy::new(self.max_retries, self.wait_seconds),
            page_size: self.page_size,
            result_ceiling: RESULT_CEILING,
        };
        config.validate()?;
        Ok(config)
    }

    /// Terms from the terms file and `--keyword`, or the built-in components when neither is given.
    pub fn search_terms(&self) -> Result<Vec<SearchTerm>, ConfigError> {
        let mut terms = match &self.terms_file {
            Some(path) => load_terms_file(path)?,
            None => Vec::new(),
        };
        terms.extend(self.keywords.iter().cloned().map(SearchTerm::Literal));

        if terms.is_empty() {
            if self.terms_file.is_some() {
                return Err(ConfigError::NoTerms);
            }
            terms = default_terms();
        }
        Ok(terms)
    }

    pub fn issue_target(&self) -> Result<IssueRepo, ConfigError> {
        IssueRepo::parse(&self.issue_repo)
    }
}
