use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tokio::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// The code search endpoint never serves more than this many items for one query.
pub const RESULT_CEILING: u64 = 1000;

pub const MAX_PAGE_SIZE: u32 = 100;

pub const DEFAULT_EXTENSIONS: [&str; 8] =
    ["njk", "js", "html", "erb", "php", "vue", "gotmpl", "cshtml"];

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

// Code search allows roughly 10 requests a minute.
pub const DEFAULT_WAIT_SECONDS: u64 = 60;

/// Longest accepted throttle wait (one day).
pub const MAX_WAIT_SECONDS: u64 = 24 * 60 * 60;

/// How many times a throttled request is attempted and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub wait: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, wait_seconds: u64) -> Self {
        RetryPolicy {
            max_attempts,
            wait: Duration::from_secs(wait_seconds),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WAIT_SECONDS)
    }
}

/// A named query for a component, e.g. the `class="..."` search or the template import search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFlavor {
    pub name: String,
    pub query: String,
}

impl QueryFlavor {
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        QueryFlavor {
            name: name.into(),
            query: query.into(),
        }
    }
}

/// A logical unit of interest swept by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// A raw query string, used both as the query and as the term identifier.
    Literal(String),
    /// A named component searched through one or more query flavors.
    Component {
        name: String,
        flavors: Vec<QueryFlavor>,
    },
}

impl SearchTerm {
    pub fn literal(query: impl Into<String>) -> Self {
        SearchTerm::Literal(query.into())
    }

    pub fn component(name: impl Into<String>, flavors: Vec<QueryFlavor>) -> Self {
        SearchTerm::Component {
            name: name.into(),
            flavors,
        }
    }

    /// Key under which the term's results are reported.
    pub fn id(&self) -> &str {
        match self {
            SearchTerm::Literal(query) => query,
            SearchTerm::Component { name, .. } => name,
        }
    }

    /// Every concrete query string this term is searched with, in order.
    pub fn queries(&self) -> Vec<&str> {
        match self {
            SearchTerm::Literal(query) => vec![query.as_str()],
            SearchTerm::Component { flavors, .. } => {
                flavors.iter().map(|f| f.query.as_str()).collect()
            }
        }
    }
}

/// The MoJ Frontend components tracked when no terms are given.
pub fn default_terms() -> Vec<SearchTerm> {
    vec![
        SearchTerm::component(
            "moj-datepicker",
            vec![
                QueryFlavor::new("class_query", "class=\"moj-datepicker"),
                QueryFlavor::new("nunjucks_query", "import mojDatePicker extension:njk"),
            ],
        ),
        SearchTerm::component(
            "moj-pagination",
            vec![
                QueryFlavor::new("class_query", "class=\"moj-pagination"),
                QueryFlavor::new("nunjucks_query", "import mojPagination extension:njk"),
            ],
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct TermsFile {
    #[serde(default)]
    components: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Load search terms from a JSON document of the form
/// `{ "components": { "<id>": { "<flavor>": "<query>" } }, "keywords": ["<query>"] }`.
pub fn load_terms_file(path: &Path) -> Result<Vec<SearchTerm>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::TermsFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_terms(&raw).map_err(|source| ConfigError::TermsFileParse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_terms(raw: &str) -> Result<Vec<SearchTerm>, serde_json::Error> {
    let file: TermsFile = serde_json::from_str(raw)?;

    let mut terms: Vec<SearchTerm> = file
        .components
        .into_iter()
        .map(|(name, flavors)| {
            let flavors = flavors
                .into_iter()
                .map(|(flavor, query)| QueryFlavor::new(flavor, query))
                .collect();
            SearchTerm::component(name, flavors)
        })
        .collect();
    terms.extend(file.keywords.into_iter().map(SearchTerm::Literal));

    Ok(terms)
}

/// Target repository for tracking issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRepo {
    pub owner: String,
    pub repo: String,
}

impl IssueRepo {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.split_once('/') {
            Some((owner, repo))
                if !owner.trim().is_empty() && !repo.trim().is_empty() && !repo.contains('/') =>
            {
                Ok(IssueRepo {
                    owner: owner.trim().to_string(),
                    repo: repo.trim().to_string(),
                })
            }
            _ => Err(ConfigError::IssueRepo(value.to_string())),
        }
    }
}

/// Immutable settings shared by the executor, collector and planner for one run.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_url: String,
    pub token: String,
    pub extensions: Vec<String>,
    pub retry: RetryPolicy,
    pub page_size: u32,
    pub result_ceiling: u64,
}

impl SearchConfig {
    /// Configuration with the default endpoint, extensions and retry tuning.
    pub fn new(token: impl Into<String>) -> Self {
        SearchConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            retry: RetryPolicy::default(),
            page_size: MAX_PAGE_SIZE,
            result_ceiling: RESULT_CEILING,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.retry.wait > Duration::from_secs(MAX_WAIT_SECONDS) {
            return Err(ConfigError::WaitTooLong {
                got: self.retry.wait.as_secs(),
                max: MAX_WAIT_SECONDS,
            });
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::PageSize {
                got: self.page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        Ok(())
    }

    pub fn search_url(&self) -> String {
        format!("{}/search/code", self.api_url.trim_end_matches('/'))
    }

    pub fn issues_url(&self, target: &IssueRepo) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.api_url.trim_end_matches('/'),
            target.owner,
            target.repo
        )
    }
}
