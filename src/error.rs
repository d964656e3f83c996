use std::path::PathBuf;

use thiserror::Error;

/// Terminal outcome of a request that did not succeed.
///
/// Throttling (HTTP 403) is handled inside the executor and only ever
/// surfaces as [`RequestError::RetriesExhausted`].
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("gave up after {attempts} throttled attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RequestError {
    /// HTTP status carried by the failure, if the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Rejected { status, .. } => Some(*status),
            RequestError::RetriesExhausted { .. } => Some(403),
            RequestError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a GitHub token is required (pass --token or set GH_TOKEN / GITHUB_TOKEN)")]
    MissingToken,

    #[error("max attempts must be at least 1")]
    ZeroAttempts,

    #[error("throttle wait must be at most {max} seconds, got {got}")]
    WaitTooLong { got: u64, max: u64 },

    #[error("page size must be between 1 and {max}, got {got}")]
    PageSize { got: u32, max: u32 },

    #[error("at least one file extension is required for fan-out")]
    NoExtensions,

    #[error("no search terms configured")]
    NoTerms,

    #[error("issue repository must look like owner/repo, got '{0}'")]
    IssueRepo(String),

    #[error("failed to read terms file {path}: {source}")]
    TermsFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid terms file {path}: {source}")]
    TermsFileParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Failure to persist the aggregate report.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
