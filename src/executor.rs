use indicatif::ProgressBar;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::{RetryPolicy, SearchConfig, MAX_WAIT_SECONDS};
use crate::error::RequestError;

const USER_AGENT: &str = "component-usage-search (Rust reqwest)";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// What gets sent alongside the request.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Query string parameters, used with GET.
    Query(Vec<(String, String)>),
    /// JSON body, used with POST.
    Json(Value),
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Number of throttle waits it took to get here.
    pub throttled: u32,
}

enum AttemptState {
    Attempting { attempt: u32 },
    Throttled { attempt: u32 },
    Succeeded(ApiResponse),
    FailedTerminal(RequestError),
}

/// Issues single requests, retrying on HTTP 403 after a fixed wait.
///
/// Transport errors and any other non-2xx status end the call immediately.
pub struct RequestExecutor {
    client: Client,
    token: String,
    retry: RetryPolicy,
    progress: ProgressBar,
}

impl RequestExecutor {
    pub fn new(config: &SearchConfig, progress: ProgressBar) -> Result<Self, RequestError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(RequestExecutor {
            client,
            token: config.token.clone(),
            retry: config.retry,
            progress,
        })
    }

    pub fn progress(&self) -> &ProgressBar {
        &self.progress
    }

    pub async fn get(
        &self,
        url: &str,
        params: Vec<(String, String)>,
    ) -> Result<ApiResponse, RequestError> {
        self.execute(Method::GET, url, &Payload::Query(params)).await
    }

    pub async fn post_json(&self, url: &str, body: Value) -> Result<ApiResponse, RequestError> {
        self.execute(Method::POST, url, &Payload::Json(body)).await
    }

    /// Run one logical request to completion.
    ///
    /// The request headers are not a parameter: every call carries the
    /// `Authorization` token, the JSON `Accept` type and the API version
    /// header, set in one place by `send`.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        payload: &Payload,
    ) -> Result<ApiResponse, RequestError> {
        if method != Method::GET && method != Method::POST {
            error!("Refusing to send {} request to {}", method, url);
            return Err(RequestError::UnsupportedMethod(method.to_string()));
        }

        let max_attempts = self.retry.max_attempts.max(1);
        let mut state = AttemptState::Attempting { attempt: 1 };

        loop {
            state = match state {
                AttemptState::Attempting { attempt } => {
                    debug!(
                        "Attempt {}/{}: {} {} {:?}",
                        attempt, max_attempts, method, url, payload
                    );
                    let response = match self.send(&method, url, payload).await {
                        Ok(response) => response,
                        Err(e) => {
                            error!("Transport error on {} {}: {}", method, url, e);
                            return Err(e);
                        }
                    };
                    let status = response.status();

                    // 2xx ends the call, 403 is throttling, anything else is final
                    if status.is_success() {
                        match read_body(response).await {
                            Ok(body) => AttemptState::Succeeded(ApiResponse {
                                status,
                                body,
                                throttled: attempt - 1,
                            }),
                            Err(e) => AttemptState::FailedTerminal(e),
                        }
                    } else if status == StatusCode::FORBIDDEN {
                        // No point waiting after the last allowed attempt
                        if attempt >= max_attempts {
                            AttemptState::FailedTerminal(RequestError::RetriesExhausted {
                                attempts: attempt,
                            })
                        } else {
                            AttemptState::Throttled { attempt }
                        }
                    } else {
                        let message = error_message(response).await;
                        AttemptState::FailedTerminal(RequestError::Rejected {
                            status: status.as_u16(),
                            message,
                        })
                    }
                }
                AttemptState::Throttled { attempt } => {
                    warn!(
                        "403 Forbidden - retry {}/{} for {} in {} seconds",
                        attempt,
                        max_attempts,
                        url,
                        self.retry.wait.as_secs()
                    );
                    self.wait_out_throttle().await;
                    AttemptState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                AttemptState::Succeeded(response) => {
                    info!("{} {} -> {}", method, url, response.status);
                    return Ok(response);
                }
                AttemptState::FailedTerminal(e) => {
                    error!("Giving up on {} {}: {}", method, url, e);
                    return Err(e);
                }
            };
        }
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        payload: &Payload,
    ) -> Result<reqwest::Response, RequestError> {
        let request = self
            .client
            .request(method.clone(), url)
            .header(ACCEPT, ACCEPT_JSON)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header("X-GitHub-Api-Version", API_VERSION);

        let request = match payload {
            Payload::Query(params) => request.query(params),
            Payload::Json(body) => request.json(body),
        };

        Ok(request.send().await?)
    }

    /// Sleep for the configured interval, counting down on the progress bar.
    async fn wait_out_throttle(&self) {
        // Save the current message to restore later
        let original_msg = self.progress.message();
        let wait = self.retry.wait.min(Duration::from_secs(MAX_WAIT_SECONDS));
        let end = Instant::now() + wait;

        loop {
            let remaining = end.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.progress
                .set_message(format!("Rate limited - waiting {}s", remaining.as_secs() + 1));
            sleep(remaining.min(Duration::from_millis(500))).await;
        }

        self.progress.set_message(original_msg);
    }
}

async fn read_body(response: reqwest::Response) -> Result<Value, RequestError> {
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

async fn error_message(response: reqwest::Response) -> String {
    response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string())
}
