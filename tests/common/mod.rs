#![allow(dead_code)]

use component_usage_search_lib::{RequestExecutor, RetryPolicy, SearchConfig};
use indicatif::ProgressBar;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";

/// Config pointed at the mock server, with no wait between throttled attempts.
pub fn test_config(server: &MockServer, max_attempts: u32) -> SearchConfig {
    let mut config = SearchConfig::new(TOKEN);
    config.api_url = server.uri();
    config.retry = RetryPolicy::new(max_attempts, 0);
    config
}

pub fn executor(config: &SearchConfig) -> RequestExecutor {
    RequestExecutor::new(config, ProgressBar::hidden()).expect("Failed to build executor")
}

pub fn code_item(repo: &str, path: &str) -> Value {
    let owner = repo.split('/').next().unwrap_or_default();
    json!({
        "name": path.rsplit('/').next().unwrap_or(path),
        "path": path,
        "sha": "d670460b4b4aece5915caf5c68d12f560a9fe3e4",
        "repository": {
            "full_name": repo,
            "html_url": format!("https://github.com/{}", repo),
            "description": format!("{} service", repo),
            "owner": { "login": owner }
        }
    })
}

/// A search page with `count` items named after `label`.
pub fn search_page(total: u64, count: usize, label: &str) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            code_item(
                &format!("org{}/{}-{}", i % 3, label, i),
                &format!("views/{}-{}.njk", label, i),
            )
        })
        .collect();
    json!({
        "total_count": total,
        "incomplete_results": false,
        "items": items
    })
}

/// Mount the one-item probe request for `query`.
pub async fn mount_probe(server: &MockServer, query: &str, total: u64) {
    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(query_param("q", query))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(total, 1, "probe")))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount one collection page for `query`, expected exactly `times` times.
pub async fn mount_page(
    server: &MockServer,
    query: &str,
    per_page: u32,
    page: u32,
    body: Value,
    times: u64,
) {
    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(query_param("q", query))
        .and(query_param("per_page", per_page.to_string().as_str()))
        .and(query_param("page", page.to_string().as_str()))
        .and(query_param("sort", "indexed"))
        .and(query_param("order", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}
