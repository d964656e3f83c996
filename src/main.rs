use std::env;
use std::process::ExitCode;

use clap::Parser;
use component_usage_search_lib::{Args, ConfigError, GitHubSearcher};
use dotenv::dotenv;
use tracing::{error, info};

/// Token from the command line, then GH_TOKEN, then GITHUB_TOKEN.
fn resolve_token(args: &Args) -> Result<String, ConfigError> {
    if let Some(t) = args.token.as_ref().filter(|t| !t.trim().is_empty()) {
        return Ok(t.clone());
    }
    ["GH_TOKEN", "GITHUB_TOKEN"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|token| !token.trim().is_empty())
        .ok_or(ConfigError::MissingToken)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    dotenv().ok();

    let args = Args::parse();

    let setup = resolve_token(&args).and_then(|token| {
        let config = args.search_config(token)?;
        let terms = args.search_terms()?;
        let target = if args.file_issues {
            Some(args.issue_target()?)
        } else {
            None
        };
        Ok((config, terms, target))
    });
    let (config, terms, target) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let searcher = match GitHubSearcher::new(config, !args.quiet) {
        Ok(searcher) => searcher,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = searcher.run(&terms).await;
    for (term_id, results) in report.iter() {
        info!("Found {} results for '{}'", results.len(), term_id);
    }

    // Results are saved before any issue is filed
    match searcher
        .publish(&report, &args.output, target.as_ref())
        .await
    {
        Ok(path) => {
            info!("Finished saving results to '{}'", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
