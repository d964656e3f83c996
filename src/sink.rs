use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::SinkError;
use crate::model::AggregateReport;

/// `filename` with a `.json` suffix appended unless it already has one.
pub fn json_path(filename: &str) -> PathBuf {
    if filename.ends_with(".json") {
        PathBuf::from(filename)
    } else {
        PathBuf::from(format!("{}.json", filename))
    }
}

/// Write the report as pretty-printed JSON, returning the path actually written.
pub async fn save_report(report: &AggregateReport, filename: &str) -> Result<PathBuf, SinkError> {
    let path = json_path(filename);
    info!("Saving JSON to {}", path.display());

    let json = serde_json::to_string_pretty(report)?;
    if let Err(source) = tokio::fs::write(&path, json).await {
        error!("Error saving file {}: {}", path.display(), source);
        return Err(SinkError::Io { path, source });
    }

    info!("File saved successfully");
    Ok(path)
}

pub async fn load_report(path: &Path) -> Result<AggregateReport, SinkError> {
    let raw = tokio::fs::read(path).await.map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_slice(&raw)?)
}
