//! Deployment History
//!
//! Append-only JSON file of past deployments, read by `--status`.
//! Small enough that read-modify-write of the whole array is fine.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::types::DeploymentRecord;

/// Load the deployment history. A missing or unreadable file is an
/// empty history, not an error.
pub fn load_history(path: &Path) -> Vec<DeploymentRecord> {
    let Ok(contents) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str(&contents) {
        Ok(records) => records,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "unparseable history file, starting fresh");
            Vec::new()
        }
    }
}

/// Append one record to the history file, creating it (and its
/// parent directory) if needed.
pub fn append_record(path: &Path, record: &DeploymentRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut records = load_history(path);
    records.push(record.clone());

    let json = serde_json::to_string_pretty(&records).context("Failed to serialize history")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write history file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EngineKind;
    use std::path::PathBuf;

    fn temp_history_path() -> PathBuf {
        std::env::temp_dir().join(format!("tabula-history-{}.json", uuid::Uuid::new_v4()))
    }

    fn sample_record(id: &str) -> DeploymentRecord {
        DeploymentRecord {
            id: id.to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            resource_name: "projects/p/locations/l/agentEngines/1".to_string(),
            engine: EngineKind::AgentEngine,
            display_name: "csv-json-converter".to_string(),
            model: "gemini-2.0-flash".to_string(),
            staging_bucket: "demo-staging".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        assert!(load_history(Path::new("/nonexistent/tabula-history.json")).is_empty());
    }

    #[test]
    fn test_append_and_load() {
        let path = temp_history_path();

        append_record(&path, &sample_record("one")).unwrap();
        append_record(&path, &sample_record("two")).unwrap();

        let records = load_history(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "one");
        assert_eq!(records[1].id, "two");
        assert_eq!(records[1].engine, EngineKind::AgentEngine);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let path = temp_history_path();
        fs::write(&path, "not json at all").unwrap();

        assert!(load_history(&path).is_empty());
        append_record(&path, &sample_record("one")).unwrap();
        assert_eq!(load_history(&path).len(), 1);

        fs::remove_file(&path).ok();
    }
}
