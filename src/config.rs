use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine settings. Persisted as JSON under the user config dir so the CLI
/// keeps its output location and limits between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory the finished workbooks are written into.
    pub output_dir: PathBuf,
    /// Overall per-job deadline in seconds.
    pub job_timeout_secs: u64,
    /// Bounded pool size for concurrent remote fetches.
    pub fetch_concurrency: usize,
    /// TTL for progress/result records after the job terminates.
    pub record_ttl_secs: u64,
    /// Placeholder scan cap per sheet, keeps pathological templates cheap.
    pub scan_row_limit: u32,
    /// Slug prefix for output filenames.
    pub report_slug: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            job_timeout_secs: 900,
            fetch_concurrency: 4,
            record_ttl_secs: 3600,
            scan_row_limit: 100,
            report_slug: "photo-report".into(),
        }
    }
}

impl EngineConfig {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EngineConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("foto-report").join("config.json"))
    }
}
