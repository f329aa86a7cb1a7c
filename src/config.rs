//! Application configuration.
//!
//! Defaults come from the platform directories; `.env` and process
//! environment variables override them, and command-line flags override
//! both.

use crate::error::DistributionError;
use crate::license::DEFAULT_LICENSE_LABEL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_OUTPUT_DIR: &str = "ROSTER_DIST_OUTPUT_DIR";
pub const ENV_LOG_DIR: &str = "ROSTER_DIST_LOG_DIR";
pub const ENV_LOG_RETENTION_DAYS: &str = "ROSTER_DIST_LOG_RETENTION_DAYS";
pub const ENV_MATCH_LENGTH: &str = "ROSTER_DIST_MATCH_LENGTH";

/// Default OrganizeFiles prefix length
pub const DEFAULT_MATCH_LENGTH: usize = 8;

/// Default audit retention
pub const DEFAULT_LOG_RETENTION_DAYS: u32 = 30;

const LOG_DIR_NAME: &str = "password_system_logs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base for timestamped CreateFolders roots
    pub output_dir: PathBuf,
    /// Audit trail directory
    pub log_dir: PathBuf,
    /// Audit files older than this many days are removed (0 keeps all)
    pub log_retention_days: u32,
    /// OrganizeFiles prefix length
    pub match_length: usize,
    /// Title and file-name suffix of license documents
    pub license_file_label: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            output_dir: dirs::download_dir().unwrap_or_else(|| home.join("Downloads")),
            log_dir: home.join(LOG_DIR_NAME),
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
            match_length: DEFAULT_MATCH_LENGTH,
            license_file_label: DEFAULT_LICENSE_LABEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any), then apply environment overrides
    pub fn from_env() -> Result<Self, DistributionError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Failed to read .env");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DistributionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = value(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = value(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(days) = value(ENV_LOG_RETENTION_DAYS) {
            config.log_retention_days = parse_number(ENV_LOG_RETENTION_DAYS, &days)?;
        }
        if let Some(length) = value(ENV_MATCH_LENGTH) {
            config.match_length = parse_number(ENV_MATCH_LENGTH, &length)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DistributionError> {
        if self.match_length < 1 {
            return Err(DistributionError::InvalidArgument(format!(
                "{} must be at least 1",
                ENV_MATCH_LENGTH
            )));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, DistributionError> {
    raw.trim().parse().map_err(|_| {
        DistributionError::InvalidArgument(format!("{} is not a valid number: {:?}", key, raw))
    })
}
