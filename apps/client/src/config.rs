use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::upload::UploadPolicy;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "pdf,docx";
pub const DEFAULT_MAX_NOTIFICATIONS: usize = 50;

/// Client configuration loaded from environment variables.
/// Every variable is optional; unset ones fall back to `Config::default()`.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub request_timeout: Duration,
    pub upload_policy: UploadPolicy,
    pub notification_store_path: PathBuf,
    pub max_notifications: usize,
    /// Suppress error notifications for failures during the initial load.
    /// Failures are still logged.
    pub silent_initial_load: bool,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            upload_policy: UploadPolicy::default(),
            notification_store_path: default_store_path(),
            max_notifications: DEFAULT_MAX_NOTIFICATIONS,
            silent_initial_load: false,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        let max_file_size_mb = parse_env("MAX_FILE_SIZE_MB", DEFAULT_MAX_FILE_SIZE_MB)?;
        if max_file_size_mb == 0 {
            bail!("MAX_FILE_SIZE_MB must be greater than 0");
        }

        let extensions = parse_extensions(
            &std::env::var("ALLOWED_EXTENSIONS")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_EXTENSIONS.to_string()),
        );
        if extensions.is_empty() {
            bail!("At least one file extension must be allowed");
        }

        Ok(Config {
            backend_url: std::env::var("BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_url),
            request_timeout: Duration::from_secs(parse_env(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            upload_policy: UploadPolicy::new(extensions, max_file_size_mb),
            notification_store_path: std::env::var("NOTIFICATION_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.notification_store_path),
            max_notifications: parse_env("MAX_NOTIFICATIONS", DEFAULT_MAX_NOTIFICATIONS)?,
            silent_initial_load: parse_env("SILENT_INITIAL_LOAD", false)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated extension list, normalizing case and dropping blanks.
pub fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cv-analyzer")
        .join("notifications.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extensions_normalizes() {
        assert_eq!(
            parse_extensions(" PDF, .docx ,,txt "),
            vec!["pdf".to_string(), "docx".to_string(), "txt".to_string()]
        );
    }

    #[test]
    fn test_parse_extensions_empty() {
        assert!(parse_extensions(" , ").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_notifications, 50);
        assert_eq!(config.upload_policy.max_file_size_mb, 10);
        assert!(!config.silent_initial_load);
        assert!(config
            .notification_store_path
            .ends_with("cv-analyzer/notifications.json"));
    }
}
