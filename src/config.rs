//! Configuration for the API client.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ApiError, Result};

fn default_wait_secs() -> u64 {
    30
}

fn default_worker_threads() -> usize {
    2
}

/// Client configuration, loadable from a TOML file.
///
/// ```toml
/// base_url = "https://nebula.example.com/api/v1"
/// default_wait_secs = 10
/// worker_threads = 4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server root that relative targets resolve against. A target of
    /// "/motd" with a base of "https://nebula.example.com/api/v1" resolves
    /// to "https://nebula.example.com/api/v1/motd".
    #[serde(default)]
    pub base_url: String,

    /// Default upper bound, in seconds, for blocking waits. Zero means wait
    /// without bound.
    #[serde(default = "default_wait_secs")]
    pub default_wait_secs: u64,

    /// Worker threads for the dispatch runtime.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_wait_secs: default_wait_secs(),
            worker_threads: default_worker_threads(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ApiError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| ApiError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Resolve a target against the configured base URL.
    pub fn resolve(&self, target: &str) -> String {
        if self.base_url.is_empty() {
            return target.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            target.trim_start_matches('/')
        )
    }

    /// The default wait bound as a `Duration`, if one is configured.
    pub fn default_wait(&self) -> Option<Duration> {
        if self.default_wait_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.default_wait_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert!(config.base_url.is_empty());
        assert_eq!(config.default_wait_secs, 30);
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.default_wait(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_wait_means_unbounded() {
        let config = ClientConfig {
            default_wait_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.default_wait(), None);
    }

    #[test]
    fn test_resolve_against_base_url() {
        let config = ClientConfig {
            base_url: "https://nebula.example.com/api/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.resolve("/motd"),
            "https://nebula.example.com/api/v1/motd"
        );
        assert_eq!(
            config.resolve("realms/1"),
            "https://nebula.example.com/api/v1/realms/1"
        );
    }

    #[test]
    fn test_resolve_without_base_url() {
        let config = ClientConfig::default();
        assert_eq!(config.resolve("/motd"), "/motd");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url = \"https://nebula.example.com\"\ndefault_wait_secs = 5"
        )
        .unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url, "https://nebula.example.com");
        assert_eq!(config.default_wait_secs, 5);
        // Omitted fields fall back to defaults
        assert_eq!(config.worker_threads, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ClientConfig::load(Path::new("/nonexistent/nebula.toml"));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }
}
