use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metrics::DEFAULT_WINDOW_CAPACITY;

/// Poll cadence per stream
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PollConfig {
    #[serde(default = "default_logs_interval")]
    pub logs_interval_ms: u64,
    #[serde(default = "default_logs_interval")]
    pub stored_interval_ms: u64,
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_ms: u64,
}

fn default_logs_interval() -> u64 {
    5000
}
fn default_metrics_interval() -> u64 {
    2000
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            logs_interval_ms: default_logs_interval(),
            stored_interval_ms: default_logs_interval(),
            metrics_interval_ms: default_metrics_interval(),
        }
    }
}

impl PollConfig {
    pub fn logs_interval(&self) -> Duration {
        Duration::from_millis(self.logs_interval_ms)
    }

    pub fn stored_interval(&self) -> Duration {
        Duration::from_millis(self.stored_interval_ms)
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms)
    }
}

/// Root configuration file structure
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Where the Watchdog service listens
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub poll: PollConfig,

    /// Points kept per metric chart
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,

    /// Handed to the HTTP transport. Unset means the transport's own default.
    #[serde(default)]
    pub transport_timeout_ms: Option<u64>,

    /// Directory for the dashboard's log file
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:8080".into()
}
fn default_window_capacity() -> usize {
    DEFAULT_WINDOW_CAPACITY
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll: PollConfig::default(),
            window_capacity: default_window_capacity(),
            transport_timeout_ms: None,
            log_dir: None,
        }
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    InvalidBaseUrl { url: String, reason: String },
    ZeroInterval { field: &'static str },
    ZeroCapacity,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML parse error: {}", e),
            Self::InvalidBaseUrl { url, reason } => {
                write!(f, "invalid base_url '{}': {}", url, reason)
            }
            Self::ZeroInterval { field } => write!(f, "poll.{} must be greater than 0", field),
            Self::ZeroCapacity => write!(f, "window_capacity must be greater than 0"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

const CONFIG_NAMES: [&str; 4] = [
    "watchdog.yaml",
    "watchdog.yml",
    ".watchdog.yaml",
    ".watchdog.yml",
];

impl DashboardConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: DashboardConfig = serde_yaml::from_str(content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Search for a config file: `WATCHDOG_CONFIG` first, then the standard
    /// names in `start_dir` and each parent. `Ok(None)` when nothing exists.
    pub fn discover(start_dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        Self::discover_with(start_dir, std::env::var_os("WATCHDOG_CONFIG").map(PathBuf::from))
    }

    /// `discover` with the environment override passed in. An override that
    /// does not exist is skipped.
    pub fn discover_with(
        start_dir: &Path,
        env_path: Option<PathBuf>,
    ) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        if let Some(path) = env_path.filter(|p| p.exists()) {
            let config = Self::load(&path)?;
            return Ok(Some((path, config)));
        }

        let mut dir = Some(start_dir);
        while let Some(current) = dir {
            for name in &CONFIG_NAMES {
                let path = current.join(name);
                if path.exists() {
                    return Ok(Some((path.clone(), Self::load(&path)?)));
                }
            }
            dir = current.parent();
        }

        Ok(None)
    }

    /// Replace the base URL (e.g. from a command-line flag) and re-validate
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = base_url.to_string();
        self.normalize();
        self.validate()?;
        Ok(self)
    }

    pub fn transport_timeout(&self) -> Option<Duration> {
        self.transport_timeout_ms.map(Duration::from_millis)
    }

    fn normalize(&mut self) {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        for (field, value) in [
            ("logs_interval_ms", self.poll.logs_interval_ms),
            ("stored_interval_ms", self.poll.stored_interval_ms),
            ("metrics_interval_ms", self.poll.metrics_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }

        if self.window_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.poll.logs_interval(), Duration::from_millis(5000));
        assert_eq!(config.poll.stored_interval(), Duration::from_millis(5000));
        assert_eq!(config.poll.metrics_interval(), Duration::from_millis(2000));
        assert_eq!(config.window_capacity, 30);
        assert_eq!(config.transport_timeout(), None);
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
base_url: "http://10.0.0.5:8080/"
poll:
  metrics_interval_ms: 1000
transport_timeout_ms: 3000
"#;
        let config = DashboardConfig::from_str(yaml).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:8080");
        assert_eq!(config.poll.metrics_interval_ms, 1000);
        assert_eq!(config.poll.logs_interval_ms, 5000);
        assert_eq!(config.window_capacity, 30);
        assert_eq!(config.transport_timeout(), Some(Duration::from_millis(3000)));
    }

    #[test]
    fn test_empty_document_is_defaults() {
        let config = DashboardConfig::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_invalid_base_url() {
        let result = DashboardConfig::from_str("base_url: \"not a url\"");
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));

        let result = DashboardConfig::from_str("base_url: \"ftp://host\"");
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_zero_values_rejected() {
        let result = DashboardConfig::from_str("poll:\n  stored_interval_ms: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::ZeroInterval {
                field: "stored_interval_ms"
            })
        ));

        let result = DashboardConfig::from_str("window_capacity: 0");
        assert!(matches!(result, Err(ConfigError::ZeroCapacity)));
    }

    #[test]
    fn test_with_base_url_override() {
        let config = DashboardConfig::default()
            .with_base_url("https://watchdog.internal/")
            .unwrap();
        assert_eq!(config.base_url, "https://watchdog.internal");

        assert!(DashboardConfig::default().with_base_url("nope").is_err());
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("watchdog-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_discover_walks_up_from_start_dir() {
        let root = scratch_dir("walk");
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(".watchdog.yml"), "window_capacity: 12\n").unwrap();

        let (path, config) = DashboardConfig::discover_with(&nested, None).unwrap().unwrap();
        assert_eq!(path, root.join(".watchdog.yml"));
        assert_eq!(config.window_capacity, 12);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_env_path_wins_over_directory_file() {
        let root = scratch_dir("env-wins");
        std::fs::write(root.join("watchdog.yaml"), "window_capacity: 12\n").unwrap();
        let env_file = root.join("elsewhere.yaml");
        std::fs::write(&env_file, "window_capacity: 7\n").unwrap();

        let (path, config) = DashboardConfig::discover_with(&root, Some(env_file.clone()))
            .unwrap()
            .unwrap();
        assert_eq!(path, env_file);
        assert_eq!(config.window_capacity, 7);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_missing_env_path_falls_through_to_walk() {
        let root = scratch_dir("env-missing");
        std::fs::write(root.join("watchdog.yaml"), "window_capacity: 12\n").unwrap();

        let (path, config) =
            DashboardConfig::discover_with(&root, Some(root.join("does-not-exist.yaml")))
                .unwrap()
                .unwrap();
        assert_eq!(path, root.join("watchdog.yaml"));
        assert_eq!(config.window_capacity, 12);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_malformed_env_file_is_a_yaml_error() {
        let root = scratch_dir("env-bad");
        std::fs::write(root.join("watchdog.yaml"), "window_capacity: 12\n").unwrap();
        let env_file = root.join("broken.yaml");
        std::fs::write(&env_file, "poll: [unclosed\n").unwrap();

        let result = DashboardConfig::discover_with(&root, Some(env_file));
        assert!(matches!(result, Err(ConfigError::Yaml(_))));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
