use anyhow::Context;
use serde::Deserialize;
use shared_types::TaskVariant;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ANALYSIS_URL: &str = "http://127.0.0.1:8787/v1/analyze";
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_UNDO_KEYS: &[&str] = &["ctrl+z", "meta+z"];
pub const DEFAULT_REDO_KEYS: &[&str] = &["ctrl+shift+z", "meta+shift+z", "ctrl+y"];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Endpoint the essay is posted to for critique
    pub analysis_url: String,
    /// Bearer token for the analysis endpoint
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    /// Task variant used when a session does not pick one
    pub task_variant: TaskVariant,
    pub undo_keys: Vec<String>,
    pub redo_keys: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis_url: DEFAULT_ANALYSIS_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            task_variant: TaskVariant::default(),
            undo_keys: to_strings(DEFAULT_UNDO_KEYS),
            redo_keys: to_strings(DEFAULT_REDO_KEYS),
        }
    }
}

/// Keys accepted in the optional TOML file. Env vars take precedence.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub analysis_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub task_variant: Option<TaskVariant>,
    pub undo_keys: Option<Vec<String>>,
    pub redo_keys: Option<Vec<String>>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let file = match std::env::var("STUDIO_CONFIG_FILE") {
            Ok(path) => ConfigFile::load(Path::new(&path))?,
            Err(_) => ConfigFile::default(),
        };
        Self::from_file_and_env(file)
    }

    pub fn from_file_and_env(file: ConfigFile) -> anyhow::Result<Self> {
        let base = Self::from_file(file);

        let task_variant = match std::env::var("STUDIO_TASK_VARIANT") {
            Ok(raw) => raw
                .parse::<TaskVariant>()
                .map_err(|e| anyhow::anyhow!("Invalid STUDIO_TASK_VARIANT: {e}"))?,
            Err(_) => base.task_variant,
        };

        Ok(Self {
            analysis_url: env_str("STUDIO_ANALYSIS_URL", &base.analysis_url),
            api_key: std::env::var("STUDIO_ANALYSIS_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty())
                .or(base.api_key),
            request_timeout: Duration::from_secs(env_parse(
                "STUDIO_ANALYSIS_TIMEOUT_SECS",
                base.request_timeout.as_secs(),
            )?),
            task_variant,
            undo_keys: env_csv("STUDIO_UNDO_KEYS", &base.undo_keys),
            redo_keys: env_csv("STUDIO_REDO_KEYS", &base.redo_keys),
        })
    }

    pub fn from_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            analysis_url: file.analysis_url.unwrap_or(defaults.analysis_url),
            api_key: file.api_key.filter(|key| !key.trim().is_empty()),
            request_timeout: file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            task_variant: file.task_variant.unwrap_or(defaults.task_variant),
            undo_keys: file.undo_keys.unwrap_or(defaults.undo_keys),
            redo_keys: file.redo_keys.unwrap_or(defaults.redo_keys),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}

fn env_csv(key: &str, default: &[String]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        Err(_) => default.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_values_override_defaults() {
        let file: ConfigFile = toml::from_str(
            r#"
analysis_url = "https://critique.example/v1/analyze"
timeout_secs = 30
task_variant = "task1"
undo_keys = ["ctrl+z"]
"#,
        )
        .unwrap();
        let config = Config::from_file(file);
        assert_eq!(config.analysis_url, "https://critique.example/v1/analyze");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.task_variant, TaskVariant::Task1);
        assert_eq!(config.undo_keys, vec!["ctrl+z".to_string()]);
        assert_eq!(config.redo_keys, to_strings(DEFAULT_REDO_KEYS));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let parsed: Result<ConfigFile, _> = toml::from_str("model = \"x\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn load_reads_toml_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"secret\"").unwrap();
        let loaded = ConfigFile::load(file.path()).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ConfigFile::load(Path::new("/nonexistent/studio.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = Config::from_file(ConfigFile {
            api_key: Some("  ".to_string()),
            ..Default::default()
        });
        assert!(config.api_key.is_none());
    }
}
