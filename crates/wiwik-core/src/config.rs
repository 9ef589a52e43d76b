//! Configuration resolution for the wiwik client.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/wiwik/settings.json)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete wiwik client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mention: MentionConfig,
    #[serde(default)]
    pub invite: InviteConfig,
    #[serde(default)]
    pub dwell: DwellConfig,
}

/// Forum server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Forum base URL; endpoints such as `/users-autocomplete/` hang off it.
    pub base_url: String,
    /// Per-request timeout for user search calls (seconds).
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 10,
            log_level: "info".to_string(),
        }
    }
}

/// `@mention` widget settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionConfig {
    /// Character that starts a mention token.
    pub trigger: char,
    /// Number of menu rows drawn before the menu scrolls.
    pub visible_items: usize,
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            trigger: '@',
            visible_items: 8,
        }
    }
}

/// Invite-to-question tag input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InviteConfig {
    /// Upper bound on suggestions shown in the dropdown.
    pub max_suggestions: usize,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self { max_suggestions: 10 }
    }
}

/// Dwell-time instrumentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DwellConfig {
    /// Interval after which an idle reader is considered halted (seconds).
    pub halt_interval_secs: u64,
    /// Time credited to every scroll event (milliseconds).
    pub scroll_penalty_ms: f64,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            halt_interval_secs: 39,
            scroll_penalty_ms: 1.8,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path()
        && global_path.exists()
    {
        config = load_config_file(&global_path)?;
    }

    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".wiwik").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/wiwik/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("wiwik").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// Directory for client state: the key-value store and the TUI log file.
pub fn state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".wiwik"))
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("WIWIK_SERVER_URL") {
        config.server.base_url = val;
    }
    if let Ok(val) = std::env::var("WIWIK_REQUEST_TIMEOUT_SECS")
        && let Ok(n) = val.parse()
    {
        config.server.request_timeout_secs = n;
    }
    if let Ok(val) = std::env::var("WIWIK_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Ok(val) = std::env::var("WIWIK_MENTION_TRIGGER") {
        let mut chars = val.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            config.mention.trigger = c;
        }
    }
}

/// Reject settings the widgets cannot work with.
pub fn validate(config: &Config) -> Result<()> {
    if config.server.base_url.trim().is_empty() {
        return Err(Error::Config("server.base_url is empty".into()));
    }
    if config.mention.trigger.is_whitespace() {
        return Err(Error::Config(
            "mention.trigger must not be whitespace".into(),
        ));
    }
    if config.mention.visible_items == 0 {
        return Err(Error::Config("mention.visible_items must be > 0".into()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_at_trigger() {
        let config = Config::default();
        assert_eq!(config.mention.trigger, '@');
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn default_dwell_matches_average_scroll_interval() {
        let config = Config::default();
        assert_eq!(config.dwell.halt_interval_secs, 39);
        assert_eq!(config.dwell.scroll_penalty_ms, 1.8);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"base_url": "https://forum.test"}}"#).unwrap();
        let config = load_config_file(&path).unwrap();
        assert_eq!(config.server.base_url, "https://forum.test");
        assert_eq!(config.server.request_timeout_secs, 10);
        assert_eq!(config.mention.visible_items, 8);
    }

    #[test]
    fn unparsable_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn whitespace_trigger_rejected() {
        let mut config = Config::default();
        config.mention.trigger = ' ';
        assert!(matches!(validate(&config), Err(Error::Config(_))));
    }

    #[test]
    fn empty_base_url_rejected() {
        let mut config = Config::default();
        config.server.base_url = "  ".into();
        assert!(validate(&config).is_err());
    }
}
