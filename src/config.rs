use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

/// Default access scope passed along with inter-service calls
pub const DEFAULT_SUBDOMAIN: &str = "os";

/// Settings read from `~/.salesdeck/rc`
///
/// The rc file holds `key=value` lines; blank lines and lines starting with
/// `#` are ignored. Recognised keys:
///
/// - `data.location`: database path (relative paths resolve against the rc directory)
/// - `template.use_fallback`: `true` returns the raw template when restoring fails
/// - `subdomain`: access scope for inter-service calls
/// - `user`: acting user id recorded in audit fields
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_location: PathBuf,
    pub use_fallback: bool,
    pub subdomain: String,
    pub user: Option<String>,
}

impl Config {
    /// Directory holding the rc file and the default database
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine the home directory")?;
        Ok(home.join(".salesdeck"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("rc"))
    }

    /// Defaults rooted at `dir`
    pub fn defaults_in(dir: &Path) -> Self {
        Self {
            data_location: dir.join("sales.db"),
            use_fallback: true,
            subdomain: DEFAULT_SUBDOMAIN.to_string(),
            user: None,
        }
    }

    /// Load the configuration file, falling back to defaults when it is absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let dir = Self::config_dir()?;

        if !config_path.exists() {
            return Ok(Self::defaults_in(&dir));
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        Self::parse(&content, &dir)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))
    }

    /// Parse rc file content; `base_dir` anchors relative data paths
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let mut config = Self::defaults_in(base_dir);

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once('=')
                .with_context(|| format!("line {}: expected key=value", line_no + 1))?;
            let value = value.trim();

            match key.trim() {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() {
                        base_dir.join(path)
                    } else {
                        path
                    };
                }
                "template.use_fallback" => {
                    config.use_fallback = parse_bool(value)
                        .with_context(|| format!("line {}: template.use_fallback", line_no + 1))?;
                }
                "subdomain" => config.subdomain = value.to_string(),
                "user" => {
                    config.user = if value.is_empty() { None } else { Some(value.to_string()) };
                }
                other => log::warn!("Ignoring unknown config key '{}'", other),
            }
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("expected true or false, got '{}'", value),
    }
}
