//! Site configuration.
//!
//! An optional `config.toml` in the data root; every key has a default, so
//! a missing file is a valid (stock) configuration. CLI flags override the
//! file for host and port.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config.toml: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Heading of the listing page and its document title.
    #[serde(default = "default_site_title")]
    pub site_title: String,

    /// Bind address for `serve`.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_site_title() -> String {
    "Chess Articles".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8330
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_title: default_site_title(),
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Load `{root}/config.toml`, falling back to defaults when absent.
pub fn load_settings(root: &Path) -> Result<Settings, ConfigError> {
    let path = root.join("config.toml");
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(&path)?;
    let settings = toml::from_str(&content)?;
    Ok(settings)
}

/// A documented stock config, printed by `gen-config`.
pub fn stock_config_toml() -> String {
    format!(
        r#"# simple-press configuration. Place this file in the data root.
# Every key is optional; the values below are the defaults.

# Heading of the listing page.
site_title = "{}"

# Bind address for `serve`. Override per run with --host / --port.
host = "{}"
port = {}
"#,
        default_site_title(),
        default_host(),
        default_port()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let settings = load_settings(tmp.path()).unwrap();
        assert_eq!(settings.site_title, "Chess Articles");
        assert_eq!(settings.port, 8330);
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "site_title = \"My Press\"\n").unwrap();

        let settings = load_settings(tmp.path()).unwrap();
        assert_eq!(settings.site_title, "My Press");
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8330);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "port = \"not a number\"\n").unwrap();
        assert!(load_settings(tmp.path()).is_err());
    }

    #[test]
    fn stock_config_parses_back_to_defaults() {
        let settings: Settings = toml::from_str(&stock_config_toml()).unwrap();
        assert_eq!(settings.site_title, Settings::default().site_title);
        assert_eq!(settings.port, Settings::default().port);
    }
}
