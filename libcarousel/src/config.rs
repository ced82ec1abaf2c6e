//! Site-level configuration
//!
//! Settings shared by every carousel on a site: the current host name (used
//! to classify links as internal or external), the narrow-viewport
//! breakpoint and the runtime fallbacks for unparseable block input.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Width in logical pixels at or below which the viewport counts as narrow
pub const DEFAULT_BREAKPOINT_PX: u32 = 768;
/// Autoplay delay used when the block's value is missing or unparseable
pub const DEFAULT_AUTOPLAY_DELAY_MS: u64 = 4000;
/// Button label for listing slides when the block sets none
pub const DEFAULT_LISTING_BUTTON_TEXT: &str = "Read more";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Host name of the site serving the carousel, e.g. `www.example.org`
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_breakpoint")]
    pub breakpoint_px: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_listing_button_text")]
    pub listing_button_text: String,
    #[serde(default = "default_autoplay_delay")]
    pub autoplay_delay_ms: u64,
}

fn default_breakpoint() -> u32 {
    DEFAULT_BREAKPOINT_PX
}

fn default_listing_button_text() -> String {
    DEFAULT_LISTING_BUTTON_TEXT.to_string()
}

fn default_autoplay_delay() -> u64 {
    DEFAULT_AUTOPLAY_DELAY_MS
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: DEFAULT_BREAKPOINT_PX,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            listing_button_text: default_listing_button_text(),
            autoplay_delay_ms: DEFAULT_AUTOPLAY_DELAY_MS,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from the default location, or defaults if the
    /// file does not exist
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Current host name, if configured and non-empty
    pub fn host(&self) -> Option<&str> {
        self.site.host.as_deref().filter(|h| !h.is_empty())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CAROUSEL_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("carousel").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.viewport.breakpoint_px, 768);
        assert_eq!(config.defaults.autoplay_delay_ms, 4000);
        assert_eq!(config.defaults.listing_button_text, "Read more");
        assert_eq!(config.host(), None);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[site]\nhost = \"www.example.org\"").unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.host(), Some("www.example.org"));
        assert_eq!(config.viewport.breakpoint_px, 768);
        assert_eq!(config.defaults.listing_button_text, "Read more");
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[site\nhost = ").unwrap();

        let err = Config::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Failed to parse config"));
    }

    #[test]
    fn test_empty_host_is_none() {
        let config = Config {
            site: SiteConfig {
                host: Some(String::new()),
            },
            ..Default::default()
        };
        assert_eq!(config.host(), None);
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        std::env::set_var("CAROUSEL_CONFIG", "/tmp/carousel-test.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var("CAROUSEL_CONFIG");

        assert_eq!(path, PathBuf::from("/tmp/carousel-test.toml"));
    }

    #[test]
    #[serial]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        std::env::set_var("CAROUSEL_CONFIG", missing.to_str().unwrap());
        let config = Config::load_or_default().unwrap();
        std::env::remove_var("CAROUSEL_CONFIG");

        assert_eq!(config, Config::default());
    }
}
