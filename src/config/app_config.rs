use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::errors::{Result, TokenbindError};

/// Top-level tokenbind configuration read from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub tokenbind: TokenbindSection,
    #[serde(default)]
    pub hooks: HooksSection,
    #[serde(default)]
    pub permissions: PermissionsSection,
}

impl AppConfig {
    /// Load and validate the configuration at `config_path`.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Err(TokenbindError::InvalidConfig {
                detail: format!(
                    "{} not found. Run 'tokenbind init' first or pass --config.",
                    config_path.display()
                ),
            });
        }
        let content = std::fs::read_to_string(config_path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| TokenbindError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;

        if config.tokenbind.format_version > CURRENT_FORMAT_VERSION {
            return Err(TokenbindError::FormatVersionTooNew {
                config_version: config.tokenbind.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        for (name, argv) in config.hooks.named() {
            if argv.is_some_and(|argv| argv.first().is_none_or(|p| p.trim().is_empty())) {
                return Err(TokenbindError::InvalidConfig {
                    detail: format!("hooks.{name} must name a program to run"),
                });
            }
        }

        if config.hooks.timeout_secs == 0 {
            return Err(TokenbindError::InvalidConfig {
                detail: "hooks.timeout_secs must be at least 1".into(),
            });
        }

        Ok(config)
    }
}

/// Current format version supported by this build of tokenbind.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// The `[tokenbind]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenbindSection {
    pub version: String,
    /// Format version for backward compatibility. Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
}

fn default_format_version() -> u32 {
    1
}

/// The `[hooks]` section: one argv per collaborator. A missing hook makes
/// the matching lookup fail instead of aborting the run.
#[derive(Debug, Clone, Deserialize)]
pub struct HooksSection {
    pub local: Option<Vec<String>>,
    pub url: Option<Vec<String>>,
    pub keyserver: Option<Vec<String>>,
    pub content_file: Option<Vec<String>>,
    pub import: Option<Vec<String>>,
    pub promote: Option<Vec<String>>,
    pub reset: Option<Vec<String>>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HooksSection {
    fn default() -> Self {
        Self {
            local: None,
            url: None,
            keyserver: None,
            content_file: None,
            import: None,
            promote: None,
            reset: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HooksSection {
    fn named(&self) -> [(&'static str, Option<&Vec<String>>); 7] {
        [
            ("local", self.local.as_ref()),
            ("url", self.url.as_ref()),
            ("keyserver", self.keyserver.as_ref()),
            ("content_file", self.content_file.as_ref()),
            ("import", self.import.as_ref()),
            ("promote", self.promote.as_ref()),
            ("reset", self.reset.as_ref()),
        ]
    }
}

fn default_timeout_secs() -> u64 {
    60
}

/// The `[permissions]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionsSection {
    /// Files below these directories may be read without asking.
    #[serde(default)]
    pub allowed_dirs: Vec<PathBuf>,
}
