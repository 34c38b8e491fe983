//! Configuration types and parsing for vg.yml

use crate::error::{CoreError, CoreResult};
use crate::identifiers::{DEFAULT_BLOCK_PREFIX, DEFAULT_FROM_PREFIX};
use crate::serde_helpers::default_true;
use crate::text_utils::is_simple_identifier;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file names searched for in a directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["vg.yml", "vg.yaml"];

/// Main configuration from vg.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Alias generation settings
    #[serde(default)]
    pub identifiers: IdentifierConfig,

    /// Rendering output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings for the identifier registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentifierConfig {
    /// Prefix for block aliases (`T` gives `T1`, `T2`, ...)
    #[serde(default = "default_block_prefix")]
    pub block_prefix: String,

    /// Prefix for boolean slot aliases (`_from` gives `_from0`, ...)
    #[serde(default = "default_from_prefix")]
    pub from_prefix: String,

    /// Names that generated aliases must never collide with
    #[serde(default)]
    pub reserved: Vec<String>,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            block_prefix: default_block_prefix(),
            from_prefix: default_from_prefix(),
            reserved: Vec::new(),
        }
    }
}

fn default_block_prefix() -> String {
    DEFAULT_BLOCK_PREFIX.to_string()
}

fn default_from_prefix() -> String {
    DEFAULT_FROM_PREFIX.to_string()
}

/// Render target selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Textual eSQL query (default)
    #[default]
    Esql,
    /// Command tree dump
    Cqt,
    /// Command tree as JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Esql => write!(f, "esql"),
            OutputFormat::Cqt => write!(f, "cqt"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Rendering output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Default render target
    #[serde(default)]
    pub format: OutputFormat,

    /// Render the root block as a top-level (`SELECT VALUE`) query
    #[serde(default = "default_true")]
    pub top_level: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            top_level: true,
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        // An empty file is a valid config with every default applied
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory, looking for vg.yml or vg.yaml.
    ///
    /// Returns the defaults when neither file exists.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        log::debug!("No config file in {}, using defaults", dir.display());
        Ok(Self::default())
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        for (field, prefix) in [
            ("identifiers.block_prefix", &self.identifiers.block_prefix),
            ("identifiers.from_prefix", &self.identifiers.from_prefix),
        ] {
            if !is_simple_identifier(prefix) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "{field} must be a non-empty identifier (letters, digits, '_'), found '{prefix}'"
                    ),
                });
            }
        }

        // Aliases are the prefix plus a number, compared case-insensitively
        let block_prefix = self.identifiers.block_prefix.to_ascii_lowercase();
        let from_prefix = self.identifiers.from_prefix.to_ascii_lowercase();
        if block_prefix.starts_with(&from_prefix) || from_prefix.starts_with(&block_prefix) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "identifiers.block_prefix '{}' and identifiers.from_prefix '{}' must differ and neither may start with the other",
                    self.identifiers.block_prefix, self.identifiers.from_prefix
                ),
            });
        }

        if let Some(empty) = self.identifiers.reserved.iter().position(|r| r.is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: format!("identifiers.reserved[{empty}] is empty"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
