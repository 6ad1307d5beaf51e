//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rectree/rectree.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `RECTREE_<SECTION>__<KEY>`
//!    (e.g. `RECTREE_SERIALIZE__KEY_CHILDREN=child`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::builder::LinkOptions;
use crate::display::Label;
use crate::errors::{TreeError, TreeResult};
use crate::serialize::SerializeOptions;

/// Label field value that renders the whole record.
pub const WHOLE_RECORD: &str = "*";

/// Pretty-printer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplaySettings {
    /// Record field shown per node; `*` shows the whole record
    pub label_field: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            label_field: "id".into(),
        }
    }
}

impl DisplaySettings {
    pub fn label(&self) -> Label {
        if self.label_field == WHOLE_RECORD {
            Label::Record
        } else {
            Label::Field(self.label_field.clone())
        }
    }
}

/// Unified configuration for rectree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Shape of JSON output
    pub serialize: SerializeOptions,
    /// Field names linking input records
    pub link: LinkOptions,
    /// Tree rendering
    pub display: DisplaySettings,
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub serialize: RawSerialize,
    pub link: RawLink,
    pub display: RawDisplay,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSerialize {
    pub key_children: Option<String>,
    pub empty_children: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLink {
    pub key_id: Option<String>,
    pub key_parent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplay {
    pub label_field: Option<String>,
}

/// Get the XDG config directory for rectree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rectree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rectree.toml"))
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config {
        message: e.to_string(),
    }
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> TreeResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| TreeError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| TreeError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay values win where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            serialize: SerializeOptions {
                key_children: overlay
                    .serialize
                    .key_children
                    .clone()
                    .unwrap_or_else(|| self.serialize.key_children.clone()),
                empty_children: overlay
                    .serialize
                    .empty_children
                    .unwrap_or(self.serialize.empty_children),
            },
            link: LinkOptions {
                key_id: overlay
                    .link
                    .key_id
                    .clone()
                    .unwrap_or_else(|| self.link.key_id.clone()),
                key_parent: overlay
                    .link
                    .key_parent
                    .clone()
                    .unwrap_or_else(|| self.link.key_parent.clone()),
            },
            display: DisplaySettings {
                label_field: overlay
                    .display
                    .label_field
                    .clone()
                    .unwrap_or_else(|| self.display.label_field.clone()),
            },
        }
    }

    /// Load settings with layered precedence, using the XDG global config.
    pub fn load(local: Option<&Path>) -> TreeResult<Self> {
        Self::load_from(global_config_path().as_deref(), local)
    }

    /// Load settings from explicit global/local files (missing global is skipped).
    ///
    /// A local file that was asked for but does not exist is an error.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> TreeResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(local_path) = local {
            let raw = load_raw_settings(local_path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        Self::apply_env_overrides(current)
    }

    /// Apply RECTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> TreeResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RECTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("serialize.key_children") {
            settings.serialize.key_children = val;
        }
        if let Ok(val) = config.get_bool("serialize.empty_children") {
            settings.serialize.empty_children = val;
        }
        if let Ok(val) = config.get_string("link.key_id") {
            settings.link.key_id = val;
        }
        if let Ok(val) = config.get_string("link.key_parent") {
            settings.link.key_parent = val;
        }
        if let Ok(val) = config.get_string("display.label_field") {
            settings.display.label_field = val;
        }

        Ok(settings)
    }

    /// Render effective settings as TOML.
    pub fn to_toml(&self) -> TreeResult<String> {
        toml::to_string_pretty(self).map_err(|e| TreeError::Config {
            message: e.to_string(),
        })
    }
}
