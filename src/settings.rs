//! Settings
//!
//! Plugin-wide configuration read from `config.toml` in the data directory:
//! macros, global task defaults, embedded categories, declarative task types
//! and the set of active item integrations.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use toml::Table;
use tracing::warn;

use crate::error::SettingsError;
use crate::macros::MacroMap;

pub const SETTINGS_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    pub options: SettingsOptions,
    /// Source of the macro snapshot
    pub global_macros: Option<Table>,
    pub global_task_configuration: GlobalTaskConfiguration,
    /// Embedded categories; take precedence over `categories.toml`
    pub categories: Option<Table>,
    /// Task types declared in configuration rather than registered in code
    pub task_types: BTreeMap<String, TaskTypeSpec>,
    /// Names of the external item systems that are installed
    pub integrations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SettingsOptions {
    /// Identity of the active quest controller (selects a controller policy)
    pub quest_controller: String,
    /// When set, a task's own value wins over the global default for that key
    pub global_task_configuration_override: bool,
}

impl Default for SettingsOptions {
    fn default() -> Self {
        Self {
            quest_controller: "normal".to_string(),
            global_task_configuration_override: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlobalTaskConfiguration {
    /// Per-type default key/values
    pub types: BTreeMap<String, Table>,
}

/// A task type described in configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TaskTypeSpec {
    pub aliases: Vec<String>,
    /// Keys every task of this type must set
    pub required: Vec<String>,
    /// Keys that must be integers when present
    pub integer: Vec<String>,
    /// Keys that must be booleans when present
    pub boolean: Vec<String>,
}

impl Settings {
    /// Load settings from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            warn!("Settings file does not exist: {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Snapshot the global macros for one load cycle
    pub fn macro_snapshot(&self) -> MacroMap {
        MacroMap::from_section(self.global_macros.as_ref())
    }

    /// Global defaults for a task, looked up by canonical type name first and
    /// then by the spelling used in the quest file.
    pub fn global_task_defaults(&self, type_name: &str, declared: &str) -> Option<&Table> {
        let types = &self.global_task_configuration.types;
        types.get(type_name).or_else(|| types.get(declared))
    }

    pub fn controller(&self) -> &str {
        &self.options.quest_controller
    }
}
