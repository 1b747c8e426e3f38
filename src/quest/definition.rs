//! Quest Definition Structures
//!
//! The domain entities built from validated quest files.

use serde::Serialize;
use std::collections::BTreeMap;
use toml::Value;

/// Raw per-task configuration: declared keys merged with global defaults
pub type TaskConfig = toml::Table;

// ============================================================================
// Tasks
// ============================================================================

/// A typed unit of progress within a quest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// Unique within its quest
    pub id: String,
    /// Canonical task type name (aliases already resolved)
    pub type_name: String,
    pub config: TaskConfig,
}

impl Task {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            config: TaskConfig::new(),
        }
    }

    pub fn add_config_value(&mut self, key: impl Into<String>, value: Value) {
        self.config.insert(key.into(), value);
    }

    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }
}

// ============================================================================
// Quest options
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestOptions {
    pub repeatable: bool,
    pub cooldown_enabled: bool,
    /// Minutes
    pub cooldown_time: i64,
    pub time_limit_enabled: bool,
    /// Minutes
    pub time_limit_time: i64,
    pub permission_required: bool,
    pub autostart: bool,
    pub cancellable: bool,
    pub counts_towards_limit: bool,
    pub counts_towards_completed: bool,
    pub hidden: bool,
    pub sort_order: i64,
}

impl Default for QuestOptions {
    fn default() -> Self {
        Self {
            repeatable: false,
            cooldown_enabled: false,
            cooldown_time: 10,
            time_limit_enabled: false,
            time_limit_time: 10,
            permission_required: false,
            autostart: false,
            cancellable: true,
            counts_towards_limit: true,
            counts_towards_completed: true,
            hidden: false,
            sort_order: 1,
        }
    }
}

/// Text lines shown or executed during the quest lifecycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestText {
    pub rewards: Vec<String>,
    pub reward_string: Vec<String>,
    pub start_string: Vec<String>,
    pub cancel_string: Vec<String>,
    pub expiry_string: Vec<String>,
    pub start_commands: Vec<String>,
    pub cancel_commands: Vec<String>,
    pub expiry_commands: Vec<String>,
}

// ============================================================================
// Quests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quest {
    pub id: String,
    /// Tasks in declaration order
    pub tasks: Vec<Task>,
    pub options: QuestOptions,
    pub text: QuestText,
    /// Economy reward handled by an external system
    pub vault_reward: Option<String>,
    /// IDs of quests that must be completed first
    pub requirements: Vec<String>,
    pub placeholders: BTreeMap<String, String>,
    pub progress_placeholders: BTreeMap<String, String>,
    /// Set only when the category exists
    pub category: Option<String>,
}

impl Quest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: Vec::new(),
            options: QuestOptions::default(),
            text: QuestText::default(),
            vault_reward: None,
            requirements: Vec::new(),
            placeholders: BTreeMap::new(),
            progress_placeholders: BTreeMap::new(),
            category: None,
        }
    }

    pub fn register_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Get task by ID
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn has_task(&self, id: &str) -> bool {
        self.task(id).is_some()
    }
}

// ============================================================================
// Categories
// ============================================================================

/// A named grouping of quests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: String,
    pub gui_name: Option<String>,
    pub permission_required: bool,
    pub hidden: bool,
    quest_ids: Vec<String>,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        gui_name: Option<String>,
        permission_required: bool,
        hidden: bool,
    ) -> Self {
        Self {
            id: id.into(),
            gui_name,
            permission_required,
            hidden,
            quest_ids: Vec::new(),
        }
    }

    /// Add a member quest, keeping first-registration order
    pub fn register_quest_id(&mut self, quest_id: &str) {
        if !self.quest_ids.iter().any(|id| id == quest_id) {
            self.quest_ids.push(quest_id.to_string());
        }
    }

    pub fn quest_ids(&self) -> &[String] {
        &self.quest_ids
    }
}
