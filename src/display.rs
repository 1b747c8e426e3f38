//! Display Items
//!
//! How quests and categories are presented in menus. Only the configuration
//! is stored here; turning it into something on screen is the host's job.

use serde::Serialize;
use std::collections::BTreeMap;
use toml::{Table, Value};

use crate::document::{lookup, scalar_to_string, string_list};
use crate::problem::ConfigProblem;

/// The menu states a quest can be displayed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    Normal,
    Locked,
    Completed,
    Cooldown,
    Permission,
}

impl DisplayState {
    pub const ALL: [DisplayState; 5] = [
        DisplayState::Normal,
        DisplayState::Locked,
        DisplayState::Completed,
        DisplayState::Cooldown,
        DisplayState::Permission,
    ];

    /// Where the state's display section lives in a quest file
    pub fn config_path(&self) -> &'static str {
        match self {
            DisplayState::Normal => "display",
            DisplayState::Locked => "options.locked-display",
            DisplayState::Completed => "options.completed-display",
            DisplayState::Cooldown => "options.cooldown-display",
            DisplayState::Permission => "options.permission-display",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    pub name: String,
    /// Item kind the host should render (material, model, ...)
    pub item_type: Option<String>,
    pub lore_normal: Vec<String>,
    pub lore_started: Vec<String>,
}

impl DisplayItem {
    /// Read a display section, using `default_name` when no name is set
    pub fn from_section(section: &Table, default_name: &str) -> Self {
        Self {
            name: section
                .get("name")
                .and_then(scalar_to_string)
                .unwrap_or_else(|| default_name.to_string()),
            item_type: section.get("type").and_then(scalar_to_string),
            lore_normal: section.get("lore-normal").map(string_list).unwrap_or_default(),
            lore_started: section.get("lore-started").map(string_list).unwrap_or_default(),
        }
    }

    /// Read the display at `path` of `root`, or a named blank if absent
    pub fn from_path(root: &Table, path: &str, default_name: &str) -> Self {
        match lookup(root, path).and_then(Value::as_table) {
            Some(section) => Self::from_section(section, default_name),
            None => Self {
                name: default_name.to_string(),
                ..Self::default()
            },
        }
    }
}

/// Check a display section. Returns false when it cannot be used at all.
/// Every problem raised here is a warning.
pub fn validate_display(value: &Value, location: &str, problems: &mut Vec<ConfigProblem>) -> bool {
    let Some(section) = value.as_table() else {
        problems.push(ConfigProblem::malformed_display(location, "expected a section"));
        return false;
    };

    if let Some(name) = section.get("name") {
        if !name.is_str() {
            problems.push(ConfigProblem::malformed_display(
                &format!("{}.name", location),
                "name must be text",
            ));
        }
    }

    if section.get("type").and_then(scalar_to_string).is_none() {
        problems.push(ConfigProblem::malformed_display(
            &format!("{}.type", location),
            "no item type set, a default will be used",
        ));
    }

    for key in ["lore-normal", "lore-started"] {
        if let Some(lore) = section.get(key) {
            if !lore.is_array() {
                problems.push(ConfigProblem::malformed_display(
                    &format!("{}.{}", location, key),
                    "lore must be a list of lines",
                ));
            }
        }
    }

    true
}

/// Display items for every state configured on one quest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestDisplays {
    pub normal: DisplayItem,
    pub locked: Option<DisplayItem>,
    pub completed: Option<DisplayItem>,
    pub cooldown: Option<DisplayItem>,
    pub permission: Option<DisplayItem>,
}

impl QuestDisplays {
    pub fn new(normal: DisplayItem) -> Self {
        Self {
            normal,
            ..Self::default()
        }
    }

    pub fn get(&self, state: DisplayState) -> Option<&DisplayItem> {
        match state {
            DisplayState::Normal => Some(&self.normal),
            DisplayState::Locked => self.locked.as_ref(),
            DisplayState::Completed => self.completed.as_ref(),
            DisplayState::Cooldown => self.cooldown.as_ref(),
            DisplayState::Permission => self.permission.as_ref(),
        }
    }

    pub fn set(&mut self, state: DisplayState, item: DisplayItem) {
        match state {
            DisplayState::Normal => self.normal = item,
            DisplayState::Locked => self.locked = Some(item),
            DisplayState::Completed => self.completed = Some(item),
            DisplayState::Cooldown => self.cooldown = Some(item),
            DisplayState::Permission => self.permission = Some(item),
        }
    }
}

/// Display bindings for quests and categories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayRegistry {
    quests: BTreeMap<String, QuestDisplays>,
    categories: BTreeMap<String, DisplayItem>,
}

impl DisplayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_quest(&mut self, quest_id: &str, displays: QuestDisplays) {
        self.quests.insert(quest_id.to_string(), displays);
    }

    pub fn register_category(&mut self, category_id: &str, item: DisplayItem) {
        self.categories.insert(category_id.to_string(), item);
    }

    pub fn quest(&self, quest_id: &str) -> Option<&QuestDisplays> {
        self.quests.get(quest_id)
    }

    pub fn quest_state(&self, quest_id: &str, state: DisplayState) -> Option<&DisplayItem> {
        self.quests.get(quest_id).and_then(|d| d.get(state))
    }

    pub fn category(&self, category_id: &str) -> Option<&DisplayItem> {
        self.categories.get(category_id)
    }
}
