//! Questbook
//!
//! The host-facing entry point. Owns the collaborators a load cycle needs and
//! the two registries it publishes into. Reloads are serialized; each one
//! builds fresh structures and swaps them in.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::info;

use crate::data::{
    ActiveIntegrations, Capabilities, ItemFactories, QuestItemRegistry, load_quest_items,
};
use crate::error::SettingsError;
use crate::loader::{CategorySource, QuestsLoader};
use crate::policy::ControllerPolicies;
use crate::problem::{ProblemMap, has_errors};
use crate::quest::QuestRegistry;
use crate::settings::{SETTINGS_FILE, Settings};
use crate::task_type::{TaskTypeManager, TaskTypeRegistry};

pub const QUESTS_DIR: &str = "quests";
pub const ITEMS_DIR: &str = "items";

/// Summary of a reload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReloadReport {
    pub quests: usize,
    pub categories: usize,
    pub items: usize,
    /// Keyed by path relative to the quest directory
    pub problems: ProblemMap,
    /// Keyed by settings or categories file name
    pub settings_problems: ProblemMap,
}

impl ReloadReport {
    pub fn has_errors(&self) -> bool {
        self.problems
            .values()
            .chain(self.settings_problems.values())
            .any(|found| has_errors(found))
    }

    /// Number of files with at least one problem
    pub fn files_with_problems(&self) -> usize {
        self.problems.len() + self.settings_problems.len()
    }
}

pub struct Questbook {
    data_dir: PathBuf,
    settings: Settings,
    /// Problem map key for settings-level diagnostics
    settings_label: String,
    task_types: Box<dyn TaskTypeRegistry>,
    policies: ControllerPolicies,
    item_factories: ItemFactories,
    capabilities: Box<dyn Capabilities>,
    quests: QuestRegistry,
    items: QuestItemRegistry,
    reload_lock: Mutex<()>,
}

impl Questbook {
    /// A questbook with the built-in policies and item factories
    pub fn new(
        data_dir: impl Into<PathBuf>,
        settings: Settings,
        task_types: Box<dyn TaskTypeRegistry>,
        capabilities: Box<dyn Capabilities>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            settings,
            settings_label: SETTINGS_FILE.to_string(),
            task_types,
            policies: ControllerPolicies::with_defaults(),
            item_factories: ItemFactories::with_defaults(),
            capabilities,
            quests: QuestRegistry::new(),
            items: QuestItemRegistry::new(),
            reload_lock: Mutex::new(()),
        }
    }

    /// Read settings from `config` (default `<data_dir>/config.toml`) and use
    /// the task types and integrations declared there.
    pub fn open(
        data_dir: impl Into<PathBuf>,
        config: Option<&Path>,
    ) -> Result<Self, SettingsError> {
        let data_dir = data_dir.into();
        let config = config
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir.join(SETTINGS_FILE));

        let settings = Settings::load(&config)?;
        let task_types = TaskTypeManager::from_settings(&settings);
        let capabilities = ActiveIntegrations::from_settings(&settings);
        info!(
            "Loaded settings from {:?}: {} task types, controller '{}'",
            config,
            task_types.len(),
            settings.controller()
        );

        let mut book = Self::new(
            data_dir,
            settings,
            Box::new(task_types),
            Box::new(capabilities),
        );
        if let Some(name) = config.file_name().and_then(|name| name.to_str()) {
            book.settings_label = name.to_string();
        }
        Ok(book)
    }

    pub fn with_policies(mut self, policies: ControllerPolicies) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_item_factories(mut self, factories: ItemFactories) -> Self {
        self.item_factories = factories;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn quests_dir(&self) -> PathBuf {
        self.data_dir.join(QUESTS_DIR)
    }

    pub fn items_dir(&self) -> PathBuf {
        self.data_dir.join(ITEMS_DIR)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn quests(&self) -> &QuestRegistry {
        &self.quests
    }

    pub fn items(&self) -> &QuestItemRegistry {
        &self.items
    }

    /// Run a quest load cycle and publish its graph. Items are left as they
    /// are; the report counts the ones currently published.
    pub fn reload_quests(&self) -> ReloadReport {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = self.load_and_publish_quests();
        ReloadReport {
            items: self.items.len(),
            ..outcome
        }
    }

    /// Load and publish quest items; returns how many were registered
    pub fn reload_items(&self) -> usize {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_and_publish_items()
    }

    /// Reload quests and items as one step
    pub fn reload(&self) -> ReloadReport {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = self.load_and_publish_quests();
        let items = self.load_and_publish_items();

        ReloadReport { items, ..outcome }
    }

    /// Load and publish quests; the report's item count is left at zero
    fn load_and_publish_quests(&self) -> ReloadReport {
        let mut settings_problems = ProblemMap::new();
        let categories = CategorySource::resolve(
            &self.settings,
            &self.settings_label,
            &self.data_dir,
            &mut settings_problems,
        );

        let loader = QuestsLoader::new(&self.settings, self.task_types.as_ref(), &self.policies);
        let outcome = loader.load_quests(&self.quests_dir(), &categories);
        for (file, found) in outcome.settings_problems {
            settings_problems.entry(file).or_default().extend(found);
        }

        self.quests.publish(outcome.graph);
        let graph = self.quests.snapshot();
        ReloadReport {
            quests: graph.quest_count(),
            categories: graph.categories().len(),
            items: 0,
            problems: outcome.problems,
            settings_problems,
        }
    }

    fn load_and_publish_items(&self) -> usize {
        let items = load_quest_items(
            &self.items_dir(),
            &self.item_factories,
            self.capabilities.as_ref(),
        );
        let count = items.len();
        self.items.publish(items);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemKind;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn data_dir() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(
            root,
            SETTINGS_FILE,
            r#"
integrations = ["Oraxen"]

[task-types.walking]
"#,
        );
        write(root, "categories.toml", "[categories.travel]\ngui-name = \"Travel\"\n");
        write(
            root,
            "quests/travel/walker.toml",
            "[tasks.walk]\ntype = \"walking\"\n\n[options]\ncategory = \"travel\"\n",
        );
        write(root, "quests/broken.toml", "[tasks\n");
        write(root, "items/boots.toml", "type = \"oraxen\"\n\n[item]\nid = \"boots\"\n");
        write(root, "items/charm.toml", "type = \"nexo\"\n\n[item]\nid = \"charm\"\n");
        temp_dir
    }

    #[test]
    fn test_open_and_reload() {
        let temp_dir = data_dir();
        let book = Questbook::open(temp_dir.path(), None).unwrap();

        let report = book.reload();
        assert_eq!(report.quests, 1);
        assert_eq!(report.categories, 1);
        assert_eq!(report.items, 1);
        assert!(report.has_errors());
        assert_eq!(
            report.problems["broken.toml"][0].kind,
            ProblemKind::MalformedDocument
        );

        assert!(book.quests().get("walker").is_some());
        assert_eq!(book.quests().quests_in_category("travel").len(), 1);
        assert!(book.items().contains("boots"));
        assert!(!book.items().contains("charm"));
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let temp_dir = data_dir();
        let book = Questbook::open(temp_dir.path(), None).unwrap();
        book.reload_quests();
        let before = book.quests().snapshot();

        fs::remove_file(temp_dir.path().join("quests/broken.toml")).unwrap();
        write(temp_dir.path(), "quests/runner.toml", "[tasks.run]\ntype = \"walking\"\n");

        let report = book.reload_quests();
        assert!(report.problems.is_empty());
        assert_eq!(report.quests, 2);
        assert_eq!(book.quests().all_ids(), vec!["runner", "walker"]);
        assert_eq!(before.quest_count(), 1);
    }

    #[test]
    fn test_explicit_config_path() {
        let temp_dir = data_dir();
        let config = temp_dir.path().join("other.toml");
        fs::write(&config, "[options]\nquest-controller = \"daily\"\n").unwrap();

        let book = Questbook::open(temp_dir.path(), Some(&config)).unwrap();
        assert_eq!(book.settings().controller(), "daily");
        // no task types declared in this config
        let report = book.reload_quests();
        assert_eq!(book.quests().count(), 0);
        assert!(report.problems.contains_key("travel/walker.toml"));
    }

    #[test]
    fn test_category_file_problems_do_not_hide_quest_problems() {
        let temp_dir = data_dir();
        let root = temp_dir.path();
        write(root, "categories.toml", "[categories\n");
        write(
            root,
            "quests/categories.toml",
            "[tasks.walk]\ntype = \"walking\"\n\n[options]\ncategory = \"nope\"\n",
        );

        let book = Questbook::open(root, None).unwrap();
        let report = book.reload_quests();
        assert_eq!(
            report.settings_problems["categories.toml"][0].kind,
            ProblemKind::MalformedDocument
        );
        assert_eq!(
            report.problems["categories.toml"][0].kind,
            ProblemKind::UnknownCategory
        );
        assert!(book.quests().get("categories").is_some());
    }

    #[test]
    fn test_embedded_categories_labelled_by_settings_file() {
        let temp_dir = data_dir();
        let config = temp_dir.path().join("server.toml");
        fs::write(&config, "[task-types.walking]\n\n[categories.bad-id]\n").unwrap();

        let book = Questbook::open(temp_dir.path(), Some(&config)).unwrap();
        let report = book.reload_quests();
        assert_eq!(
            report.settings_problems["server.toml"][0].kind,
            ProblemKind::InvalidCategoryId
        );
        assert!(!report.settings_problems.contains_key(SETTINGS_FILE));
        assert!(report.has_errors());
    }

    #[test]
    fn test_malformed_settings() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), SETTINGS_FILE, "[options\n");
        assert!(Questbook::open(temp_dir.path(), None).is_err());
    }
}
