//! Quests Loader
//!
//! One load cycle: walk the quest directory, validate each file, build the
//! valid ones into a fresh [`QuestGraph`] and check requirements across
//! files. The result is the graph plus every problem found, keyed by file.

pub mod builder;
pub mod categories;
pub mod resolver;
pub mod validator;
pub mod walker;

use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub use builder::GraphBuilder;
pub use categories::{CATEGORIES_FILE, CategorySource, build_categories};
pub use resolver::resolve_requirements;
pub use validator::{QuestValidator, ResolvedTask, Validation};
pub use walker::{
    CONFIG_EXTENSION, DiscoveredFile, FileOutcome, QuestParsingResult, discover_files, load_file,
};

use crate::policy::ControllerPolicies;
use crate::problem::{ConfigProblem, ProblemMap};
use crate::quest::QuestGraph;
use crate::settings::Settings;
use crate::task_type::TaskTypeRegistry;

/// What one load cycle produced
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub graph: QuestGraph,
    /// Quest file problems, keyed by path relative to the quest root. Files
    /// without problems are absent.
    pub problems: ProblemMap,
    /// Problems in the settings or categories file, keyed by file name
    pub settings_problems: ProblemMap,
}

impl LoadOutcome {
    pub fn error_count(&self) -> usize {
        self.all_problems().filter(|p| p.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.all_problems().filter(|p| !p.is_error()).count()
    }

    fn all_problems(&self) -> impl Iterator<Item = &ConfigProblem> {
        self.problems
            .values()
            .chain(self.settings_problems.values())
            .flatten()
    }
}

pub struct QuestsLoader<'a> {
    settings: &'a Settings,
    task_types: &'a dyn TaskTypeRegistry,
    policies: &'a ControllerPolicies,
}

impl<'a> QuestsLoader<'a> {
    pub fn new(
        settings: &'a Settings,
        task_types: &'a dyn TaskTypeRegistry,
        policies: &'a ControllerPolicies,
    ) -> Self {
        Self {
            settings,
            task_types,
            policies,
        }
    }

    /// Walk `root` with a fresh macro snapshot
    pub fn parse_quest_files(&self, root: &Path) -> QuestParsingResult {
        walker::parse_quest_files(root, &self.settings.macro_snapshot())
    }

    /// Validate and build parsed quest files in discovery order
    pub fn apply_parsed_quests(
        &self,
        parsed: QuestParsingResult,
        categories: &CategorySource,
    ) -> LoadOutcome {
        let mut problems = parsed.problems;
        let mut settings_problems = ProblemMap::new();
        let mut graph = QuestGraph::new();
        build_categories(categories, &mut graph, &mut settings_problems);

        let validator = QuestValidator::new(self.task_types);
        let builder = GraphBuilder::new(
            self.settings,
            self.policies.for_controller(self.settings.controller()),
        );

        // quest id -> built file that owns it
        let mut claimed: HashMap<String, String> = HashMap::new();
        let mut built = Vec::new();

        for document in &parsed.quest_files {
            let relative_path = document.relative_path().to_string();
            let validation = validator.validate(document);
            let valid = validation.is_valid();
            let mut file_problems = validation.problems;

            if let Some(first) = claimed.get(document.id()) {
                file_problems.push(ConfigProblem::duplicate_quest_id(document.id(), first));
            } else if valid {
                claimed.insert(document.id().to_string(), relative_path.clone());
                let quest = builder.build_quest(
                    document,
                    validation.tasks,
                    &validation.displays,
                    &mut graph,
                    &mut file_problems,
                );
                built.push((relative_path.clone(), quest));
            }

            if !file_problems.is_empty() {
                problems.entry(relative_path).or_default().extend(file_problems);
            }
        }

        info!("{} quests have been registered.", graph.quest_count());

        resolve_requirements(&built, &graph, &mut problems);
        problems.retain(|_, found| !found.is_empty());

        LoadOutcome {
            graph,
            problems,
            settings_problems,
        }
    }

    pub fn load_quests(&self, root: &Path, categories: &CategorySource) -> LoadOutcome {
        let parsed = self.parse_quest_files(root);
        self.apply_parsed_quests(parsed, categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ProblemKind, ProblemSeverity};
    use crate::settings::SETTINGS_FILE;
    use crate::task_type::TaskTypeManager;
    use std::fs;
    use tempfile::TempDir;

    const SETTINGS: &str = r#"
[global-macros]
ARENA = "pvp"

[task-types.blockbreak]
aliases = ["mining"]
required = ["amount"]
integer = ["amount"]

[task-types.walking]

[categories.mining]
gui-name = "Mining"
"#;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn load(settings: &str, root: &Path) -> LoadOutcome {
        let settings = Settings::from_toml(settings).unwrap();
        let task_types = TaskTypeManager::from_settings(&settings);
        let policies = ControllerPolicies::with_defaults();
        let categories = CategorySource::new(
            SETTINGS_FILE,
            settings.categories.clone().unwrap_or_default(),
        );
        QuestsLoader::new(&settings, &task_types, &policies).load_quests(root, &categories)
    }

    fn kinds(outcome: &LoadOutcome, path: &str) -> Vec<(ProblemSeverity, ProblemKind)> {
        outcome.problems[path]
            .iter()
            .map(|p| (p.severity, p.kind))
            .collect()
    }

    #[test]
    fn test_clean_load() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "mining/miner.toml",
            r#"
[tasks.stone]
type = "mining"
amount = 10

[display]
name = "<$m ARENA $> miner"
type = "iron_pickaxe"
lore-normal = ["{stone:goal} stone"]

[options]
category = "mining"
"#,
        );

        let outcome = load(SETTINGS, temp_dir.path());
        assert!(outcome.problems.is_empty());
        assert_eq!(outcome.graph.quest_count(), 1);

        let quest = outcome.graph.quest("miner").unwrap();
        assert_eq!(quest.category.as_deref(), Some("mining"));
        assert_eq!(quest.tasks[0].type_name, "blockbreak");
        assert_eq!(
            outcome.graph.displays().quest("miner").unwrap().normal.name,
            "pvp miner"
        );
        assert_eq!(outcome.graph.category("mining").unwrap().quest_ids(), ["miner"]);
        assert_eq!(outcome.graph.task_bindings().tasks_of_type("blockbreak").len(), 1);
    }

    #[test]
    fn test_invalid_id_is_not_registered() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "quest-1.toml", "[tasks.walk]\ntype = \"walking\"\n");

        let outcome = load(SETTINGS, temp_dir.path());
        assert_eq!(
            kinds(&outcome, "quest-1.toml"),
            vec![(ProblemSeverity::Error, ProblemKind::InvalidQuestId)]
        );
        assert_eq!(outcome.graph.quest_count(), 0);
        assert_eq!(outcome.error_count(), 1);
    }

    #[test]
    fn test_only_unknown_task_types() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "fisher.toml",
            "[tasks.a]\ntype = \"fishing\"\n\n[tasks.b]\ntype = \"swimming\"\n",
        );

        let outcome = load(SETTINGS, temp_dir.path());
        let found = kinds(&outcome, "fisher.toml");
        let errors: Vec<_> = found
            .iter()
            .filter(|(severity, _)| *severity == ProblemSeverity::Error)
            .collect();
        assert_eq!(errors, vec![&(ProblemSeverity::Error, ProblemKind::NoTasks)]);
        let unknown = found
            .iter()
            .filter(|(_, kind)| *kind == ProblemKind::UnknownTaskType)
            .count();
        assert_eq!(unknown, 2);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_requirement_on_invalid_quest_regardless_of_order() {
        for (requiring, required) in [("aaa.toml", "zzz.toml"), ("zzz.toml", "aaa.toml")] {
            let temp_dir = TempDir::new().unwrap();
            let required_id = required.trim_end_matches(".toml");
            write(
                temp_dir.path(),
                requiring,
                &format!(
                    "[tasks.walk]\ntype = \"walking\"\n\n[options]\nrequires = [\"{}\"]\n",
                    required_id
                ),
            );
            // fails validation: no tasks section
            write(temp_dir.path(), required, "[options]\nrepeatable = true\n");

            let outcome = load(SETTINGS, temp_dir.path());
            assert_eq!(
                kinds(&outcome, requiring),
                vec![(ProblemSeverity::Warning, ProblemKind::UnknownRequirement)]
            );
            assert_eq!(outcome.graph.quest_count(), 1);
        }
    }

    #[test]
    fn test_forward_requirement_resolves() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "aaa.toml",
            "[tasks.walk]\ntype = \"walking\"\n\n[options]\nrequires = [\"zzz\"]\n",
        );
        write(temp_dir.path(), "zzz.toml", "[tasks.walk]\ntype = \"walking\"\n");

        let outcome = load(SETTINGS, temp_dir.path());
        assert!(outcome.problems.is_empty());
        assert_eq!(outcome.graph.quest_count(), 2);
    }

    #[test]
    fn test_unknown_category_still_registers() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "farm.toml",
            "[tasks.walk]\ntype = \"walking\"\n\n[options]\ncategory = \"farming\"\n",
        );

        let outcome = load(SETTINGS, temp_dir.path());
        let problems = &outcome.problems["farm.toml"];
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].kind, ProblemKind::UnknownCategory);
        assert_eq!(problems[0].location, "options.category");
        assert!(outcome.graph.contains_quest("farm"));
    }

    #[test]
    fn test_validator_errors_block_registration() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "miner.toml",
            "[tasks.stone]\ntype = \"blockbreak\"\namount = \"lots\"\n",
        );

        let outcome = load(SETTINGS, temp_dir.path());
        assert_eq!(
            kinds(&outcome, "miner.toml"),
            vec![(ProblemSeverity::Error, ProblemKind::TaskInvalidValue)]
        );
        assert_eq!(outcome.problems["miner.toml"][0].location, "tasks.stone.amount");
        assert!(!outcome.graph.contains_quest("miner"));
    }

    #[test]
    fn test_duplicate_ids() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a/walker.toml", "[tasks.walk]\ntype = \"walking\"\n");
        write(temp_dir.path(), "b/walker.toml", "[tasks.run]\ntype = \"walking\"\n");

        let outcome = load(SETTINGS, temp_dir.path());
        assert!(!outcome.problems.contains_key("a/walker.toml"));
        assert_eq!(
            kinds(&outcome, "b/walker.toml"),
            vec![(ProblemSeverity::Error, ProblemKind::DuplicateQuestId)]
        );
        assert!(outcome.graph.quest("walker").unwrap().has_task("walk"));
    }

    #[test]
    fn test_invalid_file_does_not_claim_id() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a/walker.toml", "[options]\nrepeatable = true\n");
        write(temp_dir.path(), "b/walker.toml", "[tasks.run]\ntype = \"walking\"\n");

        let outcome = load(SETTINGS, temp_dir.path());
        assert_eq!(
            kinds(&outcome, "a/walker.toml"),
            vec![(ProblemSeverity::Error, ProblemKind::NoTasks)]
        );
        assert!(!outcome.problems.contains_key("b/walker.toml"));
        assert!(outcome.graph.quest("walker").unwrap().has_task("run"));
    }

    #[test]
    fn test_malformed_file_does_not_stop_batch() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "broken.toml", "[tasks.walk\ntype = ");
        write(temp_dir.path(), "walker.toml", "[tasks.walk]\ntype = \"walking\"\n");
        write(temp_dir.path(), "readme.md", "not a quest");

        let outcome = load(SETTINGS, temp_dir.path());
        assert_eq!(
            kinds(&outcome, "broken.toml"),
            vec![(ProblemSeverity::Error, ProblemKind::MalformedDocument)]
        );
        assert_eq!(outcome.problems.len(), 1);
        assert!(outcome.graph.contains_quest("walker"));
    }

    #[test]
    fn test_daily_controller() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "intro.toml", "[tasks.walk]\ntype = \"walking\"\n");
        write(
            temp_dir.path(),
            "daily.toml",
            "[tasks.walk]\ntype = \"walking\"\n\n[options]\nrequires = [\"missing\"]\n",
        );

        let settings = format!("{}\n[options]\nquest-controller = \"daily\"\n", SETTINGS);
        let outcome = load(&settings, temp_dir.path());
        // requirements were cleared before the cross-file pass
        assert!(outcome.problems.is_empty());
        let quest = outcome.graph.quest("daily").unwrap();
        assert!(quest.options.repeatable);
        assert_eq!(quest.options.cooldown_time, 0);
    }

    #[test]
    fn test_repeated_loads_are_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "one.toml",
            concat!(
                "[tasks.walk]\ntype = \"walking\"\n\n",
                "[options]\nrequires = [\"ghost\"]\ncategory = \"x\"\n",
            ),
        );
        write(temp_dir.path(), "two/two.toml", "[tasks]\nbad = 1\n");
        write(temp_dir.path(), "three.toml", "[tasks.walk]\ntype = \"walking\"\n");

        let first = load(SETTINGS, temp_dir.path());
        let second = load(SETTINGS, temp_dir.path());
        assert_eq!(first.problems, second.problems);
        assert_eq!(first.graph, second.graph);
    }

    #[test]
    fn test_category_problems_kept_apart() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "config.toml",
            "[tasks.walk]\ntype = \"walking\"\n\n[options]\ncategory = \"nope\"\n",
        );
        let settings = format!("{}\n[categories.bad-id]\n", SETTINGS);

        let outcome = load(&settings, temp_dir.path());
        assert_eq!(
            kinds(&outcome, "config.toml"),
            vec![(ProblemSeverity::Warning, ProblemKind::UnknownCategory)]
        );
        assert_eq!(
            outcome.settings_problems[SETTINGS_FILE][0].kind,
            ProblemKind::InvalidCategoryId
        );
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.warning_count(), 1);
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = load(SETTINGS, &temp_dir.path().join("quests"));
        assert!(outcome.problems.is_empty());
        assert_eq!(outcome.graph.quest_count(), 0);
        assert_eq!(outcome.graph.categories().len(), 1);
    }
}
