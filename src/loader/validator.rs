//! Per-file validation of quest documents.
//!
//! Produces the file's problems and the tasks that resolved to a known type.
//! Cross-file checks (requirements) happen after every file is built.

use crate::display::{DisplayState, validate_display};
use crate::document::{ParsedDocument, is_alphanumeric, scalar_to_string};
use crate::problem::{ConfigProblem, has_errors};
use crate::quest::TaskConfig;
use crate::task_type::TaskTypeRegistry;

/// A task entry whose type resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTask {
    pub id: String,
    /// Canonical type name
    pub type_name: String,
    /// The type as written in the file (may be an alias)
    pub declared_type: String,
    pub config: TaskConfig,
}

#[derive(Debug, Default)]
pub struct Validation {
    pub problems: Vec<ConfigProblem>,
    pub tasks: Vec<ResolvedTask>,
    /// Display states whose section is present and usable
    pub displays: Vec<DisplayState>,
}

impl Validation {
    /// Valid iff no ERROR was raised
    pub fn is_valid(&self) -> bool {
        !has_errors(&self.problems)
    }
}

pub struct QuestValidator<'a> {
    task_types: &'a dyn TaskTypeRegistry,
}

impl<'a> QuestValidator<'a> {
    pub fn new(task_types: &'a dyn TaskTypeRegistry) -> Self {
        Self { task_types }
    }

    pub fn validate(&self, document: &ParsedDocument) -> Validation {
        let mut validation = Validation::default();
        let problems = &mut validation.problems;

        if !is_alphanumeric(document.id()) {
            problems.push(ConfigProblem::invalid_quest_id(document.id()));
        }

        match document.section("tasks") {
            None => problems.push(ConfigProblem::no_tasks()),
            Some(tasks) => {
                for (task_id, entry) in tasks {
                    let task_root = format!("tasks.{}", task_id);

                    let Some(section) = entry.as_table() else {
                        problems.push(ConfigProblem::task_not_section(task_id, &task_root));
                        continue;
                    };

                    let Some(declared_type) = section.get("type").and_then(scalar_to_string)
                    else {
                        problems.push(ConfigProblem::no_task_type(&task_root));
                        continue;
                    };

                    let Some(type_name) = self.task_types.resolve_task_type_name(&declared_type)
                    else {
                        problems.push(ConfigProblem::unknown_task_type(&declared_type, &task_root));
                        continue;
                    };

                    let config = section.clone();
                    let mut task_problems = Vec::new();
                    for validator in self.task_types.config_validators(type_name) {
                        validator(&config, &mut task_problems);
                    }
                    problems.extend(task_problems.into_iter().map(|p| p.relocated(&task_root)));

                    validation.tasks.push(ResolvedTask {
                        id: task_id.clone(),
                        type_name: type_name.to_string(),
                        declared_type,
                        config,
                    });
                }

                if validation.tasks.is_empty() {
                    problems.push(ConfigProblem::no_tasks());
                }
            }
        }

        for state in DisplayState::ALL {
            let path = state.config_path();
            if let Some(value) = document.get(path) {
                if validate_display(value, path, problems) {
                    validation.displays.push(state);
                }
            }
        }

        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ProblemKind, ProblemSeverity};
    use crate::task_type::{TaskType, TaskTypeManager, validators};

    fn task_types() -> TaskTypeManager {
        let mut manager = TaskTypeManager::new();
        manager.register(
            TaskType::new("blockbreak")
                .with_alias("mining")
                .with_validator(validators::required("amount", "blockbreak"))
                .with_validator(validators::integer("amount")),
        );
        manager.register(TaskType::new("walking"));
        manager
    }

    fn validate(id: &str, source: &str) -> Validation {
        let manager = task_types();
        let document = ParsedDocument::parse(id, format!("{}.toml", id), source).unwrap();
        QuestValidator::new(&manager).validate(&document)
    }

    fn kinds(validation: &Validation) -> Vec<(ProblemSeverity, ProblemKind)> {
        validation
            .problems
            .iter()
            .map(|p| (p.severity, p.kind))
            .collect()
    }

    #[test]
    fn test_valid_quest() {
        let validation = validate(
            "miner",
            r#"
[tasks.stone]
type = "mining"
amount = 10
"#,
        );
        assert!(validation.is_valid());
        assert!(validation.problems.is_empty());
        assert_eq!(validation.tasks.len(), 1);
        assert_eq!(validation.tasks[0].type_name, "blockbreak");
        assert_eq!(validation.tasks[0].declared_type, "mining");
    }

    #[test]
    fn test_invalid_id() {
        let validation = validate("quest-1", "[tasks.walk]\ntype = \"walking\"\n");
        assert!(!validation.is_valid());
        assert_eq!(
            kinds(&validation),
            vec![(ProblemSeverity::Error, ProblemKind::InvalidQuestId)]
        );
    }

    #[test]
    fn test_missing_tasks_section() {
        let validation = validate("empty", "[options]\nrepeatable = true\n");
        assert_eq!(
            kinds(&validation),
            vec![(ProblemSeverity::Error, ProblemKind::NoTasks)]
        );
        assert_eq!(validation.problems[0].location, "tasks");
    }

    #[test]
    fn test_only_unknown_types() {
        let validation = validate(
            "fisher",
            r#"
[tasks.a]
type = "fishing"

[tasks.b]
type = "farming"
"#,
        );
        assert!(!validation.is_valid());
        assert_eq!(
            kinds(&validation),
            vec![
                (ProblemSeverity::Warning, ProblemKind::UnknownTaskType),
                (ProblemSeverity::Warning, ProblemKind::UnknownTaskType),
                (ProblemSeverity::Error, ProblemKind::NoTasks),
            ]
        );
        let errors = validation.problems.iter().filter(|p| p.is_error()).count();
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_malformed_tasks_are_warnings() {
        let validation = validate(
            "mixed",
            r#"
[tasks]
broken = "walking"

[tasks.untyped]
amount = 3

[tasks.walk]
type = "walking"
"#,
        );
        assert!(validation.is_valid());
        assert_eq!(
            kinds(&validation),
            vec![
                (ProblemSeverity::Warning, ProblemKind::TaskNotSection),
                (ProblemSeverity::Warning, ProblemKind::NoTaskType),
            ]
        );
        assert_eq!(validation.problems[0].location, "tasks.broken");
        assert_eq!(validation.problems[1].location, "tasks.untyped");
        assert_eq!(validation.tasks.len(), 1);
    }

    #[test]
    fn test_validator_problems_are_relocated() {
        let validation = validate(
            "miner",
            r#"
[tasks.stone]
type = "blockbreak"
amount = "lots"

[tasks.ore]
type = "blockbreak"
"#,
        );
        let locations: Vec<_> = validation
            .problems
            .iter()
            .map(|p| p.location.as_str())
            .collect();
        assert_eq!(locations, vec!["tasks.stone.amount", "tasks.ore.amount"]);
        // validator errors fail the file, but the tasks still counted
        assert!(!validation.is_valid());
        assert_eq!(validation.tasks.len(), 2);
        assert!(
            !validation
                .problems
                .iter()
                .any(|p| p.kind == ProblemKind::NoTasks)
        );
    }

    #[test]
    fn test_display_sections_checked() {
        let validation = validate(
            "shown",
            r#"
[tasks.walk]
type = "walking"

[display]
name = "Walker"
type = "leather_boots"

[options]
locked-display = "barrier"
"#,
        );
        assert!(validation.is_valid());
        assert_eq!(
            kinds(&validation),
            vec![(ProblemSeverity::Warning, ProblemKind::MalformedDisplay)]
        );
        assert_eq!(validation.problems[0].location, "options.locked-display");
        assert_eq!(validation.displays, vec![DisplayState::Normal]);
    }

    #[test]
    fn test_warning_validator_keeps_task() {
        let mut manager = TaskTypeManager::new();
        manager.register(TaskType::new("fishing").with_validator(Box::new(
            |config: &TaskConfig, problems: &mut Vec<ConfigProblem>| {
                if !config.contains_key("rod") {
                    problems.push(ConfigProblem::new(
                        ProblemSeverity::Warning,
                        ProblemKind::TaskMissingField,
                        "No rod set, any rod counts",
                        "",
                        "rod",
                    ));
                }
            },
        )));
        let document =
            ParsedDocument::parse("angler", "angler.toml", "[tasks.cod]\ntype = \"fishing\"\n")
                .unwrap();

        let validation = QuestValidator::new(&manager).validate(&document);
        assert!(validation.is_valid());
        assert_eq!(validation.tasks.len(), 1);
        assert_eq!(validation.tasks[0].id, "cod");
        assert_eq!(
            kinds(&validation),
            vec![(ProblemSeverity::Warning, ProblemKind::TaskMissingField)]
        );
        assert_eq!(validation.problems[0].location, "tasks.cod.rod");
    }
}
