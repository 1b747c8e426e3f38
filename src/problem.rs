//! Configuration Problems
//!
//! Typed diagnostics collected while loading quest, category and settings
//! files. Problems are values: loading never fails, it reports.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Problems grouped by the relative path of the file that produced them.
/// Files without problems are absent from the map.
pub type ProblemMap = BTreeMap<String, Vec<ConfigProblem>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProblemSeverity {
    /// The owning quest/category is not promoted into the live registry
    Error,
    /// Recorded, but does not block registration
    Warning,
}

impl ProblemSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemSeverity::Error => "ERROR",
            ProblemSeverity::Warning => "WARNING",
        }
    }
}

/// What went wrong, independent of the human-readable text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemKind {
    MalformedDocument,
    InvalidQuestId,
    DuplicateQuestId,
    NoTasks,
    TaskNotSection,
    NoTaskType,
    UnknownTaskType,
    TaskMissingField,
    TaskInvalidValue,
    UnknownCategory,
    InvalidCategoryId,
    CategoryNotSection,
    UnknownRequirement,
    UnknownTaskReference,
    MalformedDisplay,
}

/// A single diagnostic with its location inside the owning document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigProblem {
    pub severity: ProblemSeverity,
    pub kind: ProblemKind,
    pub description: String,
    pub extended_description: String,
    /// Dotted path within the document; empty for whole-file problems
    pub location: String,
}

impl ConfigProblem {
    pub fn new(
        severity: ProblemSeverity,
        kind: ProblemKind,
        description: impl Into<String>,
        extended_description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            description: description.into(),
            extended_description: extended_description.into(),
            location: location.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == ProblemSeverity::Error
    }

    /// Re-anchor this problem under `prefix` (e.g. `tasks.mining`).
    pub fn relocated(mut self, prefix: &str) -> Self {
        self.location = if self.location.is_empty() {
            prefix.to_string()
        } else {
            format!("{}.{}", prefix, self.location)
        };
        self
    }

    // ------------------------------------------------------------------
    // File-level
    // ------------------------------------------------------------------

    pub fn malformed_document(detail: &str) -> Self {
        Self::new(
            ProblemSeverity::Error,
            ProblemKind::MalformedDocument,
            "Malformed TOML file, cannot read config",
            format!(
                "The file is not valid TOML and was skipped entirely. \
                 The parser reported: {}",
                detail.trim()
            ),
            "",
        )
    }

    pub fn invalid_quest_id(id: &str) -> Self {
        Self::new(
            ProblemSeverity::Error,
            ProblemKind::InvalidQuestId,
            format!("ID '{}' is invalid, must be alphanumeric, unique and with no spaces", id),
            format!(
                "Quest IDs are taken from the file name and must only contain letters and \
                 digits. Rename the file so that '{}' has no spaces, dashes or symbols.",
                id
            ),
            "",
        )
    }

    pub fn duplicate_quest_id(id: &str, first_path: &str) -> Self {
        Self::new(
            ProblemSeverity::Error,
            ProblemKind::DuplicateQuestId,
            format!("ID '{}' is already used by {}", id, first_path),
            format!(
                "Two quest files share the ID '{}'. Only the first one discovered ({}) is \
                 loaded; rename one of them.",
                id, first_path
            ),
            "",
        )
    }

    pub fn no_tasks() -> Self {
        Self::new(
            ProblemSeverity::Error,
            ProblemKind::NoTasks,
            "Quest contains no valid tasks",
            "Every quest needs a 'tasks' section with at least one task whose type is known.",
            "tasks",
        )
    }

    // ------------------------------------------------------------------
    // Task-level
    // ------------------------------------------------------------------

    pub fn task_not_section(task_id: &str, location: &str) -> Self {
        Self::new(
            ProblemSeverity::Warning,
            ProblemKind::TaskNotSection,
            format!("Task '{}' is not a section", task_id),
            format!(
                "Task '{}' must be a table of options (e.g. [tasks.{}]). \
                 This task will be ignored.",
                task_id, task_id
            ),
            location,
        )
    }

    pub fn no_task_type(location: &str) -> Self {
        Self::new(
            ProblemSeverity::Warning,
            ProblemKind::NoTaskType,
            "Task type not specified",
            "Every task needs a 'type' key naming its task type. This task will be ignored.",
            location,
        )
    }

    pub fn unknown_task_type(declared: &str, location: &str) -> Self {
        Self::new(
            ProblemSeverity::Warning,
            ProblemKind::UnknownTaskType,
            format!("Task type '{}' does not exist", declared),
            format!(
                "No task type or alias named '{}' is registered. The task will be ignored; \
                 check the spelling or whether the integration providing it is installed.",
                declared
            ),
            location,
        )
    }

    /// Raised by task validators; `key` is relative to the task.
    pub fn task_missing_field(key: &str, type_name: &str) -> Self {
        Self::new(
            ProblemSeverity::Error,
            ProblemKind::TaskMissingField,
            format!("Required field '{}' is missing for task type '{}'", key, type_name),
            format!("Tasks of type '{}' must set '{}'.", type_name, key),
            key,
        )
    }

    pub fn task_invalid_value(key: &str, expected: &str) -> Self {
        Self::new(
            ProblemSeverity::Error,
            ProblemKind::TaskInvalidValue,
            format!("Value of '{}' must be {}", key, expected),
            format!("The field '{}' is present but is not {}.", key, expected),
            key,
        )
    }

    // ------------------------------------------------------------------
    // Cross-references
    // ------------------------------------------------------------------

    pub fn unknown_category(category: &str, known: &[&str]) -> Self {
        let known = known.join(", ");
        Self::new(
            ProblemSeverity::Warning,
            ProblemKind::UnknownCategory,
            format!("Category '{}' does not exist", category),
            format!(
                "The quest is still loaded, but without a category. \
                 Known categories: {}",
                if known.is_empty() { "(none)" } else { known.as_str() }
            ),
            "options.category",
        )
    }

    pub fn invalid_category_id(id: &str) -> Self {
        Self::new(
            ProblemSeverity::Error,
            ProblemKind::InvalidCategoryId,
            format!("Category ID '{}' is invalid, must be alphanumeric", id),
            format!("Category '{}' was not registered.", id),
            format!("categories.{}", id),
        )
    }

    pub fn category_not_section(id: &str) -> Self {
        Self::new(
            ProblemSeverity::Warning,
            ProblemKind::CategoryNotSection,
            format!("Category '{}' is not a section", id),
            format!("Category '{}' must be a table of options and was ignored.", id),
            format!("categories.{}", id),
        )
    }

    pub fn unknown_requirement(requirement: &str) -> Self {
        Self::new(
            ProblemSeverity::Warning,
            ProblemKind::UnknownRequirement,
            format!("Quest requirement '{}' does not exist", requirement),
            format!(
                "No quest with ID '{}' was loaded. Players will never be able to start \
                 this quest.",
                requirement
            ),
            "options.requires",
        )
    }

    pub fn unknown_task_reference(task_id: &str, location: &str) -> Self {
        Self::new(
            ProblemSeverity::Warning,
            ProblemKind::UnknownTaskReference,
            format!("Attempt to reference unknown task '{}'", task_id),
            format!(
                "The text refers to task '{}', but this quest has no task with that ID. \
                 The placeholder will not be replaced.",
                task_id
            ),
            location,
        )
    }

    pub fn malformed_display(location: &str, detail: &str) -> Self {
        Self::new(
            ProblemSeverity::Warning,
            ProblemKind::MalformedDisplay,
            format!("Display item is malformed: {}", detail),
            "The display item could not be read as configured; defaults are used where \
             possible.",
            location,
        )
    }
}

impl fmt::Display for ConfigProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "[{}] {}", self.severity.as_str(), self.description)
        } else {
            write!(
                f,
                "[{}] {} ({})",
                self.severity.as_str(),
                self.description,
                self.location
            )
        }
    }
}

/// True when any problem in the slice is an ERROR
pub fn has_errors(problems: &[ConfigProblem]) -> bool {
    problems.iter().any(ConfigProblem::is_error)
}
