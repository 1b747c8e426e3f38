//! Task Types
//!
//! A task type knows how to validate and track one kind of task. The loader
//! only needs name resolution and config validation; progress tracking lives
//! with the host.

pub mod validators;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::warn;

use crate::problem::ConfigProblem;
use crate::quest::{Quest, TaskConfig};
use crate::settings::{Settings, TaskTypeSpec};

/// Checks one task's raw configuration, pushing any problems found.
/// Locations are relative to the task.
pub type TaskConfigValidator = Box<dyn Fn(&TaskConfig, &mut Vec<ConfigProblem>) + Send + Sync>;

/// The external capability consulted while validating quest files
pub trait TaskTypeRegistry: Send + Sync {
    /// Resolve a user-typed name or alias to the canonical type name
    fn resolve_task_type_name(&self, declared: &str) -> Option<&str>;

    /// Validators for a canonical type name
    fn config_validators(&self, type_name: &str) -> &[TaskConfigValidator];
}

pub struct TaskType {
    name: String,
    aliases: Vec<String>,
    validators: Vec<TaskConfigValidator>,
}

impl TaskType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            validators: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_validator(mut self, validator: TaskConfigValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Build a type from its declaration in the settings file
    pub fn from_spec(name: &str, spec: &TaskTypeSpec) -> Self {
        let mut task_type = Self::new(name);
        for alias in &spec.aliases {
            task_type = task_type.with_alias(alias.clone());
        }
        for key in &spec.required {
            task_type = task_type.with_validator(validators::required(key, name));
        }
        for key in &spec.integer {
            task_type = task_type.with_validator(validators::integer(key));
        }
        for key in &spec.boolean {
            task_type = task_type.with_validator(validators::boolean(key));
        }
        task_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn validators(&self) -> &[TaskConfigValidator] {
        &self.validators
    }
}

impl fmt::Debug for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskType")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Registered task types, resolvable case-insensitively by name or alias
#[derive(Debug, Default)]
pub struct TaskTypeManager {
    types: Vec<TaskType>,
    /// Lowercased name or alias -> index into `types`
    lookup: HashMap<String, usize>,
}

impl TaskTypeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// All task types declared under `[task-types]`
    pub fn from_settings(settings: &Settings) -> Self {
        let mut manager = Self::new();
        for (name, spec) in &settings.task_types {
            manager.register(TaskType::from_spec(name, spec));
        }
        manager
    }

    /// Register a task type. Rejected if its name or an alias is taken.
    pub fn register(&mut self, task_type: TaskType) -> bool {
        let keys: Vec<String> = std::iter::once(&task_type.name)
            .chain(task_type.aliases.iter())
            .map(|k| k.to_lowercase())
            .collect();

        if let Some(taken) = keys.iter().find(|k| self.lookup.contains_key(*k)) {
            warn!(
                "Task type '{}' not registered: '{}' is already in use",
                task_type.name, taken
            );
            return false;
        }

        let index = self.types.len();
        for key in keys {
            self.lookup.insert(key, index);
        }
        self.types.push(task_type);
        true
    }

    pub fn get(&self, name: &str) -> Option<&TaskType> {
        self.lookup
            .get(&name.to_lowercase())
            .map(|&index| &self.types[index])
    }

    pub fn types(&self) -> impl Iterator<Item = &TaskType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TaskTypeRegistry for TaskTypeManager {
    fn resolve_task_type_name(&self, declared: &str) -> Option<&str> {
        self.get(declared).map(TaskType::name)
    }

    fn config_validators(&self, type_name: &str) -> &[TaskConfigValidator] {
        self.get(type_name).map(TaskType::validators).unwrap_or(&[])
    }
}

/// One task of one quest, as bound to its task type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBinding {
    pub quest_id: String,
    pub task_id: String,
}

/// Which quest tasks each task type has to track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBindings {
    by_type: BTreeMap<String, Vec<TaskBinding>>,
}

impl TaskBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_quest_tasks(&mut self, quest: &Quest) {
        for task in &quest.tasks {
            self.by_type
                .entry(task.type_name.clone())
                .or_default()
                .push(TaskBinding {
                    quest_id: quest.id.clone(),
                    task_id: task.id.clone(),
                });
        }
    }

    pub fn tasks_of_type(&self, type_name: &str) -> &[TaskBinding] {
        self.by_type.get(type_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Type names with at least one bound task
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }
}
