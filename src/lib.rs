//! Quest definition loading.
//!
//! Reads a data directory of TOML quest, category and item definitions,
//! validates them and publishes the result as an immutable graph, reporting
//! every problem found per file instead of failing the batch.

pub mod data;
pub mod display;
pub mod document;
pub mod error;
pub mod loader;
pub mod macros;
pub mod policy;
pub mod problem;
pub mod quest;
pub mod service;
pub mod settings;
pub mod task_type;
pub mod watcher;

pub use data::{QuestItem, QuestItemRegistry};
pub use error::{SettingsError, WatchError};
pub use loader::{LoadOutcome, QuestsLoader};
pub use problem::{ConfigProblem, ProblemKind, ProblemMap, ProblemSeverity};
pub use quest::{Category, Quest, QuestGraph, QuestRegistry, Task};
pub use service::{Questbook, ReloadReport};
pub use settings::Settings;
pub use watcher::{ReloadEvent, start_file_watcher};
