//! Quest System Module
//!
//! Quest and category entities, inline task references, and the registry
//! the loader publishes into.

pub mod definition;
pub mod references;
pub mod registry;

pub use definition::{Category, Quest, QuestOptions, QuestText, Task, TaskConfig};
pub use references::{SELF_REFERENCE, find_invalid_task_references, referenced_task_ids};
pub use registry::{QuestGraph, QuestRegistry};
