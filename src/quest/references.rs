//! Inline task references such as `{mining:progress}` embedded in display
//! lore and placeholder text.

use regex::Regex;
use std::sync::LazyLock;

use super::definition::Quest;
use crate::problem::ConfigProblem;

static TASK_REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^{}:\s]+):(progress|goal|complete|id)\}").expect("valid regex")
});

/// Refers to the task owning a progress placeholder
pub const SELF_REFERENCE: &str = "this";

/// Task IDs referenced by `text`, in order of appearance
pub fn referenced_task_ids(text: &str) -> impl Iterator<Item = &str> {
    TASK_REFERENCE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Warn about every reference in `text` that does not name a task of `quest`.
/// `allow_self` accepts [`SELF_REFERENCE`] (progress placeholders only).
pub fn find_invalid_task_references(
    quest: &Quest,
    text: &str,
    location: &str,
    allow_self: bool,
    problems: &mut Vec<ConfigProblem>,
) {
    for task_id in referenced_task_ids(text) {
        if allow_self && task_id == SELF_REFERENCE {
            continue;
        }
        if quest.has_task(task_id) {
            continue;
        }
        problems.push(ConfigProblem::unknown_task_reference(task_id, location));
    }
}
