//! Cross-file requirement checks, run once every quest of the cycle exists.

use std::sync::Arc;

use crate::problem::{ConfigProblem, ProblemMap};
use crate::quest::{Quest, QuestGraph};

/// Warn, under each quest's own file, about requirements naming quests that
/// were never registered. Never removes a quest.
pub fn resolve_requirements(
    built: &[(String, Arc<Quest>)],
    graph: &QuestGraph,
    problems: &mut ProblemMap,
) {
    for (relative_path, quest) in built {
        let missing: Vec<_> = quest
            .requirements
            .iter()
            .filter(|requirement| !graph.contains_quest(requirement))
            .map(|requirement| ConfigProblem::unknown_requirement(requirement))
            .collect();

        if !missing.is_empty() {
            problems
                .entry(relative_path.clone())
                .or_default()
                .extend(missing);
        }
    }
}
