//! Graph building.
//!
//! Turns a validated quest document into a [`Quest`], links it to its
//! category, merges global task defaults, checks inline task references and
//! registers the quest with its displays.

use std::sync::Arc;
use tracing::debug;

use super::validator::ResolvedTask;
use crate::display::{DisplayItem, DisplayState, QuestDisplays};
use crate::document::{ParsedDocument, scalar_to_string};
use crate::policy::ControllerPolicy;
use crate::problem::ConfigProblem;
use crate::quest::{
    Quest, QuestGraph, QuestOptions, QuestText, Task, find_invalid_task_references,
};
use crate::settings::Settings;

const LORE_KEYS: [&str; 2] = ["display.lore-normal", "display.lore-started"];

pub struct GraphBuilder<'a> {
    settings: &'a Settings,
    policy: Option<&'a dyn ControllerPolicy>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(settings: &'a Settings, policy: Option<&'a dyn ControllerPolicy>) -> Self {
        Self { settings, policy }
    }

    /// Build and register the quest described by `document`. Only called for
    /// documents that passed validation; `tasks` are the ones that resolved and
    /// `usable_displays` the display states whose sections checked out.
    pub fn build_quest(
        &self,
        document: &ParsedDocument,
        tasks: Vec<ResolvedTask>,
        usable_displays: &[DisplayState],
        graph: &mut QuestGraph,
        problems: &mut Vec<ConfigProblem>,
    ) -> Arc<Quest> {
        let mut quest = read_quest(document);

        if let Some(policy) = self.policy {
            policy.apply(&mut quest);
        }

        if let Some(category_id) = quest.category.take() {
            match graph.category_mut(&category_id) {
                Some(category) => {
                    category.register_quest_id(&quest.id);
                    quest.category = Some(category_id);
                }
                None => {
                    problems.push(ConfigProblem::unknown_category(
                        &category_id,
                        &graph.category_ids(),
                    ));
                }
            }
        }

        for resolved in tasks {
            quest.register_task(self.build_task(resolved));
        }

        for key in LORE_KEYS {
            for line in document.get_string_list(key) {
                find_invalid_task_references(&quest, &line, key, false, problems);
            }
        }
        for (name, text) in &quest.placeholders {
            let location = format!("placeholders.{}", name);
            find_invalid_task_references(&quest, text, &location, false, problems);
        }
        for (name, text) in &quest.progress_placeholders {
            let location = format!("progress-placeholders.{}", name);
            find_invalid_task_references(&quest, text, &location, true, problems);
        }

        let mut displays = QuestDisplays::new(DisplayItem::from_path(
            document.root(),
            DisplayState::Normal.config_path(),
            &quest.id,
        ));
        for &state in usable_displays {
            if state == DisplayState::Normal {
                continue;
            }
            if let Some(section) = document.section(state.config_path()) {
                displays.set(state, DisplayItem::from_section(section, &quest.id));
            }
        }

        let quest = graph.register_quest(quest);
        graph.displays_mut().register_quest(&quest.id, displays);
        debug!("Built quest {} with {} tasks", quest.id, quest.tasks.len());
        quest
    }

    /// Copy the declared config and overlay the global defaults for its type
    fn build_task(&self, resolved: ResolvedTask) -> Task {
        let mut task = Task::new(resolved.id, resolved.type_name);
        task.config = resolved.config;

        let task_wins = self.settings.options.global_task_configuration_override;
        if let Some(defaults) = self
            .settings
            .global_task_defaults(&task.type_name, &resolved.declared_type)
        {
            for (key, value) in defaults {
                if task_wins && task.config.contains_key(key) {
                    continue;
                }
                task.add_config_value(key.clone(), value.clone());
            }
        }

        task
    }
}

/// Read options and text of a quest file into a quest with no tasks yet
fn read_quest(document: &ParsedDocument) -> Quest {
    let mut quest = Quest::new(document.id());

    quest.options = QuestOptions {
        repeatable: document.get_bool("options.repeatable", false),
        cooldown_enabled: document.get_bool("options.cooldown.enabled", false),
        cooldown_time: document.get_int("options.cooldown.time", 10),
        time_limit_enabled: document.get_bool("options.time-limit.enabled", false),
        time_limit_time: document.get_int("options.time-limit.time", 10),
        permission_required: document.get_bool("options.permission-required", false),
        autostart: document.get_bool("options.autostart", false),
        cancellable: document.get_bool("options.cancellable", true),
        counts_towards_limit: document.get_bool("options.counts-towards-limit", true),
        counts_towards_completed: document.get_bool("options.counts-towards-completed", true),
        hidden: document.get_bool("options.hidden", false),
        sort_order: document.get_int("options.sort-order", 1),
    };

    quest.text = QuestText {
        rewards: document.get_string_list("rewards"),
        reward_string: document.get_string_list("rewardstring"),
        start_string: document.get_string_list("startstring"),
        cancel_string: document.get_string_list("cancelstring"),
        expiry_string: document.get_string_list("expirystring"),
        start_commands: document.get_string_list("startcommands"),
        cancel_commands: document.get_string_list("cancelcommands"),
        expiry_commands: document.get_string_list("expirycommands"),
    };

    quest.vault_reward = document.get_string("vaultreward");
    quest.requirements = document.get_string_list("options.requires");
    quest.category = document
        .get_string("options.category")
        .filter(|category| !category.is_empty());

    for (path, target) in [
        ("placeholders", &mut quest.placeholders),
        ("progress-placeholders", &mut quest.progress_placeholders),
    ] {
        if let Some(section) = document.section(path) {
            for (name, value) in section {
                if let Some(text) = scalar_to_string(value) {
                    target.insert(name.clone(), text);
                }
            }
        }
    }

    quest
}
