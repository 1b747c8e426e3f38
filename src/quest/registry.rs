//! Quest Registry
//!
//! Holds the quest graph produced by the most recent load cycle. Each cycle
//! builds a fresh [`QuestGraph`] and publishes it with a single swap, so
//! readers never observe a half-built registry.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use super::definition::{Category, Quest};
use crate::display::DisplayRegistry;
use crate::task_type::TaskBindings;

/// Everything one load cycle produces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestGraph {
    /// In declaration order
    categories: Vec<Category>,
    quests: BTreeMap<String, Arc<Quest>>,
    task_bindings: TaskBindings,
    displays: DisplayRegistry,
}

impl QuestGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_category(&mut self, category: Category) {
        match self.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_mut(&mut self, id: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_ids(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.id.as_str()).collect()
    }

    /// Register a finished quest and bind its tasks to their types
    pub fn register_quest(&mut self, quest: Quest) -> Arc<Quest> {
        self.task_bindings.register_quest_tasks(&quest);
        let quest = Arc::new(quest);
        self.quests.insert(quest.id.clone(), Arc::clone(&quest));
        quest
    }

    pub fn quest(&self, id: &str) -> Option<&Arc<Quest>> {
        self.quests.get(id)
    }

    pub fn contains_quest(&self, id: &str) -> bool {
        self.quests.contains_key(id)
    }

    /// All quests, ordered by ID
    pub fn quests(&self) -> impl Iterator<Item = &Arc<Quest>> {
        self.quests.values()
    }

    pub fn quest_count(&self) -> usize {
        self.quests.len()
    }

    pub fn task_bindings(&self) -> &TaskBindings {
        &self.task_bindings
    }

    pub fn displays(&self) -> &DisplayRegistry {
        &self.displays
    }

    pub fn displays_mut(&mut self) -> &mut DisplayRegistry {
        &mut self.displays
    }
}

/// Registry for the live quest graph
pub struct QuestRegistry {
    graph: RwLock<Arc<QuestGraph>>,
}

impl QuestRegistry {
    pub fn new() -> Self {
        Self {
            graph: RwLock::new(Arc::new(QuestGraph::new())),
        }
    }

    /// Replace the live graph, returning the previous one
    pub fn publish(&self, graph: QuestGraph) -> Arc<QuestGraph> {
        let graph = Arc::new(graph);
        let mut live = self.graph.write().unwrap_or_else(PoisonError::into_inner);
        info!(
            "Publishing {} quests in {} categories",
            graph.quest_count(),
            graph.categories().len()
        );
        std::mem::replace(&mut *live, graph)
    }

    /// The current graph; stays valid even if a newer one is published
    pub fn snapshot(&self) -> Arc<QuestGraph> {
        let live = self.graph.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&live)
    }

    /// Get a quest by ID
    pub fn get(&self, quest_id: &str) -> Option<Arc<Quest>> {
        self.snapshot().quest(quest_id).cloned()
    }

    /// Get all quest IDs
    pub fn all_ids(&self) -> Vec<String> {
        self.snapshot().quests().map(|q| q.id.clone()).collect()
    }

    pub fn category(&self, category_id: &str) -> Option<Category> {
        self.snapshot().category(category_id).cloned()
    }

    /// Get quests belonging to a category, in membership order
    pub fn quests_in_category(&self, category_id: &str) -> Vec<Arc<Quest>> {
        let graph = self.snapshot();
        let Some(category) = graph.category(category_id) else {
            return Vec::new();
        };
        category
            .quest_ids()
            .iter()
            .filter_map(|id| graph.quest(id).cloned())
            .collect()
    }

    /// Get count of loaded quests
    pub fn count(&self) -> usize {
        self.snapshot().quest_count()
    }
}

impl Default for QuestRegistry {
    fn default() -> Self {
        Self::new()
    }
}
