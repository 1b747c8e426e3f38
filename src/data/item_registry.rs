use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info};

use super::item_def::QuestItem;
use super::item_factory::{Capabilities, ItemFactories};
use crate::document::is_alphanumeric;
use crate::loader::{FileOutcome, discover_files, load_file};
use crate::macros::MacroMap;

pub type QuestItemMap = BTreeMap<String, Arc<QuestItem>>;

/// Load every item definition under `root`. Nothing here is reported as a
/// problem: unreadable files, bad IDs, unknown tags and items whose external
/// system is not active are all skipped. A later file replaces an earlier one
/// with the same ID.
pub fn load_quest_items(
    root: &Path,
    factories: &ItemFactories,
    capabilities: &dyn Capabilities,
) -> QuestItemMap {
    let mut items = QuestItemMap::new();
    let no_macros = MacroMap::new();

    for file in discover_files(root) {
        let document = match load_file(&file, &no_macros) {
            FileOutcome::Parsed(document) => document,
            FileOutcome::Malformed(problem) => {
                debug!("Skipping quest item {}: {}", file.relative_path, problem.description);
                continue;
            }
            FileOutcome::Skipped(e) => {
                error!(
                    "An error occurred when attempting to load quest item '{:?}' (will be ignored): {}",
                    file.path, e
                );
                continue;
            }
        };

        if !is_alphanumeric(document.id()) {
            debug!("Skipping quest item {}: ID is not alphanumeric", file.relative_path);
            continue;
        }

        let tag = document.get_string("type").unwrap_or_default();
        let Some(factory) = factories.get(&tag) else {
            debug!("Skipping quest item {}: unknown type '{}'", file.relative_path, tag);
            continue;
        };

        if !factory.availability().is_available(capabilities) {
            debug!(
                "Skipping quest item {}: {:?} not satisfied",
                file.relative_path,
                factory.availability()
            );
            continue;
        }

        let item = factory.construct(&document);
        items.insert(item.id().to_string(), Arc::new(item));
    }

    info!("{} quest items have been registered.", items.len());
    items
}

/// Registry for the live quest items
pub struct QuestItemRegistry {
    items: RwLock<Arc<QuestItemMap>>,
}

impl QuestItemRegistry {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Arc::new(QuestItemMap::new())),
        }
    }

    /// Replace every item at once, returning the previous set
    pub fn publish(&self, items: QuestItemMap) -> Arc<QuestItemMap> {
        let mut live = self.items.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *live, Arc::new(items))
    }

    pub fn snapshot(&self) -> Arc<QuestItemMap> {
        let live = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&live)
    }

    /// Get an item by ID
    pub fn get(&self, id: &str) -> Option<Arc<QuestItem>> {
        self.snapshot().get(id).cloned()
    }

    /// Check if an item exists
    pub fn contains(&self, id: &str) -> bool {
        self.snapshot().contains_key(id)
    }

    /// Get all item IDs
    pub fn ids(&self) -> Vec<String> {
        self.snapshot().keys().cloned().collect()
    }

    /// Get the number of loaded items
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

impl Default for QuestItemRegistry {
    fn default() -> Self {
        Self::new()
    }
}
