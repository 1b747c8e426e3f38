//! Item Factories
//!
//! Item definitions are dispatched on their `type` tag to a registered
//! factory. A factory may need an external item system to be installed; that
//! check goes through the host's [`Capabilities`], so nothing here knows how
//! a given system is detected.

use std::collections::{HashMap, HashSet};

use super::item_def::{DefinedItem, QuestItem};
use crate::document::ParsedDocument;
use crate::settings::Settings;

/// Answers whether a named external system is active
pub trait Capabilities: Send + Sync {
    fn is_active(&self, capability: &str) -> bool;
}

/// Capabilities listed in the settings `integrations` array (case-insensitive)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveIntegrations {
    active: HashSet<String>,
}

impl ActiveIntegrations {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            active: names
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.integrations)
    }
}

impl Capabilities for ActiveIntegrations {
    fn is_active(&self, capability: &str) -> bool {
        self.active.contains(&capability.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Always,
    /// Only when the named capability is active
    Requires(String),
}

impl Availability {
    pub fn is_available(&self, capabilities: &dyn Capabilities) -> bool {
        match self {
            Availability::Always => true,
            Availability::Requires(capability) => capabilities.is_active(capability),
        }
    }
}

pub type ItemConstructor = Box<dyn Fn(&ParsedDocument) -> QuestItem + Send + Sync>;

pub struct ItemFactory {
    availability: Availability,
    constructor: ItemConstructor,
}

impl ItemFactory {
    pub fn new(
        availability: Availability,
        constructor: impl Fn(&ParsedDocument) -> QuestItem + Send + Sync + 'static,
    ) -> Self {
        Self {
            availability,
            constructor: Box::new(constructor),
        }
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn construct(&self, document: &ParsedDocument) -> QuestItem {
        (self.constructor)(document)
    }
}

/// Factories keyed by lowercased type tag
#[derive(Default)]
pub struct ItemFactories {
    factories: HashMap<String, ItemFactory>,
}

impl ItemFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Core item types plus every supported external item system
    pub fn with_defaults() -> Self {
        let mut factories = Self::new();

        factories.register(
            "raw",
            ItemFactory::new(Availability::Always, |doc| QuestItem::Raw {
                id: doc.id().to_string(),
                item: doc.section("item").cloned(),
            }),
        );
        factories.register(
            "defined",
            ItemFactory::new(Availability::Always, |doc| QuestItem::Defined {
                id: doc.id().to_string(),
                item: DefinedItem::from_document(doc),
            }),
        );
        factories.register(
            "mmoitems",
            ItemFactory::new(requires("MMOItems"), |doc| QuestItem::MmoItems {
                id: doc.id().to_string(),
                item_type: doc.get_string("item.type"),
                item_id: doc.get_string("item.id"),
            }),
        );
        factories.register(
            "slimefun",
            ItemFactory::new(requires("Slimefun"), |doc| QuestItem::Slimefun {
                id: doc.id().to_string(),
                item_id: doc.get_string("item.id"),
            }),
        );
        factories.register(
            "executableitems",
            ItemFactory::new(requires("ExecutableItems"), |doc| {
                QuestItem::ExecutableItems {
                    id: doc.id().to_string(),
                    item_id: doc.get_string("item.id"),
                }
            }),
        );
        factories.register(
            "itemsadder",
            ItemFactory::new(requires("ItemsAdder"), |doc| QuestItem::ItemsAdder {
                id: doc.id().to_string(),
                item_id: doc.get_string("item.id"),
            }),
        );
        factories.register(
            "oraxen",
            ItemFactory::new(requires("Oraxen"), |doc| QuestItem::Oraxen {
                id: doc.id().to_string(),
                item_id: doc.get_string("item.id"),
            }),
        );
        factories.register(
            "pyrofishingpro",
            ItemFactory::new(requires("PyroFishingPro"), |doc| {
                QuestItem::PyroFishingPro {
                    id: doc.id().to_string(),
                    fish_number: doc.get_int("item.fish-number", -1),
                    tier: doc.get_string("item.tier"),
                }
            }),
        );
        factories.register(
            "nexo",
            ItemFactory::new(requires("Nexo"), |doc| QuestItem::Nexo {
                id: doc.id().to_string(),
                item_id: doc.get_string("item.id"),
            }),
        );
        factories.register(
            "customfishing",
            ItemFactory::new(requires("CustomFishing"), |doc| {
                let item_ids = if doc.contains("item.ids") {
                    doc.get_string_list("item.ids")
                } else {
                    doc.get_string("item.id").into_iter().collect()
                };
                QuestItem::CustomFishing {
                    id: doc.id().to_string(),
                    item_ids,
                }
            }),
        );
        factories.register(
            "evenmorefish",
            ItemFactory::new(requires("EvenMoreFish"), |doc| QuestItem::EvenMoreFish {
                id: doc.id().to_string(),
                rarity: doc.get_string("item.rarity"),
                fish: doc.get_string("item.fish"),
            }),
        );

        factories
    }

    /// Register a factory, replacing any previous one for the tag
    pub fn register(&mut self, tag: &str, factory: ItemFactory) {
        self.factories.insert(tag.to_lowercase(), factory);
    }

    pub fn get(&self, tag: &str) -> Option<&ItemFactory> {
        self.factories.get(&tag.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

fn requires(capability: &str) -> Availability {
    Availability::Requires(capability.to_string())
}
