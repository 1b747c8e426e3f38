//! Quest item data: definitions, the factories that build them from files,
//! and the registry they are published into.

pub mod item_def;
pub mod item_factory;
pub mod item_registry;

pub use item_def::{DefinedItem, QuestItem};
pub use item_factory::{ActiveIntegrations, Availability, Capabilities, ItemFactories, ItemFactory};
pub use item_registry::{QuestItemMap, QuestItemRegistry, load_quest_items};
