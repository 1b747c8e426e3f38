use serde::Serialize;
use toml::Table;

use crate::document::ParsedDocument;

// ============================================================================
// Quest Items
// ============================================================================

/// An item definition loaded from the items directory. Variants other than
/// `Raw` and `Defined` are backed by an external item system and only carry
/// the keys that system needs to look the item up.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestItem {
    /// The `item` section as written, for the host to deserialize
    Raw { id: String, item: Option<Table> },
    Defined { id: String, item: DefinedItem },
    MmoItems {
        id: String,
        item_type: Option<String>,
        item_id: Option<String>,
    },
    Slimefun { id: String, item_id: Option<String> },
    ExecutableItems { id: String, item_id: Option<String> },
    ItemsAdder { id: String, item_id: Option<String> },
    Oraxen { id: String, item_id: Option<String> },
    Nexo { id: String, item_id: Option<String> },
    PyroFishingPro {
        id: String,
        /// -1 when unset
        fish_number: i64,
        tier: Option<String>,
    },
    CustomFishing { id: String, item_ids: Vec<String> },
    EvenMoreFish {
        id: String,
        rarity: Option<String>,
        fish: Option<String>,
    },
}

impl QuestItem {
    pub fn id(&self) -> &str {
        match self {
            QuestItem::Raw { id, .. }
            | QuestItem::Defined { id, .. }
            | QuestItem::MmoItems { id, .. }
            | QuestItem::Slimefun { id, .. }
            | QuestItem::ExecutableItems { id, .. }
            | QuestItem::ItemsAdder { id, .. }
            | QuestItem::Oraxen { id, .. }
            | QuestItem::Nexo { id, .. }
            | QuestItem::PyroFishingPro { id, .. }
            | QuestItem::CustomFishing { id, .. }
            | QuestItem::EvenMoreFish { id, .. } => id,
        }
    }

    /// The `type` tag this variant is declared with
    pub fn type_tag(&self) -> &'static str {
        match self {
            QuestItem::Raw { .. } => "raw",
            QuestItem::Defined { .. } => "defined",
            QuestItem::MmoItems { .. } => "mmoitems",
            QuestItem::Slimefun { .. } => "slimefun",
            QuestItem::ExecutableItems { .. } => "executableitems",
            QuestItem::ItemsAdder { .. } => "itemsadder",
            QuestItem::Oraxen { .. } => "oraxen",
            QuestItem::Nexo { .. } => "nexo",
            QuestItem::PyroFishingPro { .. } => "pyrofishingpro",
            QuestItem::CustomFishing { .. } => "customfishing",
            QuestItem::EvenMoreFish { .. } => "evenmorefish",
        }
    }
}

// ============================================================================
// Defined Items
// ============================================================================

/// An item described field by field under `item`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DefinedItem {
    pub material: Option<String>,
    pub name: Option<String>,
    pub lore: Vec<String>,
    pub amount: i64,
}

impl DefinedItem {
    pub fn from_document(document: &ParsedDocument) -> Self {
        Self {
            material: document
                .get_string("item.item")
                .or_else(|| document.get_string("item.type")),
            name: document.get_string("item.name"),
            lore: document.get_string_list("item.lore"),
            amount: document.get_int("item.amount", 1),
        }
    }
}
