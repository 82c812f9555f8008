//! Items and the item catalog.
//!
//! An item lives in exactly one place at a time: a backpack or an equipped
//! slot. The engine enforces that by moving owned `Item` values between the
//! two containers rather than sharing references.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::characters::skills::{Proficiency, SkillTree};
use crate::core::ItemId;
use crate::error::EngineError;

/// Body slot an item can be equipped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Head,
    Chest,
    Legs,
    Feet,
    MainHand,
    OffHand,
}

impl EquipSlot {
    /// All slots, in display order.
    pub const ALL: [EquipSlot; 6] = [
        EquipSlot::Head,
        EquipSlot::Chest,
        EquipSlot::Legs,
        EquipSlot::Feet,
        EquipSlot::MainHand,
        EquipSlot::OffHand,
    ];

    /// Lowercase name matching the catalog representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Chest => "chest",
            Self::Legs => "legs",
            Self::Feet => "feet",
            Self::MainHand => "main_hand",
            Self::OffHand => "off_hand",
        }
    }

    /// Parse a slot name from catalog data or agent input.
    pub fn parse(name: &str) -> Result<Self, EngineError> {
        match name {
            "head" => Ok(Self::Head),
            "chest" => Ok(Self::Chest),
            "legs" => Ok(Self::Legs),
            "feet" => Ok(Self::Feet),
            "main_hand" => Ok(Self::MainHand),
            "off_hand" => Ok(Self::OffHand),
            other => Err(EngineError::Configuration(format!(
                "unknown equip slot: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An item instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Catalog identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Description shown on inspection.
    #[serde(default)]
    pub description: String,
    /// Trade value in gold.
    #[serde(default)]
    pub value: i64,
    /// Mass as a fraction of backpack capacity.
    pub mass: f32,
    /// Whether the item can be equipped at all.
    #[serde(default)]
    pub equipable: bool,
    /// Which slot it occupies when equipped.
    #[serde(default)]
    pub equip_slot: Option<EquipSlot>,
    /// Minimum proficiency in `skill` required to equip.
    #[serde(default)]
    pub min_proficiency: Option<Proficiency>,
    /// The skill this item is used with (weapon skill for weapons).
    #[serde(default)]
    pub skill: Option<String>,
    /// Craftsmanship tier; its modifier is the item's contribution to
    /// attack rolls.
    #[serde(default)]
    pub tier: Option<Proficiency>,
}

impl Item {
    /// Check the holder's proficiency against this item's minimum.
    ///
    /// Items without an associated skill or minimum are always equipable
    /// skill-wise.
    #[must_use]
    pub fn equip_skill_check(&self, skills: &SkillTree) -> bool {
        let (Some(skill), Some(min)) = (&self.skill, self.min_proficiency) else {
            return true;
        };
        skills.modifier(skill) >= min.modifier()
    }

    /// The item's own roll modifier (weapon quality).
    #[must_use]
    pub fn modifier(&self) -> i32 {
        self.tier.map_or(0, Proficiency::modifier)
    }
}

/// Registry of item definitions, loaded once at session start.
#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    items: FxHashMap<ItemId, Item>,
}

impl ItemCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item definition.
    pub fn register(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }

    /// Load from an id-keyed JSON object.
    ///
    /// An equipable item without a slot is a configuration error.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        #[derive(Deserialize)]
        struct ItemData {
            name: String,
            #[serde(default)]
            description: String,
            #[serde(default)]
            value: i64,
            mass: f32,
            #[serde(default)]
            equipable: bool,
            #[serde(default)]
            equip_slot: Option<EquipSlot>,
            #[serde(default)]
            min_proficiency: Option<Proficiency>,
            #[serde(default)]
            skill: Option<String>,
            #[serde(default)]
            tier: Option<Proficiency>,
        }

        let raw: FxHashMap<String, ItemData> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (id, data) in raw {
            if data.equipable && data.equip_slot.is_none() {
                return Err(EngineError::Configuration(format!(
                    "item {id} is equipable but has no equip slot"
                )));
            }
            if data.mass < 0.0 {
                return Err(EngineError::Configuration(format!(
                    "item {id} has negative mass"
                )));
            }
            catalog.register(Item {
                id: ItemId::new(id),
                name: data.name,
                description: data.description,
                value: data.value,
                mass: data.mass,
                equipable: data.equipable,
                equip_slot: data.equip_slot,
                min_proficiency: data.min_proficiency,
                skill: data.skill,
                tier: data.tier,
            });
        }
        Ok(catalog)
    }

    /// Get an item definition by ID.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Check if an item ID is registered.
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Get the number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over all item definitions.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }
}
