//! Backpack and equipped-item containers.
//!
//! The backpack tracks a mass budget: capacity starts at 1.0 and every item
//! carried consumes its mass. Capacity is computed from the item list rather
//! than mutated incrementally, so moving an item out and back in restores
//! the exact same value.
//!
//! Equip and unequip are atomic at the [`Character`](super::Character)
//! level: all checks run before any container is touched.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::ItemId;
use crate::error::Rejection;
use crate::items::{EquipSlot, Item};

use super::skills::UNARMED;

/// Default mass budget for a backpack.
pub const DEFAULT_CAPACITY: f32 = 1.0;

/// A capacity-bounded item container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Backpack {
    /// Total mass budget.
    base_capacity: f32,
    items: Vec<Item>,
}

impl Default for Backpack {
    fn default() -> Self {
        Self::new()
    }
}

impl Backpack {
    /// Create an empty backpack with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_capacity: DEFAULT_CAPACITY,
            items: Vec::new(),
        }
    }

    /// Create an empty backpack with a custom capacity.
    #[must_use]
    pub fn with_capacity(base_capacity: f32) -> Self {
        Self {
            base_capacity,
            items: Vec::new(),
        }
    }

    /// Remaining capacity: the budget minus the mass of everything carried.
    /// Never negative while the add/remove invariants hold.
    #[must_use]
    pub fn capacity(&self) -> f32 {
        self.base_capacity - self.items.iter().map(|i| i.mass).sum::<f32>()
    }

    /// Whether an item of the given mass fits, counting `freed` mass as
    /// already released (the displaced-item case during equip).
    #[must_use]
    pub fn fits(&self, mass: f32, freed: f32) -> bool {
        self.capacity() + freed - mass >= 0.0
    }

    /// Add an item. Rejected without mutation if it does not fit.
    pub fn add_item(&mut self, item: Item) -> Result<(), Rejection> {
        if !self.fits(item.mass, 0.0) {
            return Err(Rejection::Capacity(item.name));
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove an item by id.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<Item, Rejection> {
        match self.items.iter().position(|i| &i.id == id) {
            Some(index) => Ok(self.items.remove(index)),
            None => Err(Rejection::ItemNotHeld(id.as_str().to_string())),
        }
    }

    /// Add an item without the capacity check.
    ///
    /// Only for internal moves whose fit was established before any
    /// container was mutated (equip/unequip swaps).
    pub(crate) fn put_unchecked(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Get an item by id without removing it.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Check if an item is carried.
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over carried items.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Number of carried items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the backpack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Weapon stats derived from the equipped hands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeaponAttack {
    /// The skill the attack rolls against.
    pub skill: String,
    /// Weapon name for narration.
    pub weapon_name: String,
    /// Main-hand modifier plus half the off-hand modifier.
    pub modifier: i32,
}

/// Slot-keyed equipped items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipped {
    slots: FxHashMap<EquipSlot, Item>,
}

impl Equipped {
    /// Create with all slots empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The item in a slot, if any.
    #[must_use]
    pub fn item_in(&self, slot: EquipSlot) -> Option<&Item> {
        self.slots.get(&slot)
    }

    /// Place an item in a slot, returning whatever it displaced.
    ///
    /// Raw container operation; the atomic checks live on `Character`.
    pub fn equip(&mut self, slot: EquipSlot, item: Item) -> Option<Item> {
        self.slots.insert(slot, item)
    }

    /// Take the item out of a slot.
    pub fn unequip(&mut self, slot: EquipSlot) -> Option<Item> {
        self.slots.remove(&slot)
    }

    /// Iterate equipped items with their slots.
    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, &Item)> {
        EquipSlot::ALL
            .iter()
            .filter_map(|slot| self.slots.get(slot).map(|item| (*slot, item)))
    }

    /// One line per equipped item, for visual descriptions.
    #[must_use]
    pub fn describe(&self) -> String {
        let lines: Vec<String> = self
            .iter()
            .map(|(slot, item)| format!("{slot}: {}", item.name))
            .collect();
        lines.join("\n")
    }

    /// Attack stats for the current hands.
    ///
    /// Unarmed when the main hand is empty: the fallback skill with no
    /// weapon modifier. When dual-wielding, the off hand contributes half
    /// its modifier, floored.
    #[must_use]
    pub fn weapon_attack_stats(&self) -> WeaponAttack {
        let Some(main) = self.slots.get(&EquipSlot::MainHand) else {
            return WeaponAttack {
                skill: UNARMED.to_string(),
                weapon_name: "bare hands".to_string(),
                modifier: 0,
            };
        };

        let mut modifier = main.modifier();
        if let Some(off) = self.slots.get(&EquipSlot::OffHand) {
            modifier += off.modifier() / 2;
        }

        WeaponAttack {
            skill: main.skill.clone().unwrap_or_else(|| UNARMED.to_string()),
            weapon_name: main.name.clone(),
            modifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characters::skills::Proficiency;

    fn item(id: &str, mass: f32) -> Item {
        Item {
            id: ItemId::new(id),
            name: id.to_string(),
            description: String::new(),
            value: 0,
            mass,
            equipable: false,
            equip_slot: None,
            min_proficiency: None,
            skill: None,
            tier: None,
        }
    }

    fn weapon(id: &str, slot: EquipSlot, tier: Proficiency) -> Item {
        Item {
            equipable: true,
            equip_slot: Some(slot),
            skill: Some("aim".to_string()),
            tier: Some(tier),
            ..item(id, 0.2)
        }
    }

    #[test]
    fn test_backpack_capacity_accounting() {
        let mut backpack = Backpack::new();
        assert_eq!(backpack.capacity(), 1.0);

        backpack.add_item(item("rope", 0.3)).unwrap();
        assert!(backpack.capacity() < 1.0);

        backpack.remove_item(&ItemId::new("rope")).unwrap();
        assert_eq!(backpack.capacity(), 1.0);
    }

    #[test]
    fn test_backpack_rejects_over_capacity() {
        let mut backpack = Backpack::new();
        backpack.add_item(item("anvil", 0.9)).unwrap();

        let err = backpack.add_item(item("rope", 0.3)).unwrap_err();
        assert!(matches!(err, Rejection::Capacity(_)));
        // Rejection left nothing behind.
        assert_eq!(backpack.len(), 1);
    }

    #[test]
    fn test_backpack_remove_missing() {
        let mut backpack = Backpack::new();
        let err = backpack.remove_item(&ItemId::new("ghost")).unwrap_err();
        assert!(matches!(err, Rejection::ItemNotHeld(_)));
    }

    #[test]
    fn test_fits_with_freed_mass() {
        let mut backpack = Backpack::new();
        backpack.add_item(item("armor", 0.95)).unwrap();

        assert!(!backpack.fits(0.3, 0.0));
        // Swapping out the armor frees enough for the new piece.
        assert!(backpack.fits(0.3, 0.95));
    }

    #[test]
    fn test_unarmed_stats() {
        let equipped = Equipped::new();
        let stats = equipped.weapon_attack_stats();
        assert_eq!(stats.skill, UNARMED);
        assert_eq!(stats.modifier, 0);
    }

    #[test]
    fn test_main_hand_stats() {
        let mut equipped = Equipped::new();
        equipped.equip(
            EquipSlot::MainHand,
            weapon("pistol", EquipSlot::MainHand, Proficiency::Expert),
        );

        let stats = equipped.weapon_attack_stats();
        assert_eq!(stats.skill, "aim");
        assert_eq!(stats.weapon_name, "pistol");
        assert_eq!(stats.modifier, 2);
    }

    #[test]
    fn test_dual_wield_halves_off_hand() {
        let mut equipped = Equipped::new();
        equipped.equip(
            EquipSlot::MainHand,
            weapon("pistol", EquipSlot::MainHand, Proficiency::Expert),
        );
        equipped.equip(
            EquipSlot::OffHand,
            weapon("knife", EquipSlot::OffHand, Proficiency::Master),
        );

        // 2 + floor(3 / 2) = 3
        assert_eq!(equipped.weapon_attack_stats().modifier, 3);
    }

    #[test]
    fn test_off_hand_alone_is_unarmed() {
        let mut equipped = Equipped::new();
        equipped.equip(
            EquipSlot::OffHand,
            weapon("knife", EquipSlot::OffHand, Proficiency::Master),
        );
        assert_eq!(equipped.weapon_attack_stats().skill, UNARMED);
    }

    #[test]
    fn test_equip_displaces() {
        let mut equipped = Equipped::new();
        assert!(equipped
            .equip(
                EquipSlot::MainHand,
                weapon("pistol", EquipSlot::MainHand, Proficiency::Trained)
            )
            .is_none());

        let displaced = equipped.equip(
            EquipSlot::MainHand,
            weapon("rifle", EquipSlot::MainHand, Proficiency::Trained),
        );
        assert_eq!(displaced.unwrap().id, ItemId::new("pistol"));
    }
}
