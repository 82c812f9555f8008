//! Characters: the player and every NPC.
//!
//! There is one `Character` type; the player is a `Character` plus a quest
//! log and a current location. Capability differences (who owns the quest
//! log, which action catalog an actor sees) live in the engine, not in a
//! type hierarchy.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::{CharacterName, ItemId, LocationId};
use crate::engine::actions::ActionKind;
use crate::error::Rejection;
use crate::items::EquipSlot;
use crate::quests::QuestLog;

use super::health::Health;
use super::inventory::{Backpack, Equipped, WeaponAttack};
use super::skills::SkillTree;

/// A character in play: identity, condition, skills, possessions, and the
/// queue of actions awaiting their turn.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Character {
    /// Name, doubling as the character's identifier.
    pub name: CharacterName,

    /// Appearance, fed to narration and media generation.
    #[serde(default)]
    pub visual_description: String,

    /// Gold on hand.
    #[serde(default)]
    pub gold: i64,

    /// Factions the character belongs to.
    #[serde(default)]
    pub factions: Vec<String>,

    /// Health status machine.
    #[serde(default)]
    pub health: Health,

    /// Whether the character is behind cover, granting a defense bonus.
    #[serde(default)]
    pub in_cover: bool,

    /// Skill proficiencies.
    #[serde(default)]
    pub skills: SkillTree,

    /// Carried items.
    #[serde(default)]
    pub backpack: Backpack,

    /// Equipped items.
    #[serde(default)]
    pub equipped: Equipped,

    /// Short-term memory: event lines accumulated since the last reduce.
    #[serde(default)]
    short_term_memory: Vec<String>,

    /// Prepared actions awaiting this actor's turn.
    #[serde(default)]
    action_queue: VecDeque<ActionKind>,
}

impl Character {
    /// Create a character with default condition and empty possessions.
    pub fn new(name: impl Into<CharacterName>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // === Action queue ===

    /// Queue a prepared action for this actor's turn.
    pub fn add_to_action_queue(&mut self, action: ActionKind) {
        self.action_queue.push_back(action);
    }

    /// Take every queued action, leaving the queue empty.
    pub fn drain_action_queue(&mut self) -> Vec<ActionKind> {
        self.action_queue.drain(..).collect()
    }

    /// Number of queued actions.
    #[must_use]
    pub fn queued_actions(&self) -> usize {
        self.action_queue.len()
    }

    // === Combat-facing accessors ===

    /// The roll penalty magnitude imposed by current health.
    #[must_use]
    pub fn health_penalty(&self) -> i32 {
        self.health.status.penalty()
    }

    /// The roll modifier for a skill.
    #[must_use]
    pub fn skill_modifier(&self, skill: &str) -> i32 {
        self.skills.modifier(skill)
    }

    /// Attack stats for the currently equipped hands.
    #[must_use]
    pub fn weapon_attack_stats(&self) -> WeaponAttack {
        self.equipped.weapon_attack_stats()
    }

    // === Gold ===

    /// Add (or with a negative amount, spend) gold.
    ///
    /// Rejected without mutation if the balance would go negative.
    pub fn modify_gold(&mut self, amount: i64) -> Result<String, Rejection> {
        let updated = self.gold + amount;
        if updated < 0 {
            return Err(Rejection::InsufficientGold);
        }
        self.gold = updated;
        Ok(format!(
            "{} gold added, {} now has {} gold",
            amount, self.name, updated
        ))
    }

    // === Factions ===

    /// Check membership in a faction.
    #[must_use]
    pub fn in_faction(&self, faction: &str) -> bool {
        self.factions.iter().any(|f| f == faction)
    }

    /// Join a faction. No-op if already a member.
    pub fn add_faction(&mut self, faction: impl Into<String>) {
        let faction = faction.into();
        if !self.in_faction(&faction) {
            self.factions.push(faction);
        }
    }

    /// Leave a faction.
    pub fn remove_faction(&mut self, faction: &str) {
        self.factions.retain(|f| f != faction);
    }

    // === Memory ===

    /// Append a line to short-term memory.
    pub fn add_short_term_memory(&mut self, line: impl Into<String>) {
        self.short_term_memory.push(line.into());
    }

    /// The accumulated short-term memory lines.
    #[must_use]
    pub fn short_term_memory(&self) -> &[String] {
        &self.short_term_memory
    }

    /// Clear short-term memory after it has been folded into a reaction.
    pub fn clear_short_term_memory(&mut self) {
        self.short_term_memory.clear();
    }

    // === Equipment ===

    /// Equip an item from the backpack. Atomic: either the item moves to its
    /// slot (and any displaced item moves to the backpack) or nothing
    /// changes.
    pub fn equip_item(&mut self, id: &ItemId) -> Result<String, Rejection> {
        let item = self
            .backpack
            .get(id)
            .ok_or_else(|| Rejection::ItemNotHeld(id.as_str().to_string()))?;

        if !item.equipable {
            return Err(Rejection::NotEquipable(item.name.clone()));
        }
        let Some(slot) = item.equip_slot else {
            return Err(Rejection::NotEquipable(item.name.clone()));
        };
        if !item.equip_skill_check(&self.skills) {
            return Err(Rejection::InsufficientProficiency(item.name.clone()));
        }
        if let Some(displaced) = self.equipped.item_in(slot) {
            // The new item's mass leaves the backpack in the same motion, so
            // count it as freed when checking room for the displaced item.
            if !self.backpack.fits(displaced.mass, item.mass) {
                return Err(Rejection::Capacity(displaced.name.clone()));
            }
        }

        // Checks done; perform the swap.
        let item = self
            .backpack
            .remove_item(id)
            .map_err(|_| Rejection::ItemNotHeld(id.as_str().to_string()))?;
        let item_name = item.name.clone();
        let displaced = self.equipped.equip(slot, item);

        match displaced {
            Some(displaced) => {
                let displaced_name = displaced.name.clone();
                self.backpack.put_unchecked(displaced);
                Ok(format!("{item_name} equipped in place of {displaced_name}"))
            }
            None => Ok(format!("{item_name} equipped")),
        }
    }

    /// Unequip the item in a slot back into the backpack. Atomic.
    pub fn unequip_item(&mut self, slot: EquipSlot) -> Result<String, Rejection> {
        let item = self
            .equipped
            .item_in(slot)
            .ok_or_else(|| Rejection::EmptySlot(slot.to_string()))?;

        if !self.backpack.fits(item.mass, 0.0) {
            return Err(Rejection::Capacity(item.name.clone()));
        }

        // item_in returned Some, so unequip must too.
        let Some(item) = self.equipped.unequip(slot) else {
            return Err(Rejection::EmptySlot(slot.to_string()));
        };
        let name = item.name.clone();
        self.backpack.put_unchecked(item);
        Ok(format!("{name} unequipped"))
    }

    /// Visual description including equipped items.
    #[must_use]
    pub fn describe(&self) -> String {
        let equipped = self.equipped.describe();
        if equipped.is_empty() {
            self.visual_description.clone()
        } else {
            format!("{}\nEquipped:\n{equipped}", self.visual_description)
        }
    }
}

/// The player: a character plus the quest log and current location.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    /// The player's character sheet and possessions.
    pub character: Character,
    /// Quest and trigger ledgers.
    pub quest_log: QuestLog,
    /// Where the player currently is.
    pub location: LocationId,
}

impl Player {
    /// Create a player at a starting location.
    pub fn new(character: Character, location: impl Into<LocationId>) -> Self {
        Self {
            character,
            quest_log: QuestLog::new(),
            location: location.into(),
        }
    }

    /// The player's character name.
    #[must_use]
    pub fn name(&self) -> &CharacterName {
        &self.character.name
    }
}
