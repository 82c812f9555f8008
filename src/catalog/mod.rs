//! Static game data: every id-keyed catalog, loaded once at session start.
//!
//! Loading is fail-fast. A dangling id anywhere - an environment declaring
//! an unknown trigger, a character sheet equipping an unknown item, a
//! reveal target naming no position - aborts session start with a
//! configuration error rather than surfacing mid-game.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::characters::{Character, Health, Proficiency};
use crate::core::{CharacterName, ItemId, TriggerId};
use crate::environment::EnvironmentCatalog;
use crate::error::EngineError;
use crate::items::{EquipSlot, ItemCatalog};
use crate::quests::QuestCatalog;
use crate::triggers::{TriggerCatalog, TriggerKind};

/// All static catalogs for a session.
#[derive(Clone, Debug, Default)]
pub struct GameData {
    /// Item definitions.
    pub items: ItemCatalog,
    /// Trigger definitions.
    pub triggers: TriggerCatalog,
    /// Quest definitions.
    pub quests: QuestCatalog,
    /// Environment prototypes.
    pub environments: EnvironmentCatalog,
    /// Character prototypes, keyed by name.
    pub characters: FxHashMap<CharacterName, Character>,
}

/// Raw character sheet as it appears in the character catalog.
#[derive(Debug, Default, Deserialize)]
struct CharacterSheet {
    #[serde(default)]
    visual_description: String,
    #[serde(default)]
    gold: i64,
    #[serde(default)]
    factions: Vec<String>,
    #[serde(default)]
    health: Option<Health>,
    /// Skill name to proficiency tier.
    #[serde(default)]
    skills: FxHashMap<String, Proficiency>,
    /// Item ids carried.
    #[serde(default)]
    backpack: Vec<ItemId>,
    /// Slot to item id.
    #[serde(default)]
    equipped: FxHashMap<EquipSlot, ItemId>,
}

impl GameData {
    /// Load every catalog from its JSON source and cross-validate.
    pub fn load(
        items_json: &str,
        triggers_json: &str,
        quests_json: &str,
        environments_json: &str,
        characters_json: &str,
    ) -> Result<Self, EngineError> {
        let items = ItemCatalog::from_json_str(items_json)?;
        let triggers = TriggerCatalog::from_json_str(triggers_json)?;
        let quests = QuestCatalog::from_json_str(quests_json)?;
        let environments = EnvironmentCatalog::from_json_str(environments_json)?;

        let sheets: FxHashMap<String, CharacterSheet> = serde_json::from_str(characters_json)?;
        let mut characters = FxHashMap::default();
        for (name, sheet) in sheets {
            let character = build_character(&name, sheet, &items)?;
            characters.insert(CharacterName::new(name), character);
        }

        let data = Self {
            items,
            triggers,
            quests,
            environments,
            characters,
        };
        data.validate()?;
        Ok(data)
    }

    /// Cross-catalog id validation.
    pub fn validate(&self) -> Result<(), EngineError> {
        for environment in self.environments.iter() {
            let location = environment.id.as_str();

            for trigger_id in &environment.trigger_ids {
                self.require_trigger(trigger_id, location)?;
            }
            for connection in &environment.connections {
                if !self.environments.contains(connection) {
                    return Err(EngineError::Configuration(format!(
                        "environment {location} connects to unknown location {}",
                        connection.as_str()
                    )));
                }
            }
            for position in &environment.character_positions {
                for trigger_id in &position.trigger_ids {
                    self.require_trigger(trigger_id, location)?;
                }
                for name in &position.characters {
                    if !self.characters.contains_key(name) {
                        return Err(EngineError::Configuration(format!(
                            "environment {location} places unknown character {name}"
                        )));
                    }
                }
            }
            for position in &environment.object_positions {
                for trigger_id in &position.trigger_ids {
                    self.require_trigger(trigger_id, location)?;
                }
                for item_id in &position.items {
                    if !self.items.contains(item_id) {
                        return Err(EngineError::Configuration(format!(
                            "environment {location} places unknown item {}",
                            item_id.as_str()
                        )));
                    }
                }
            }
        }

        for def in self.triggers.iter() {
            for quest_id in def
                .gates
                .req_active_quest_ids
                .iter()
                .chain(def.gates.req_completed_quest_ids.iter())
                .chain(def.gates.excluded_active_quest_ids.iter())
                .chain(def.gates.excluded_completed_quest_ids.iter())
                .chain(def.quests_to_activate.iter())
                .chain(def.quests_to_complete.iter())
            {
                if !self.quests.contains(quest_id) {
                    return Err(EngineError::Configuration(format!(
                        "trigger {} gates on unknown quest {}",
                        def.id.as_str(),
                        quest_id.as_str()
                    )));
                }
            }

            if let TriggerKind::Reveal { targets } = &def.kind {
                for target in targets {
                    let known = self.environments.iter().any(|environment| {
                        environment
                            .character_positions
                            .iter()
                            .any(|p| &p.id == target)
                            || environment.object_positions.iter().any(|p| &p.id == target)
                    });
                    if !known {
                        return Err(EngineError::Configuration(format!(
                            "reveal trigger {} targets unknown position {}",
                            def.id.as_str(),
                            target.as_str()
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn require_trigger(&self, id: &TriggerId, location: &str) -> Result<(), EngineError> {
        if self.triggers.contains(id) {
            Ok(())
        } else {
            Err(EngineError::Configuration(format!(
                "environment {location} declares unknown trigger {}",
                id.as_str()
            )))
        }
    }
}

/// Build a live character from a sheet, resolving item ids.
fn build_character(
    name: &str,
    sheet: CharacterSheet,
    items: &ItemCatalog,
) -> Result<Character, EngineError> {
    let mut character = Character::new(name);
    character.visual_description = sheet.visual_description;
    character.gold = sheet.gold;
    character.factions = sheet.factions;
    if let Some(health) = sheet.health {
        character.health = health;
    }
    for (skill, proficiency) in sheet.skills {
        character.skills.set_proficiency(&skill, proficiency);
    }

    for item_id in sheet.backpack {
        let item = items
            .get(&item_id)
            .ok_or_else(|| EngineError::unknown_id("item", item_id.as_str()))?;
        character.backpack.add_item(item.clone()).map_err(|_| {
            EngineError::Configuration(format!(
                "character {name} carries more than their backpack holds"
            ))
        })?;
    }

    for (slot, item_id) in sheet.equipped {
        let item = items
            .get(&item_id)
            .ok_or_else(|| EngineError::unknown_id("item", item_id.as_str()))?;
        if item.equip_slot != Some(slot) {
            return Err(EngineError::Configuration(format!(
                "character {name} equips {} in slot {slot}, but it belongs in {:?}",
                item_id.as_str(),
                item.equip_slot
            )));
        }
        character.equipped.equip(slot, item.clone());
    }

    Ok(character)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: &str = r#"{
        "rope": {"name": "Rope", "mass": 0.1},
        "pistol": {
            "name": "Pistol", "mass": 0.2, "equipable": true,
            "equip_slot": "main_hand", "skill": "aim", "tier": "trained"
        }
    }"#;

    const TRIGGERS: &str = r#"{
        "t_entry": {
            "kind": "on_entry",
            "ids_to_trigger": ["t_describe"],
            "ids_to_exclude": ["t_entry"]
        },
        "t_describe": {"kind": "describe_location"}
    }"#;

    const QUESTS: &str = r#"{"q_intro": {"name": "A Quiet Arrival"}}"#;

    const ENVIRONMENTS: &str = r#"{
        "loc_harbor": {
            "name": "Harbor",
            "description": "A fog-bound harbor.",
            "visual_description": "Grey water, grey sky.",
            "trigger_ids": ["t_entry"],
            "connections": [],
            "character_positions": [
                {"id": "pos_quay", "characters": ["Mira"], "position_description": "by the quay"}
            ],
            "object_positions": [
                {"id": "pos_crate", "items": ["rope"], "position_description": "inside a crate"}
            ]
        }
    }"#;

    const CHARACTERS: &str = r#"{
        "Mira": {
            "visual_description": "A weathered dockhand.",
            "gold": 12,
            "skills": {"aim": "trained"},
            "backpack": ["rope"],
            "equipped": {"main_hand": "pistol"}
        }
    }"#;

    #[test]
    fn test_load_full_data() {
        let data = GameData::load(ITEMS, TRIGGERS, QUESTS, ENVIRONMENTS, CHARACTERS).unwrap();

        assert_eq!(data.items.len(), 2);
        assert_eq!(data.triggers.len(), 2);

        let mira = &data.characters[&CharacterName::new("Mira")];
        assert_eq!(mira.gold, 12);
        assert!(mira.backpack.contains(&ItemId::new("rope")));
        assert!(mira
            .equipped
            .item_in(EquipSlot::MainHand)
            .is_some());
    }

    #[test]
    fn test_unknown_trigger_in_environment() {
        let environments = ENVIRONMENTS.replace("t_entry", "t_ghost");
        let err =
            GameData::load(ITEMS, TRIGGERS, QUESTS, &environments, CHARACTERS).unwrap_err();
        assert!(err.to_string().contains("t_ghost"));
    }

    #[test]
    fn test_unknown_character_in_environment() {
        let environments = ENVIRONMENTS.replace("Mira", "Nobody");
        assert!(GameData::load(ITEMS, TRIGGERS, QUESTS, &environments, CHARACTERS).is_err());
    }

    #[test]
    fn test_unknown_item_in_backpack() {
        let characters = CHARACTERS.replace("\"rope\"", "\"anchor\"");
        assert!(GameData::load(ITEMS, TRIGGERS, QUESTS, ENVIRONMENTS, &characters).is_err());
    }

    #[test]
    fn test_wrong_equip_slot() {
        let characters = CHARACTERS.replace("main_hand", "off_hand");
        let err =
            GameData::load(ITEMS, TRIGGERS, QUESTS, ENVIRONMENTS, &characters).unwrap_err();
        assert!(err.to_string().contains("slot"));
    }

    #[test]
    fn test_trigger_gating_on_unknown_quest() {
        let triggers = r#"{
            "t_gated": {"kind": "describe_location", "req_active_quest_ids": ["q_ghost"]}
        }"#;
        let environments = r#"{}"#;
        let err = GameData::load(ITEMS, triggers, QUESTS, environments, "{}").unwrap_err();
        assert!(err.to_string().contains("q_ghost"));
    }

    #[test]
    fn test_reveal_target_must_exist() {
        let triggers = r#"{
            "t_reveal": {"kind": "reveal", "targets": ["pos_nowhere"]}
        }"#;
        let err =
            GameData::load(ITEMS, triggers, QUESTS, ENVIRONMENTS, CHARACTERS).unwrap_err();
        assert!(err.to_string().contains("pos_nowhere"));
    }
}
