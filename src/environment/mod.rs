//! Environments: locations, dwell tracking, positions, and armed triggers.
//!
//! An environment owns its `armed_triggers` list as instance state; nothing
//! is shared between locations or sessions. The dwell counter only moves in
//! one direction until an explicit location change resets it.

pub mod positions;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{CharacterName, ItemId, LocationId, PositionId, TriggerId};
use crate::error::EngineError;
use crate::triggers::ArmedTrigger;

pub use positions::{CharacterPosition, ObjectPosition};

/// What revealing a position produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealOutcome {
    /// The position's reveal narrative, if it has one.
    pub narration: Option<String>,
    /// Triggers nested under the position, to be chained.
    pub chained: Vec<TriggerId>,
}

/// A location the player can be in.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Environment {
    /// Catalog identifier.
    pub id: LocationId,

    /// Display name.
    pub name: String,

    /// Prose description for narration.
    pub description: String,

    /// Visual description, emitted by DescribeLocation triggers and fed to
    /// media generation.
    pub visual_description: String,

    /// Turns the player has spent here since arriving.
    #[serde(default)]
    turns_in_location: u32,

    /// Triggers declared on this location in the static catalog.
    #[serde(default)]
    pub trigger_ids: Vec<TriggerId>,

    /// Triggers that passed validation this pass, queued for activation.
    /// Instance state; never serialized.
    #[serde(skip)]
    armed_triggers: Vec<ArmedTrigger>,

    /// Where characters are in this location.
    #[serde(default)]
    pub character_positions: Vec<CharacterPosition>,

    /// Where loose items are in this location.
    #[serde(default)]
    pub object_positions: Vec<ObjectPosition>,

    /// Locations reachable from here.
    #[serde(default)]
    pub connections: Vec<LocationId>,
}

impl Environment {
    /// Create an environment with a description and nothing else.
    pub fn new(
        id: impl Into<LocationId>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let description = description.into();
        Self {
            id: id.into(),
            name: name.into(),
            visual_description: description.clone(),
            description,
            ..Self::default()
        }
    }

    /// Override the visual description (builder pattern).
    #[must_use]
    pub fn with_visual_description(mut self, description: impl Into<String>) -> Self {
        self.visual_description = description.into();
        self
    }

    // === Dwell counter ===

    /// Turns spent here since arrival.
    #[must_use]
    pub fn dwell(&self) -> u32 {
        self.turns_in_location
    }

    /// Advance the dwell counter by one turn.
    pub fn increment_dwell(&mut self) {
        self.turns_in_location += 1;
    }

    /// Reset the dwell counter. Only called on an explicit location change.
    pub fn reset_dwell(&mut self) {
        self.turns_in_location = 0;
    }

    // === Armed triggers ===

    /// Queue a trigger that passed validation this pass.
    pub fn arm_trigger(&mut self, armed: ArmedTrigger) {
        self.armed_triggers.push(armed);
    }

    /// Take every armed trigger, leaving the list empty.
    pub fn drain_armed(&mut self) -> Vec<ArmedTrigger> {
        std::mem::take(&mut self.armed_triggers)
    }

    /// Number of triggers currently armed.
    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.armed_triggers.len()
    }

    // === Presence ===

    /// Every character placed in this location.
    #[must_use]
    pub fn characters_present(&self) -> Vec<CharacterName> {
        self.character_positions
            .iter()
            .flat_map(|p| p.characters.iter().cloned())
            .collect()
    }

    /// Check whether a named character is here.
    #[must_use]
    pub fn is_character_present(&self, name: &CharacterName) -> bool {
        self.character_positions
            .iter()
            .any(|p| p.characters.contains(name))
    }

    /// Place characters in the location (an import from a trigger event).
    pub fn import_characters(
        &mut self,
        id: impl Into<PositionId>,
        characters: impl IntoIterator<Item = CharacterName>,
        position_description: impl Into<String>,
    ) {
        self.character_positions.push(CharacterPosition::new(
            id,
            characters,
            position_description,
        ));
    }

    // === Reveal ===

    /// Clear a position's hidden flag.
    ///
    /// Returns the reveal narrative and nested triggers, or `None` if the
    /// position is unknown or already visible (revealing is one-way and
    /// idempotent).
    pub fn reveal_position(&mut self, id: &PositionId) -> Option<RevealOutcome> {
        if let Some(position) = self
            .character_positions
            .iter_mut()
            .find(|p| &p.id == id && p.hidden)
        {
            position.hidden = false;
            return Some(RevealOutcome {
                narration: position.reveal_description.clone(),
                chained: position.trigger_ids.clone(),
            });
        }
        if let Some(position) = self
            .object_positions
            .iter_mut()
            .find(|p| &p.id == id && p.hidden)
        {
            position.hidden = false;
            return Some(RevealOutcome {
                narration: position.reveal_description.clone(),
                chained: position.trigger_ids.clone(),
            });
        }
        None
    }

    // === Items ===

    /// Take an item from any visible object position.
    pub fn take_item(&mut self, id: &ItemId) -> Option<ItemId> {
        self.object_positions
            .iter_mut()
            .filter(|p| !p.hidden)
            .find_map(|p| p.take_item(id))
    }

    /// Items lying in visible object positions.
    #[must_use]
    pub fn visible_items(&self) -> Vec<ItemId> {
        self.object_positions
            .iter()
            .filter(|p| !p.hidden)
            .flat_map(|p| p.items.iter().cloned())
            .collect()
    }
}

/// Registry of environment prototypes, loaded once at session start.
///
/// `instantiate` hands out a fresh copy with the dwell counter at zero;
/// live environments are mutable session state, the catalog stays pristine.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentCatalog {
    environments: FxHashMap<LocationId, Environment>,
}

impl EnvironmentCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an environment prototype.
    pub fn register(&mut self, environment: Environment) {
        self.environments
            .insert(environment.id.clone(), environment);
    }

    /// Load from an id-keyed JSON object.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let raw: FxHashMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (id, mut value) in raw {
            // The catalog key is the id; inject it before deserializing.
            if let Some(object) = value.as_object_mut() {
                object.insert("id".to_string(), serde_json::Value::String(id.clone()));
            }
            let environment: Environment = serde_json::from_value(value)?;
            catalog.register(environment);
        }
        Ok(catalog)
    }

    /// Get a prototype by ID.
    #[must_use]
    pub fn get(&self, id: &LocationId) -> Option<&Environment> {
        self.environments.get(id)
    }

    /// Check if a location ID is registered.
    #[must_use]
    pub fn contains(&self, id: &LocationId) -> bool {
        self.environments.contains_key(id)
    }

    /// A fresh instance of a location, dwell counter zeroed.
    #[must_use]
    pub fn instantiate(&self, id: &LocationId) -> Option<Environment> {
        let mut environment = self.environments.get(id)?.clone();
        environment.reset_dwell();
        Some(environment)
    }

    /// Number of registered environments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.environments.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    /// Iterate over all prototypes.
    pub fn iter(&self) -> impl Iterator<Item = &Environment> {
        self.environments.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harbor() -> Environment {
        let mut env = Environment::new("loc_harbor", "Harbor", "A fog-bound harbor.");
        env.character_positions.push(
            CharacterPosition::new(
                "pos_quay",
                [CharacterName::new("Mira")],
                "by the quay",
            ),
        );
        env.character_positions.push(
            CharacterPosition::new("pos_loft", [CharacterName::new("Watcher")], "in the loft")
                .hidden("A figure stirs in the loft above.")
                .with_trigger("t_loft"),
        );
        env.object_positions.push(
            ObjectPosition::new("pos_crate", [ItemId::new("rope")], "inside a crate"),
        );
        env
    }

    #[test]
    fn test_dwell_is_monotone_until_reset() {
        let mut env = harbor();
        assert_eq!(env.dwell(), 0);

        let mut last = 0;
        for _ in 0..5 {
            env.increment_dwell();
            assert!(env.dwell() > last);
            last = env.dwell();
        }

        env.reset_dwell();
        assert_eq!(env.dwell(), 0);
    }

    #[test]
    fn test_presence() {
        let env = harbor();
        assert!(env.is_character_present(&CharacterName::new("Mira")));
        // Hidden characters still count as present; concealment is about
        // what the player can see, not who is in the room.
        assert!(env.is_character_present(&CharacterName::new("Watcher")));
        assert!(!env.is_character_present(&CharacterName::new("Jonas")));
    }

    #[test]
    fn test_import_characters() {
        let mut env = harbor();
        env.import_characters(
            "pos_door",
            [CharacterName::new("Jonas")],
            "at the doorway",
        );
        assert!(env.is_character_present(&CharacterName::new("Jonas")));
    }

    #[test]
    fn test_reveal_is_one_way_and_idempotent() {
        let mut env = harbor();

        let outcome = env.reveal_position(&PositionId::new("pos_loft")).unwrap();
        assert_eq!(
            outcome.narration.as_deref(),
            Some("A figure stirs in the loft above.")
        );
        assert_eq!(outcome.chained, vec![TriggerId::new("t_loft")]);

        // Already revealed: no second outcome.
        assert!(env.reveal_position(&PositionId::new("pos_loft")).is_none());
        // Unknown position: nothing.
        assert!(env.reveal_position(&PositionId::new("pos_ghost")).is_none());
    }

    #[test]
    fn test_take_item_only_from_visible_positions() {
        let mut env = harbor();
        env.object_positions.push(
            ObjectPosition::new("pos_cache", [ItemId::new("coin")], "under a board")
                .hidden("A loose board hides a cache."),
        );

        assert_eq!(env.take_item(&ItemId::new("rope")), Some(ItemId::new("rope")));
        assert_eq!(env.take_item(&ItemId::new("coin")), None);

        env.reveal_position(&PositionId::new("pos_cache"));
        assert_eq!(env.take_item(&ItemId::new("coin")), Some(ItemId::new("coin")));
    }

    #[test]
    fn test_armed_triggers_drain() {
        use crate::triggers::{TriggerDef, TriggerKind};

        let mut env = harbor();
        let def = TriggerDef::new("t_describe", TriggerKind::DescribeLocation);
        let armed = def
            .prepare(
                &crate::quests::QuestLog::new(),
                &env,
                &mut crate::core::GameRng::new(42),
            )
            .unwrap();

        env.arm_trigger(armed);
        assert_eq!(env.armed_count(), 1);

        let drained = env.drain_armed();
        assert_eq!(drained.len(), 1);
        assert_eq!(env.armed_count(), 0);
    }

    #[test]
    fn test_catalog_instantiate_resets_dwell() {
        let mut prototype = harbor();
        prototype.increment_dwell();
        prototype.increment_dwell();

        let mut catalog = EnvironmentCatalog::new();
        catalog.register(prototype);

        let instance = catalog
            .instantiate(&LocationId::new("loc_harbor"))
            .unwrap();
        assert_eq!(instance.dwell(), 0);
        // The catalog prototype is untouched.
        assert_eq!(catalog.get(&LocationId::new("loc_harbor")).unwrap().dwell(), 2);
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{
            "loc_harbor": {
                "name": "Harbor",
                "description": "A fog-bound harbor.",
                "visual_description": "Grey water, grey sky.",
                "trigger_ids": ["t_entry"],
                "connections": ["loc_tavern"],
                "character_positions": [
                    {
                        "id": "pos_quay",
                        "characters": ["Mira"],
                        "position_description": "by the quay"
                    }
                ],
                "object_positions": []
            }
        }"#;

        let catalog = EnvironmentCatalog::from_json_str(json).unwrap();
        let env = catalog.get(&LocationId::new("loc_harbor")).unwrap();
        assert_eq!(env.visual_description, "Grey water, grey sky.");
        assert_eq!(env.connections, vec![LocationId::new("loc_tavern")]);
        assert!(env.is_character_present(&CharacterName::new("Mira")));
    }
}
