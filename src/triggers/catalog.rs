//! The trigger catalog: the static registry every trigger id resolves
//! through.
//!
//! Loading validates the whole configuration up front. Dangling chained
//! ids, variants missing their required parameters, and chain cycles that
//! could refire forever are all rejected before the session starts - a bad
//! catalog never reaches the reconciler.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

use crate::core::TriggerId;
use crate::error::EngineError;

use super::definition::{TriggerDef, TriggerKind};

/// Registry of trigger definitions.
#[derive(Clone, Debug, Default)]
pub struct TriggerCatalog {
    triggers: FxHashMap<TriggerId, TriggerDef>,
}

impl TriggerCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger definition. Call [`validate`](Self::validate)
    /// after the last registration.
    pub fn register(&mut self, def: TriggerDef) {
        self.triggers.insert(def.id.clone(), def);
    }

    /// Load from an id-keyed JSON object and validate.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let raw: FxHashMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (id, mut value) in raw {
            // The catalog key is the id; inject it before deserializing.
            if let Some(object) = value.as_object_mut() {
                object.insert("id".to_string(), serde_json::Value::String(id.clone()));
            }
            let def: TriggerDef = serde_json::from_value(value)
                .map_err(|err| EngineError::Configuration(format!("trigger {id}: {err}")))?;
            catalog.register(def);
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Get a trigger definition by ID.
    #[must_use]
    pub fn get(&self, id: &TriggerId) -> Option<&TriggerDef> {
        self.triggers.get(id)
    }

    /// Resolve an id that must exist.
    pub fn resolve(&self, id: &TriggerId) -> Result<&TriggerDef, EngineError> {
        self.triggers
            .get(id)
            .ok_or_else(|| EngineError::unknown_id("trigger", id.as_str()))
    }

    /// Check if a trigger ID is registered.
    #[must_use]
    pub fn contains(&self, id: &TriggerId) -> bool {
        self.triggers.contains_key(id)
    }

    /// Get the number of registered triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Iterate over all trigger definitions.
    pub fn iter(&self) -> impl Iterator<Item = &TriggerDef> {
        self.triggers.values()
    }

    /// Validate the whole configuration.
    ///
    /// Checks per definition:
    /// - every chained id resolves
    /// - `TurnsInLocation` carries a dwell gate
    /// - presence variants name at least one character
    /// - `Reveal` names at least one target
    /// - chance is a probability
    ///
    /// And across the chain graph: any cycle must contain at least one
    /// member that excludes a member of that cycle, otherwise the cycle
    /// could refire forever and the configuration is rejected.
    pub fn validate(&self) -> Result<(), EngineError> {
        for def in self.triggers.values() {
            for chained in &def.ids_to_trigger {
                if !self.contains(chained) {
                    return Err(EngineError::Configuration(format!(
                        "trigger {} chains to unknown trigger {}",
                        def.id.as_str(),
                        chained.as_str()
                    )));
                }
            }

            match &def.kind {
                TriggerKind::TurnsInLocation if def.gates.dwell.is_none() => {
                    return Err(EngineError::Configuration(format!(
                        "turns_in_location trigger {} has no dwell gate",
                        def.id.as_str()
                    )));
                }
                TriggerKind::TriggerEventAnyCharacter | TriggerKind::TriggerEventAllCharacter
                    if def.gates.required_characters.is_empty() =>
                {
                    return Err(EngineError::Configuration(format!(
                        "character event trigger {} names no characters",
                        def.id.as_str()
                    )));
                }
                TriggerKind::Reveal { targets } if targets.is_empty() => {
                    return Err(EngineError::Configuration(format!(
                        "reveal trigger {} has no targets",
                        def.id.as_str()
                    )));
                }
                _ => {}
            }

            if !(0.0..=1.0).contains(&def.gates.chance) {
                return Err(EngineError::Configuration(format!(
                    "trigger {} has chance {} outside [0, 1]",
                    def.id.as_str(),
                    def.gates.chance
                )));
            }
        }

        self.validate_cycles()
    }

    /// Reject chain cycles with no exclusion anywhere in the cycle.
    fn validate_cycles(&self) -> Result<(), EngineError> {
        let mut checked: FxHashSet<TriggerId> = FxHashSet::default();

        for id in self.triggers.keys() {
            if checked.contains(id) {
                continue;
            }

            let reach = self.reachable_from(id);
            if !reach.contains(id) {
                // Not on a cycle through itself.
                continue;
            }

            // The strongly connected component: every member reaches back.
            let cycle: Vec<TriggerId> = reach
                .iter()
                .filter(|member| self.reachable_from(member).contains(id))
                .cloned()
                .collect();
            checked.extend(cycle.iter().cloned());

            let excluded_somewhere = cycle.iter().any(|member| {
                self.triggers[member]
                    .ids_to_exclude
                    .iter()
                    .any(|excluded| cycle.contains(excluded))
            });

            if !excluded_somewhere {
                let mut members: Vec<&str> = cycle.iter().map(TriggerId::as_str).collect();
                members.sort_unstable();
                warn!(cycle = ?members, "rejecting unexcluded trigger cycle");
                return Err(EngineError::Configuration(format!(
                    "trigger cycle [{}] has no member excluding the cycle; it would refire forever",
                    members.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Every trigger reachable by following chains from `start`.
    fn reachable_from(&self, start: &TriggerId) -> FxHashSet<TriggerId> {
        let mut seen: FxHashSet<TriggerId> = FxHashSet::default();
        let mut worklist: Vec<&TriggerId> = match self.triggers.get(start) {
            Some(def) => def.ids_to_trigger.iter().collect(),
            None => Vec::new(),
        };

        while let Some(id) = worklist.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(def) = self.triggers.get(id) {
                worklist.extend(def.ids_to_trigger.iter());
            }
        }
        seen
    }
}
