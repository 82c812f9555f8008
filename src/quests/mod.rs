//! Quests and the per-player quest log.
//!
//! The quest log is pure gating data: which quests are active, which are
//! completed, and which triggers have already fired. The completed-trigger
//! set doubles as the exclusion ledger that gives triggers their
//! at-most-once guarantee - a trigger records its exclusion ids here during
//! activation, and validation refuses to re-arm anything already recorded.
//!
//! The log is mutated only by trigger activation and explicit quest
//! completion events; nothing else writes to it.

use im::HashSet as ImHashSet;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{QuestId, TriggerId};
use crate::error::EngineError;

/// A quest definition from the static catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Unique identifier.
    pub id: QuestId,
    /// Human-readable name.
    pub name: String,
    /// Description shown when the quest is taken on.
    #[serde(default)]
    pub description: String,
}

/// Registry of quest definitions, loaded once at session start.
#[derive(Clone, Debug, Default)]
pub struct QuestCatalog {
    quests: FxHashMap<QuestId, Quest>,
}

impl QuestCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a quest definition.
    pub fn register(&mut self, quest: Quest) {
        self.quests.insert(quest.id.clone(), quest);
    }

    /// Load from an id-keyed JSON object: `{"q_intro": {"name": ...}, ...}`.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        #[derive(Deserialize)]
        struct QuestData {
            name: String,
            #[serde(default)]
            description: String,
        }

        let raw: FxHashMap<String, QuestData> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (id, data) in raw {
            catalog.register(Quest {
                id: QuestId::new(id),
                name: data.name,
                description: data.description,
            });
        }
        Ok(catalog)
    }

    /// Get a quest definition by ID.
    #[must_use]
    pub fn get(&self, id: &QuestId) -> Option<&Quest> {
        self.quests.get(id)
    }

    /// Check if a quest ID is registered.
    #[must_use]
    pub fn contains(&self, id: &QuestId) -> bool {
        self.quests.contains_key(id)
    }

    /// Get the number of registered quests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Iterate over all quest definitions.
    pub fn iter(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }
}

/// Per-player ledger of quest and trigger state.
///
/// Uses `im` persistent sets so save snapshots and look-back copies are
/// cheap clones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestLog {
    /// Quests currently being pursued.
    active_quest_ids: ImHashSet<QuestId>,

    /// Quests finished, successfully or not.
    completed_quest_ids: ImHashSet<QuestId>,

    /// Triggers that have recorded an exclusion here. Doubles as the
    /// idempotence ledger for trigger arming.
    completed_trigger_ids: ImHashSet<TriggerId>,
}

impl QuestLog {
    /// Create a new empty quest log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take on a quest. Returns false if it is already active or completed.
    pub fn activate_quest(&mut self, id: QuestId) -> bool {
        if self.completed_quest_ids.contains(&id) || self.active_quest_ids.contains(&id) {
            return false;
        }
        self.active_quest_ids.insert(id);
        true
    }

    /// Complete a quest, moving it from active to completed.
    ///
    /// Completing a quest that was never active still records it completed.
    pub fn complete_quest(&mut self, id: QuestId) {
        self.active_quest_ids.remove(&id);
        self.completed_quest_ids.insert(id);
    }

    /// Record a trigger id in the exclusion ledger.
    pub fn record_completed_trigger(&mut self, id: TriggerId) {
        self.completed_trigger_ids.insert(id);
    }

    /// Check whether a quest is active.
    #[must_use]
    pub fn is_quest_active(&self, id: &QuestId) -> bool {
        self.active_quest_ids.contains(id)
    }

    /// Check whether a quest is completed.
    #[must_use]
    pub fn is_quest_completed(&self, id: &QuestId) -> bool {
        self.completed_quest_ids.contains(id)
    }

    /// Check whether a trigger has recorded an exclusion.
    #[must_use]
    pub fn is_trigger_completed(&self, id: &TriggerId) -> bool {
        self.completed_trigger_ids.contains(id)
    }

    /// The set of active quest ids.
    #[must_use]
    pub fn active_quest_ids(&self) -> &ImHashSet<QuestId> {
        &self.active_quest_ids
    }

    /// The set of completed quest ids.
    #[must_use]
    pub fn completed_quest_ids(&self) -> &ImHashSet<QuestId> {
        &self.completed_quest_ids
    }

    /// The exclusion ledger.
    #[must_use]
    pub fn completed_trigger_ids(&self) -> &ImHashSet<TriggerId> {
        &self.completed_trigger_ids
    }
}
