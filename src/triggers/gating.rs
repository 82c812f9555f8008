//! Trigger gating.
//!
//! Arming a trigger is a boolean AND across independent gates, each checked
//! against current state: quest ledgers, character presence, a chance draw,
//! and the dwell counter. Every gate is optional; an unconfigured gate
//! passes. Evaluation never mutates anything, so a failed `prepare` can be
//! retried every round.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{CharacterName, GameRng, QuestId, TriggerId};
use crate::error::EngineError;
use crate::quests::QuestLog;

/// Comparison operator for the dwell gate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[default]
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "!=")]
    NotEqual,
}

impl Comparator {
    /// Apply the comparison.
    #[must_use]
    pub const fn compare(self, value: u32, threshold: u32) -> bool {
        match self {
            Self::Greater => value > threshold,
            Self::Less => value < threshold,
            Self::Equal => value == threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::LessOrEqual => value <= threshold,
            Self::NotEqual => value != threshold,
        }
    }

    /// The comparison symbol as it appears in catalog data.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greater => ">",
            Self::Less => "<",
            Self::Equal => "==",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::NotEqual => "!=",
        }
    }

    /// Parse a comparison symbol.
    pub fn parse(sign: &str) -> Result<Self, EngineError> {
        match sign {
            ">" => Ok(Self::Greater),
            "<" => Ok(Self::Less),
            "==" => Ok(Self::Equal),
            ">=" => Ok(Self::GreaterOrEqual),
            "<=" => Ok(Self::LessOrEqual),
            "!=" => Ok(Self::NotEqual),
            other => Err(EngineError::Configuration(format!(
                "invalid comparison sign: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dwell gate: compare `turns_in_location` to a threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DwellGate {
    /// Turn count compared against.
    pub threshold: u32,
    /// How to compare.
    #[serde(default)]
    pub comparator: Comparator,
}

impl DwellGate {
    /// Gate that fires exactly at a given dwell count.
    #[must_use]
    pub const fn at(threshold: u32) -> Self {
        Self {
            threshold,
            comparator: Comparator::Equal,
        }
    }

    /// Check the gate against a dwell count.
    #[must_use]
    pub const fn passes(self, dwell: u32) -> bool {
        self.comparator.compare(dwell, self.threshold)
    }
}

/// Whether a presence gate needs some or all of its characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceMode {
    /// Any one named character present suffices.
    #[default]
    Any,
    /// Every named character must be present.
    All,
}

/// The full gate set on a trigger.
///
/// Field names mirror the catalog JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerGates {
    /// Quests that must all be active.
    #[serde(default)]
    pub req_active_quest_ids: SmallVec<[QuestId; 2]>,

    /// Quests that must all be completed.
    #[serde(default)]
    pub req_completed_quest_ids: SmallVec<[QuestId; 2]>,

    /// Quests none of which may be active.
    #[serde(default)]
    pub excluded_active_quest_ids: SmallVec<[QuestId; 2]>,

    /// Quests none of which may be completed.
    #[serde(default)]
    pub excluded_completed_quest_ids: SmallVec<[QuestId; 2]>,

    /// Triggers none of which may have fired (the idempotence gate).
    #[serde(default)]
    pub excluded_trigger_ids: SmallVec<[TriggerId; 2]>,

    /// Characters the presence gate names. Empty means no presence gate.
    #[serde(default)]
    pub required_characters: SmallVec<[CharacterName; 2]>,

    /// Any-of or all-of semantics for `required_characters`.
    #[serde(default)]
    pub presence: PresenceMode,

    /// Probability the chance gate passes. Default 1.0 (no gate).
    #[serde(default = "default_chance")]
    pub chance: f64,

    /// Optional dwell gate.
    #[serde(default)]
    pub dwell: Option<DwellGate>,
}

fn default_chance() -> f64 {
    1.0
}

impl Default for TriggerGates {
    fn default() -> Self {
        Self {
            req_active_quest_ids: SmallVec::new(),
            req_completed_quest_ids: SmallVec::new(),
            excluded_active_quest_ids: SmallVec::new(),
            excluded_completed_quest_ids: SmallVec::new(),
            excluded_trigger_ids: SmallVec::new(),
            required_characters: SmallVec::new(),
            presence: PresenceMode::default(),
            chance: 1.0,
            dwell: None,
        }
    }
}

impl TriggerGates {
    /// Gates that always pass.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Quest gating: required-active and required-completed must be subsets
    /// of their ledgers; excluded sets must be disjoint from theirs; no
    /// excluded trigger may already be on the exclusion ledger.
    #[must_use]
    pub fn quest_gates_pass(&self, quest_log: &QuestLog) -> bool {
        self.req_active_quest_ids
            .iter()
            .all(|id| quest_log.is_quest_active(id))
            && self
                .req_completed_quest_ids
                .iter()
                .all(|id| quest_log.is_quest_completed(id))
            && !self
                .excluded_active_quest_ids
                .iter()
                .any(|id| quest_log.is_quest_active(id))
            && !self
                .excluded_completed_quest_ids
                .iter()
                .any(|id| quest_log.is_quest_completed(id))
            && !self
                .excluded_trigger_ids
                .iter()
                .any(|id| quest_log.is_trigger_completed(id))
    }

    /// Presence gating against the characters currently in the location.
    #[must_use]
    pub fn presence_gate_passes(&self, present: &[CharacterName]) -> bool {
        if self.required_characters.is_empty() {
            return true;
        }
        match self.presence {
            PresenceMode::Any => self
                .required_characters
                .iter()
                .any(|name| present.contains(name)),
            PresenceMode::All => self
                .required_characters
                .iter()
                .all(|name| present.contains(name)),
        }
    }

    /// The named characters that are actually present, for the activation
    /// attribute stash.
    #[must_use]
    pub fn matched_characters(&self, present: &[CharacterName]) -> Vec<String> {
        self.required_characters
            .iter()
            .filter(|name| present.contains(name))
            .map(|name| name.as_str().to_string())
            .collect()
    }

    /// Stochastic gating: one Bernoulli draw.
    pub fn chance_gate_passes(&self, rng: &mut GameRng) -> bool {
        if (self.chance - 1.0).abs() < f64::EPSILON {
            return true;
        }
        rng.gen_bool(self.chance)
    }

    /// Dwell gating, if configured.
    #[must_use]
    pub fn dwell_gate_passes(&self, dwell: u32) -> bool {
        self.dwell.map_or(true, |gate| gate.passes(dwell))
    }
}
