//! Trigger definitions and the arming step.
//!
//! A [`TriggerDef`] is a reusable template from the static catalog. It is
//! validated (`prepare`) every time its owning scope runs; passing takes it
//! to the Armed state as an [`ArmedTrigger`] carrying a per-arming attribute
//! stash. Firing is tracked in the quest log's exclusion ledger, never by
//! consuming the definition - definitions live for the whole session.
//!
//! Variants are a closed tagged enum. A new trigger class is a new case
//! sharing the same gating and activation contract, not a subclass.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::core::{Attributes, GameRng, PositionId, QuestId, TriggerId};
use crate::environment::Environment;
use crate::quests::QuestLog;

use super::gating::{DwellGate, PresenceMode, TriggerGates};

/// The closed set of trigger variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerKind {
    /// Fires once on arrival, while the dwell counter is still zero.
    OnEntry,
    /// Fires when the player leaves the location. Only validated during the
    /// departure pass, never during a normal environment turn.
    OnExit,
    /// Fires when the dwell counter satisfies the configured comparison.
    TurnsInLocation,
    /// Emits the location's visual description as stage narration.
    DescribeLocation,
    /// Fires when any of the named characters share the location;
    /// activation imports them into play and opens dialogue.
    TriggerEventAnyCharacter,
    /// As above, but every named character must be present.
    TriggerEventAllCharacter,
    /// Discloses the named hidden positions, emitting each one's reveal
    /// narrative and chaining its nested triggers.
    Reveal {
        /// Positions to uncover.
        targets: SmallVec<[PositionId; 2]>,
    },
    /// Nested under a hidden position; chained when that position is
    /// revealed. Carries its own narrative.
    OnReveal,
}

impl TriggerKind {
    /// Catalog tag for this variant.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::OnEntry => "on_entry",
            Self::OnExit => "on_exit",
            Self::TurnsInLocation => "turns_in_location",
            Self::DescribeLocation => "describe_location",
            Self::TriggerEventAnyCharacter => "trigger_event_any_character",
            Self::TriggerEventAllCharacter => "trigger_event_all_character",
            Self::Reveal { .. } => "reveal",
            Self::OnReveal => "on_reveal",
        }
    }

    /// Whether this variant only runs during the departure pass.
    #[must_use]
    pub const fn is_exit(&self) -> bool {
        matches!(self, Self::OnExit)
    }
}

/// A trigger template from the static catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerDef {
    /// Unique identifier.
    pub id: TriggerId,

    /// Which variant this is.
    #[serde(flatten)]
    pub kind: TriggerKind,

    /// Narration emitted on activation, if any.
    #[serde(default)]
    pub narrative_prompt: Option<String>,

    /// Triggers chained on activation. Chained triggers re-run the full
    /// gating before they arm; there is no bypass.
    #[serde(default)]
    pub ids_to_trigger: SmallVec<[TriggerId; 4]>,

    /// Ids recorded into the exclusion ledger on activation, making every
    /// listed trigger (usually this one) permanently un-armable.
    #[serde(default)]
    pub ids_to_exclude: SmallVec<[TriggerId; 2]>,

    /// Quests taken on when this trigger fires.
    #[serde(default)]
    pub quests_to_activate: SmallVec<[QuestId; 2]>,

    /// Quests marked completed when this trigger fires.
    #[serde(default)]
    pub quests_to_complete: SmallVec<[QuestId; 2]>,

    /// Gate parameters.
    #[serde(flatten)]
    pub gates: TriggerGates,
}

impl TriggerDef {
    /// Create a definition with no gates and no chains.
    pub fn new(id: impl Into<TriggerId>, kind: TriggerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            narrative_prompt: None,
            ids_to_trigger: SmallVec::new(),
            ids_to_exclude: SmallVec::new(),
            quests_to_activate: SmallVec::new(),
            quests_to_complete: SmallVec::new(),
            gates: TriggerGates::none(),
        }
    }

    /// Set the narration (builder pattern).
    #[must_use]
    pub fn with_narrative(mut self, prompt: impl Into<String>) -> Self {
        self.narrative_prompt = Some(prompt.into());
        self
    }

    /// Add a chained trigger (builder pattern).
    #[must_use]
    pub fn chains(mut self, id: impl Into<TriggerId>) -> Self {
        self.ids_to_trigger.push(id.into());
        self
    }

    /// Add an exclusion id (builder pattern).
    #[must_use]
    pub fn excludes(mut self, id: impl Into<TriggerId>) -> Self {
        self.ids_to_exclude.push(id.into());
        self
    }

    /// Activate a quest on firing (builder pattern).
    #[must_use]
    pub fn grants_quest(mut self, id: impl Into<QuestId>) -> Self {
        self.quests_to_activate.push(id.into());
        self
    }

    /// Complete a quest on firing (builder pattern).
    #[must_use]
    pub fn completes_quest(mut self, id: impl Into<QuestId>) -> Self {
        self.quests_to_complete.push(id.into());
        self
    }

    /// Replace the gates (builder pattern).
    #[must_use]
    pub fn with_gates(mut self, gates: TriggerGates) -> Self {
        self.gates = gates;
        self
    }

    /// The dwell gate this variant actually checks.
    ///
    /// OnEntry pins dwell to zero regardless of configuration; OnExit has
    /// no dwell gate (its scope is the departure pass); everything else
    /// uses the configured gate, if any.
    #[must_use]
    fn effective_dwell_gate(&self) -> Option<DwellGate> {
        match self.kind {
            TriggerKind::OnEntry => Some(DwellGate::at(0)),
            TriggerKind::OnExit => None,
            _ => self.gates.dwell,
        }
    }

    /// The presence mode this variant checks with.
    #[must_use]
    fn effective_presence_mode(&self) -> PresenceMode {
        match self.kind {
            TriggerKind::TriggerEventAnyCharacter => PresenceMode::Any,
            TriggerKind::TriggerEventAllCharacter => PresenceMode::All,
            _ => self.gates.presence,
        }
    }

    /// Validate every gate against current state.
    ///
    /// Returns the armed trigger on pass, `None` on fail. Nothing is
    /// mutated on fail; calling again next round is safe and expected.
    pub fn prepare(
        &self,
        quest_log: &QuestLog,
        environment: &Environment,
        rng: &mut GameRng,
    ) -> Option<ArmedTrigger> {
        // A trigger on the exclusion ledger never re-arms, whatever its
        // configured gates say. This is what makes ids_to_exclude an
        // at-most-once guarantee.
        if quest_log.is_trigger_completed(&self.id) {
            debug!(trigger = %self.id, "already on the exclusion ledger");
            return None;
        }

        if !self.gates.quest_gates_pass(quest_log) {
            debug!(trigger = %self.id, "quest gate failed");
            return None;
        }

        let present = environment.characters_present();
        let mut gates = self.gates.clone();
        gates.presence = self.effective_presence_mode();
        if !gates.presence_gate_passes(&present) {
            debug!(trigger = %self.id, "presence gate failed");
            return None;
        }

        if !self.gates.chance_gate_passes(rng) {
            debug!(trigger = %self.id, "chance gate failed");
            return None;
        }

        if let Some(gate) = self.effective_dwell_gate() {
            if !gate.passes(environment.dwell()) {
                debug!(trigger = %self.id, dwell = environment.dwell(), "dwell gate failed");
                return None;
            }
        }

        // All gates passed; stash what activation will need.
        let mut attributes = Attributes::default();
        match self.kind {
            TriggerKind::TriggerEventAnyCharacter | TriggerKind::TriggerEventAllCharacter => {
                attributes.insert(
                    "characters".into(),
                    self.gates.matched_characters(&present).into(),
                );
            }
            TriggerKind::DescribeLocation => {
                attributes.insert(
                    "description".into(),
                    environment.visual_description.clone().into(),
                );
            }
            _ => {}
        }

        debug!(trigger = %self.id, "armed");
        Some(ArmedTrigger {
            id: self.id.clone(),
            kind: self.kind.clone(),
            narrative_prompt: self.narrative_prompt.clone(),
            ids_to_trigger: self.ids_to_trigger.clone(),
            ids_to_exclude: self.ids_to_exclude.clone(),
            quests_to_activate: self.quests_to_activate.clone(),
            quests_to_complete: self.quests_to_complete.clone(),
            attributes,
        })
    }
}

/// A trigger that passed validation this pass, queued for activation.
///
/// Snapshot of the definition plus the per-arming attribute stash; the
/// stash is scoped to this instance and discarded if activation never runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArmedTrigger {
    /// The definition's id.
    pub id: TriggerId,
    /// The definition's variant.
    pub kind: TriggerKind,
    /// Narration emitted on activation.
    pub narrative_prompt: Option<String>,
    /// Chained trigger ids.
    pub ids_to_trigger: SmallVec<[TriggerId; 4]>,
    /// Exclusion ids recorded on activation.
    pub ids_to_exclude: SmallVec<[TriggerId; 2]>,
    /// Quests taken on at activation.
    pub quests_to_activate: SmallVec<[QuestId; 2]>,
    /// Quests completed at activation.
    pub quests_to_complete: SmallVec<[QuestId; 2]>,
    /// Data derived during validation for activation to consume.
    pub attributes: Attributes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CharacterName;
    use crate::environment::positions::CharacterPosition;

    fn empty_env() -> Environment {
        Environment::new("loc_harbor", "Harbor", "A fog-bound harbor.")
    }

    fn env_with(names: &[&str]) -> Environment {
        let mut env = empty_env();
        for name in names {
            env.character_positions.push(CharacterPosition::new(
                format!("pos_{name}").as_str(),
                [CharacterName::new(*name)],
                format!("{name} stands by the quay"),
            ));
        }
        env
    }

    #[test]
    fn test_prepare_ungated_arms() {
        let def = TriggerDef::new("t_describe", TriggerKind::DescribeLocation);
        let armed = def
            .prepare(&QuestLog::new(), &empty_env(), &mut GameRng::new(42))
            .unwrap();

        assert_eq!(armed.id, TriggerId::new("t_describe"));
        assert_eq!(
            crate::core::attributes::get_text(&armed.attributes, "description"),
            Some("A fog-bound harbor.")
        );
    }

    #[test]
    fn test_on_entry_only_at_dwell_zero() {
        let def = TriggerDef::new("t_entry", TriggerKind::OnEntry);
        let mut env = empty_env();
        let mut rng = GameRng::new(42);

        assert!(def.prepare(&QuestLog::new(), &env, &mut rng).is_some());

        env.increment_dwell();
        assert!(def.prepare(&QuestLog::new(), &env, &mut rng).is_none());
    }

    #[test]
    fn test_quest_gate_blocks_independently() {
        let mut def = TriggerDef::new("t_gated", TriggerKind::DescribeLocation);
        def.gates
            .req_active_quest_ids
            .push(crate::core::QuestId::new("q_intro"));

        let mut rng = GameRng::new(42);
        assert!(def
            .prepare(&QuestLog::new(), &empty_env(), &mut rng)
            .is_none());

        let mut log = QuestLog::new();
        log.activate_quest(crate::core::QuestId::new("q_intro"));
        assert!(def.prepare(&log, &empty_env(), &mut rng).is_some());
    }

    #[test]
    fn test_chance_gate_blocks_independently() {
        let mut def = TriggerDef::new("t_rare", TriggerKind::DescribeLocation);
        def.gates.chance = 0.0;

        assert!(def
            .prepare(&QuestLog::new(), &empty_env(), &mut GameRng::new(42))
            .is_none());
    }

    #[test]
    fn test_dwell_gate_blocks_independently() {
        let mut def = TriggerDef::new("t_dwell", TriggerKind::TurnsInLocation);
        def.gates.dwell = Some(DwellGate {
            threshold: 2,
            comparator: super::super::gating::Comparator::GreaterOrEqual,
        });

        let mut env = empty_env();
        let mut rng = GameRng::new(42);
        assert!(def.prepare(&QuestLog::new(), &env, &mut rng).is_none());

        env.increment_dwell();
        env.increment_dwell();
        assert!(def.prepare(&QuestLog::new(), &env, &mut rng).is_some());
    }

    #[test]
    fn test_presence_gate_blocks_independently() {
        let mut def = TriggerDef::new("t_meet", TriggerKind::TriggerEventAnyCharacter);
        def.gates
            .required_characters
            .push(CharacterName::new("Mira"));

        let mut rng = GameRng::new(42);
        assert!(def
            .prepare(&QuestLog::new(), &empty_env(), &mut rng)
            .is_none());

        let armed = def
            .prepare(&QuestLog::new(), &env_with(&["Mira"]), &mut rng)
            .unwrap();
        assert_eq!(
            crate::core::attributes::get_text_list(&armed.attributes, "characters"),
            Some(&["Mira".to_string()][..])
        );
    }

    #[test]
    fn test_all_character_variant_needs_everyone() {
        let mut def = TriggerDef::new("t_council", TriggerKind::TriggerEventAllCharacter);
        def.gates
            .required_characters
            .push(CharacterName::new("Mira"));
        def.gates
            .required_characters
            .push(CharacterName::new("Jonas"));

        let mut rng = GameRng::new(42);
        assert!(def
            .prepare(&QuestLog::new(), &env_with(&["Mira"]), &mut rng)
            .is_none());
        assert!(def
            .prepare(&QuestLog::new(), &env_with(&["Mira", "Jonas"]), &mut rng)
            .is_some());
    }

    #[test]
    fn test_excluded_trigger_never_rearms() {
        let def = TriggerDef::new("t_once", TriggerKind::OnEntry)
            .excludes("t_once")
            .with_gates({
                let mut gates = TriggerGates::none();
                gates.excluded_trigger_ids.push(TriggerId::new("t_once"));
                gates
            });

        let mut log = QuestLog::new();
        let env = empty_env();
        let mut rng = GameRng::new(42);

        assert!(def.prepare(&log, &env, &mut rng).is_some());

        // Activation records the exclusion; arming must now always fail.
        log.record_completed_trigger(TriggerId::new("t_once"));
        for _ in 0..5 {
            assert!(def.prepare(&log, &env, &mut rng).is_none());
        }
    }

    #[test]
    fn test_failed_prepare_mutates_nothing() {
        let mut def = TriggerDef::new("t_gated", TriggerKind::DescribeLocation);
        def.gates
            .req_active_quest_ids
            .push(crate::core::QuestId::new("q_missing"));

        let log = QuestLog::new();
        let env = empty_env();
        let before_log = log.clone();

        let mut rng = GameRng::new(42);
        assert!(def.prepare(&log, &env, &mut rng).is_none());
        assert_eq!(log, before_log);
        assert_eq!(env.armed_count(), 0);
    }

    #[test]
    fn test_kind_serde_tags() {
        let def = TriggerDef::new(
            "t_reveal",
            TriggerKind::Reveal {
                targets: smallvec::smallvec![PositionId::new("pos_cellar")],
            },
        );
        let json = serde_json::to_string(&def).unwrap();
        assert!(json.contains("\"kind\":\"reveal\""));

        let back: TriggerDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }
}
