//! The turn controller: one `Game` session.
//!
//! `play` is the sole externally invoked operation per round. One call
//! processes the current turn - player queue drain, environment pass, NPC
//! reactions, save, or quit - and returns the ordered narrations it
//! produced. The session is single-threaded and strictly turn-based: a
//! round completes, including all chained trigger reconciliation, before
//! the next input is accepted.

pub mod actions;
pub mod agent;
pub mod mode;
pub mod narration;

mod activation;
mod reconciler;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::GameData;
use crate::characters::{Character, Player};
use crate::combat;
use crate::core::{CharacterName, GameRng, GameRngState, ItemId, LocationId};
use crate::environment::Environment;
use crate::error::{EngineError, Rejection};

use actions::ActionKind;
use agent::{MediaGenerator, NarrativeAgent};
use mode::{GameMode, Turn};
use narration::Narration;

pub use actions::catalog_for;
pub use agent::{
    ActionInvocation, ActionParam, ActionSpec, MediaArtifacts, NullMediaGenerator, ScriptedAgent,
};

/// Serializable session snapshot, produced on save and quit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveSnapshot {
    /// The player, quest log included.
    pub player: Player,
    /// Every NPC's live state.
    pub roster: FxHashMap<CharacterName, Character>,
    /// RNG position, so a restored session replays identically.
    pub rng: GameRngState,
    /// Turn at save time.
    pub turn: Turn,
    /// Mode at save time.
    pub game_mode: GameMode,
    /// Characters in active play.
    pub in_focus: Vec<CharacterName>,
}

/// One game session: the player, the live environment, every NPC, and the
/// turn/mode state machine. Owns all mutable state exclusively.
pub struct Game {
    data: GameData,
    player: Player,
    roster: FxHashMap<CharacterName, Character>,
    in_focus: Vec<CharacterName>,
    environment: Environment,
    turn: Turn,
    game_mode: GameMode,
    rng: GameRng,
    narrations: Vec<Narration>,
    history: Vec<Narration>,
    last_snapshot: Option<String>,
    finished: bool,
    narrative_agent: Box<dyn NarrativeAgent>,
    media: Box<dyn MediaGenerator>,
}

impl Game {
    /// Start a session. The player's location must exist in the
    /// environment catalog.
    pub fn new(
        data: GameData,
        player: Player,
        narrative_agent: Box<dyn NarrativeAgent>,
        media: Box<dyn MediaGenerator>,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let environment = data
            .environments
            .instantiate(&player.location)
            .ok_or_else(|| EngineError::unknown_id("location", player.location.as_str()))?;
        let roster = data.characters.clone();

        Ok(Self {
            data,
            player,
            roster,
            in_focus: Vec::new(),
            environment,
            turn: Turn::Player,
            game_mode: GameMode::Explore,
            rng: GameRng::new(seed),
            narrations: Vec::new(),
            history: Vec::new(),
            last_snapshot: None,
            finished: false,
            narrative_agent,
            media,
        })
    }

    /// Restore a session from a save snapshot produced by
    /// [`save_snapshot`](Self::save_snapshot).
    pub fn from_snapshot(
        data: GameData,
        snapshot_json: &str,
        narrative_agent: Box<dyn NarrativeAgent>,
        media: Box<dyn MediaGenerator>,
    ) -> Result<Self, EngineError> {
        let snapshot: SaveSnapshot = serde_json::from_str(snapshot_json)?;
        let environment = data
            .environments
            .instantiate(&snapshot.player.location)
            .ok_or_else(|| {
                EngineError::unknown_id("location", snapshot.player.location.as_str())
            })?;

        Ok(Self {
            data,
            player: snapshot.player,
            roster: snapshot.roster,
            in_focus: snapshot.in_focus,
            environment,
            turn: snapshot.turn,
            game_mode: snapshot.game_mode,
            rng: GameRng::from_state(&snapshot.rng),
            narrations: Vec::new(),
            history: Vec::new(),
            last_snapshot: None,
            finished: false,
            narrative_agent,
            media,
        })
    }

    // === Accessors ===

    /// The current turn.
    #[must_use]
    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// The current game mode.
    #[must_use]
    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable player access.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// The live environment.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Mutable environment access.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// The static catalogs.
    #[must_use]
    pub fn data(&self) -> &GameData {
        &self.data
    }

    /// An NPC by name, if they exist.
    #[must_use]
    pub fn npc(&self, name: &CharacterName) -> Option<&Character> {
        self.roster.get(name)
    }

    /// Mutable NPC access.
    pub fn npc_mut(&mut self, name: &CharacterName) -> Option<&mut Character> {
        self.roster.get_mut(name)
    }

    /// Add an NPC to the session roster.
    pub fn add_npc(&mut self, character: Character) {
        self.roster.insert(character.name.clone(), character);
    }

    /// Characters currently in active play.
    #[must_use]
    pub fn characters_in_focus(&self) -> &[CharacterName] {
        &self.in_focus
    }

    /// Every narration emitted so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Narration] {
        &self.history
    }

    /// The snapshot produced by the last save or quit turn.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<&str> {
        self.last_snapshot.as_deref()
    }

    /// Whether the session has quit.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    // === Explicit transitions ===

    /// Set the turn for the next `play` call. The only way Turn changes
    /// from outside.
    pub fn set_turn(&mut self, turn: Turn) {
        info!(from = %self.turn, to = %turn, "turn set");
        self.turn = turn;
    }

    /// Switch the game mode. The only mutation point for GameMode; invoked
    /// by trigger and action activation.
    pub fn switch_game_mode(&mut self, mode: GameMode) {
        if self.game_mode != mode {
            info!(from = %self.game_mode, to = %mode, "game mode switch");
            self.game_mode = mode;
        }
    }

    // === The round entry point ===

    /// Process one round and return its narrations in order.
    ///
    /// `player_input` is only consumed on the player turn. After a player
    /// or game turn the controller advances round-robin; save resets to the
    /// player turn; quit finishes the session; new-map fails loudly.
    pub fn play(&mut self, player_input: Option<&str>) -> Result<Vec<Narration>, EngineError> {
        if self.finished {
            return Ok(Vec::new());
        }

        info!(turn = %self.turn, mode = %self.game_mode, "round start");
        match self.turn {
            Turn::Player => {
                self.turn = Turn::Game;
                if let Some(input) = player_input {
                    self.player_phase(input)?;
                }
                let queued = self.player.character.drain_action_queue();
                let player_name = self.player.character.name.clone();
                self.run_actions(&player_name, queued)?;
            }
            Turn::Game => {
                self.turn = Turn::Player;
                self.game_phase()?;
            }
            Turn::Save => {
                self.turn = Turn::Player;
                let snapshot = self.save_snapshot()?;
                self.last_snapshot = Some(snapshot);
            }
            Turn::NewMap => {
                return Err(EngineError::Unsupported(
                    "new_map is not implemented; load a new session instead".to_string(),
                ));
            }
            Turn::Quit => {
                let snapshot = self.save_snapshot()?;
                self.last_snapshot = Some(snapshot);
                self.finished = true;
            }
        }

        Ok(self.drain_narrations())
    }

    /// Serialize the session state to JSON.
    pub fn save_snapshot(&self) -> Result<String, EngineError> {
        let snapshot = SaveSnapshot {
            player: self.player.clone(),
            roster: self.roster.clone(),
            rng: self.rng.state(),
            turn: self.turn,
            game_mode: self.game_mode,
            in_focus: self.in_focus.clone(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    // === Phases ===

    /// Player turn: hand the input to the narrative agent, translate its
    /// chosen invocations, queue them on the player.
    fn player_phase(&mut self, input: &str) -> Result<(), EngineError> {
        let catalog = actions::catalog_for(self.game_mode);
        let invocations = self
            .narrative_agent
            .choose_actions(input, catalog, &self.history);
        debug!(count = invocations.len(), "player invocations chosen");

        let player_name = self.player.character.name.clone();
        for invocation in invocations {
            let prepared = actions::translate(&invocation, catalog)
                .and_then(|kind| self.prepare_action(&player_name, kind));
            if let Err(rejection) = prepared {
                // Rejections flow back as narration so the agent can
                // self-correct next attempt. No state was mutated.
                self.push_narration(Narration::stage(rejection.to_string()));
            }
        }
        Ok(())
    }

    /// Game turn: the environment pass in explore-like modes, the NPC
    /// reaction pass in dialogue and combat, then health ticks.
    fn game_phase(&mut self) -> Result<(), EngineError> {
        if self.game_mode.has_npc_reactions() {
            self.npc_reaction_phase()?;
        } else {
            self.environment_phase()?;
        }
        self.health_tick_phase();
        Ok(())
    }

    /// Prepare every currently-applicable environment trigger, reconcile
    /// the armed set, then advance the dwell counter.
    fn environment_phase(&mut self) -> Result<(), EngineError> {
        let declared = self.environment.trigger_ids.clone();
        let mut armed = Vec::new();
        for id in &declared {
            let def = self.data.triggers.resolve(id)?;
            if def.kind.is_exit() {
                continue;
            }
            if let Some(trigger) =
                def.prepare(&self.player.quest_log, &self.environment, &mut self.rng)
            {
                armed.push(trigger);
            }
        }
        for trigger in armed {
            self.environment.arm_trigger(trigger);
        }

        let wave = self.environment.drain_armed();
        self.reconcile(wave)?;
        self.environment.increment_dwell();
        Ok(())
    }

    /// Ask the in-focus NPC's agent for a reaction to its accumulated
    /// short-term memory, queue the chosen actions, then drain every
    /// in-focus actor's queue.
    fn npc_reaction_phase(&mut self) -> Result<(), EngineError> {
        let Some(focus) = self.in_focus.first().cloned() else {
            debug!("no character in focus; nothing to react");
            return Ok(());
        };

        let event = match self.roster.get(&focus) {
            Some(character) => character.short_term_memory().join("\n"),
            None => String::new(),
        };

        let catalog = actions::catalog_for(self.game_mode);
        let invocations = self
            .narrative_agent
            .choose_actions(&event, catalog, &self.history);
        debug!(npc = %focus, count = invocations.len(), "npc invocations chosen");

        for invocation in invocations {
            let prepared = actions::translate(&invocation, catalog)
                .and_then(|kind| self.prepare_action(&focus, kind));
            if let Err(rejection) = prepared {
                debug!(npc = %focus, %rejection, "npc action rejected");
            }
        }
        if let Some(character) = self.roster.get_mut(&focus) {
            character.clear_short_term_memory();
        }

        for name in self.in_focus.clone() {
            let queued = match self.roster.get_mut(&name) {
                Some(character) => character.drain_action_queue(),
                None => Vec::new(),
            };
            self.run_actions(&name, queued)?;
        }
        Ok(())
    }

    /// Advance the health status clock for the player and everyone in
    /// focus, narrating transitions.
    fn health_tick_phase(&mut self) {
        let player_name = self.player.character.name.clone();
        if let Some(message) = self
            .player
            .character
            .health
            .tick(player_name.as_str(), &mut self.rng)
        {
            self.push_narration(Narration::stage(message));
        }

        for name in self.in_focus.clone() {
            let message = match self.roster.get_mut(&name) {
                Some(character) => character.health.tick(name.as_str(), &mut self.rng),
                None => None,
            };
            if let Some(message) = message {
                self.push_narration(Narration::stage(message));
            }
        }
    }

    // === Action preparation ===

    /// Validate an action's preconditions and queue it on its actor.
    ///
    /// Rejections mutate nothing; the caller surfaces them to the agent.
    fn prepare_action(
        &mut self,
        actor: &CharacterName,
        kind: ActionKind,
    ) -> Result<(), Rejection> {
        match &kind {
            ActionKind::Attack { target } | ActionKind::PrepareAttack { target } => {
                if target == actor || !self.is_actor_known(target) {
                    return Err(Rejection::UnknownTarget(target.as_str().to_string()));
                }
            }
            ActionKind::MoveLocation { destination } => {
                if !self.environment.connections.contains(destination) {
                    return Err(Rejection::UnknownTarget(destination.as_str().to_string()));
                }
            }
            _ => {}
        }

        let queue_on = self
            .actor_mut(actor)
            .ok_or_else(|| Rejection::UnknownTarget(actor.as_str().to_string()))?;
        queue_on.add_to_action_queue(kind);
        Ok(())
    }

    /// Whether a name resolves to the player, an NPC present in the
    /// environment, or a character in focus.
    fn is_actor_known(&self, name: &CharacterName) -> bool {
        name == &self.player.character.name
            || self.in_focus.contains(name)
            || (self.roster.contains_key(name) && self.environment.is_character_present(name))
    }

    /// The player's or an NPC's character, mutably.
    fn actor_mut(&mut self, name: &CharacterName) -> Option<&mut Character> {
        if name == &self.player.character.name {
            Some(&mut self.player.character)
        } else {
            self.roster.get_mut(name)
        }
    }

    /// A clone of an actor's character, for combat score computation while
    /// the defender is borrowed mutably.
    fn actor_snapshot(&self, name: &CharacterName) -> Option<Character> {
        if name == &self.player.character.name {
            Some(self.player.character.clone())
        } else {
            self.roster.get(name).cloned()
        }
    }

    // === Action activation ===

    /// Activate one prepared action. Returns the chained trigger ids the
    /// reconciler should pursue (actions currently chain none themselves,
    /// but reveal-through-move does).
    fn activate_action(
        &mut self,
        actor: &CharacterName,
        kind: ActionKind,
    ) -> Result<Vec<crate::core::TriggerId>, EngineError> {
        let is_player = actor == &self.player.character.name;
        debug!(%actor, action = ?kind, "activating action");

        match kind {
            ActionKind::StageDirection { text } => {
                self.remember_for_npcs(&text, actor);
                self.push_narration(
                    Narration::stage(text).from_character(actor.clone()),
                );
            }

            ActionKind::Speak { dialogue } => {
                let present = self.environment.characters_present();
                if is_player && present.is_empty() {
                    self.push_narration(Narration::stage(format!(
                        "{actor} starts talking to themself... Perhaps they are going mad."
                    )));
                    return Ok(Vec::new());
                }

                // Speaking to someone opens the conversation before the
                // words land, so listeners remember them.
                if is_player && !self.game_mode.has_npc_reactions() {
                    self.in_focus = present;
                    self.switch_game_mode(GameMode::Dialogue);
                }
                self.remember_for_npcs(&format!("{actor}: {dialogue}"), actor);
                self.push_narration(Narration::dialogue(actor.clone(), dialogue));
            }

            ActionKind::Attack { target } => {
                let Some(attacker) = self.actor_snapshot(actor) else {
                    return Ok(Vec::new());
                };
                if self.actor_snapshot(&target).is_none() {
                    self.push_narration(Narration::stage(
                        Rejection::UnknownTarget(target.as_str().to_string()).to_string(),
                    ));
                    return Ok(Vec::new());
                }

                let outcome = if target == self.player.character.name {
                    combat::resolve_attack(&attacker, &mut self.player.character, &mut self.rng)
                } else if let Some(defender) = self.roster.get_mut(&target) {
                    combat::resolve_attack(&attacker, defender, &mut self.rng)
                } else {
                    return Ok(Vec::new());
                };

                self.remember_for_npcs(&outcome.narration, actor);
                self.push_narration(Narration::stage(outcome.narration));
                // The other side gets the next move.
                self.turn = if is_player { Turn::Game } else { Turn::Player };
            }

            ActionKind::PrepareAttack { target } => {
                let (Some(attacker), Some(defender)) =
                    (self.actor_snapshot(actor), self.actor_snapshot(&target))
                else {
                    self.push_narration(Narration::stage(
                        Rejection::UnknownTarget(target.as_str().to_string()).to_string(),
                    ));
                    return Ok(Vec::new());
                };

                let outcome = combat::resolve_prepare_attack(&attacker, &defender, &mut self.rng);
                self.switch_game_mode(GameMode::Combat);
                if !self.in_focus.contains(&target) && target != self.player.character.name {
                    self.in_focus.push(target.clone());
                }
                self.remember_for_npcs(&outcome.narration, actor);
                self.push_narration(Narration::stage(outcome.narration));

                if outcome.caught_off_guard {
                    if let Some(character) = self.actor_mut(actor) {
                        character.add_to_action_queue(ActionKind::Attack { target });
                    }
                } else {
                    // The defender reacts first; initiative flips the turn.
                    self.turn = match self.turn {
                        Turn::Game => Turn::Player,
                        _ => Turn::Game,
                    };
                }
            }

            ActionKind::EquipItem { item } => {
                let result = match self.actor_mut(actor) {
                    Some(character) => character.equip_item(&item),
                    None => return Ok(Vec::new()),
                };
                let text = result.unwrap_or_else(|rejection| rejection.to_string());
                self.push_narration(Narration::stage(text));
            }

            ActionKind::UnequipItem { slot } => {
                let result = match self.actor_mut(actor) {
                    Some(character) => character.unequip_item(slot),
                    None => return Ok(Vec::new()),
                };
                let text = result.unwrap_or_else(|rejection| rejection.to_string());
                self.push_narration(Narration::stage(text));
            }

            ActionKind::TakeItem { item } => {
                let text = self.take_item(actor, &item);
                self.push_narration(Narration::stage(text));
            }

            ActionKind::MoveLocation { destination } => {
                return self.move_location(actor, &destination);
            }

            ActionKind::EndConversation => {
                self.in_focus.clear();
                self.switch_game_mode(GameMode::Explore);
                self.push_narration(Narration::stage(format!(
                    "{actor} steps away from the conversation."
                )));
            }
        }

        Ok(Vec::new())
    }

    /// Take an item from the environment into an actor's backpack.
    /// Capacity is checked before the environment is touched.
    fn take_item(&mut self, actor: &CharacterName, item: &ItemId) -> String {
        let Some(definition) = self.data.items.get(item) else {
            return Rejection::UnknownTarget(item.as_str().to_string()).to_string();
        };
        let definition = definition.clone();

        let fits = match self.actor_snapshot(actor) {
            Some(character) => character.backpack.fits(definition.mass, 0.0),
            None => false,
        };
        if !fits {
            return Rejection::Capacity(definition.name).to_string();
        }

        if self.environment.take_item(item).is_none() {
            return Rejection::UnknownTarget(item.as_str().to_string()).to_string();
        }

        let name = definition.name.clone();
        if let Some(character) = self.actor_mut(actor) {
            // Fit was checked against a snapshot of this same backpack.
            if character.backpack.add_item(definition).is_err() {
                return Rejection::Capacity(name).to_string();
            }
        }
        format!("{actor} takes the {name}.")
    }

    /// Leave the current location: run the departure pass, instantiate the
    /// destination, reset dwell and focus.
    fn move_location(
        &mut self,
        actor: &CharacterName,
        destination: &LocationId,
    ) -> Result<Vec<crate::core::TriggerId>, EngineError> {
        if !self.environment.connections.contains(destination) {
            self.push_narration(Narration::stage(
                Rejection::UnknownTarget(destination.as_str().to_string()).to_string(),
            ));
            return Ok(Vec::new());
        }

        // Departure pass: only OnExit triggers run here.
        let declared = self.environment.trigger_ids.clone();
        let mut departing = Vec::new();
        for id in &declared {
            let def = self.data.triggers.resolve(id)?;
            if !def.kind.is_exit() {
                continue;
            }
            if let Some(trigger) =
                def.prepare(&self.player.quest_log, &self.environment, &mut self.rng)
            {
                departing.push(trigger);
            }
        }
        self.reconcile(departing)?;

        let environment = self
            .data
            .environments
            .instantiate(destination)
            .ok_or_else(|| EngineError::unknown_id("location", destination.as_str()))?;
        let name = environment.name.clone();
        self.environment = environment;
        self.player.location = destination.clone();
        self.in_focus.clear();
        self.switch_game_mode(GameMode::Explore);
        self.push_narration(Narration::stage(format!("{actor} arrives at {name}.")));
        Ok(Vec::new())
    }

    // === Narration plumbing ===

    /// Append a line to every in-focus NPC's short-term memory, skipping
    /// the actor who produced it.
    fn remember_for_npcs(&mut self, line: &str, exclude: &CharacterName) {
        for name in self.in_focus.clone() {
            if &name == exclude {
                continue;
            }
            if let Some(character) = self.roster.get_mut(&name) {
                character.add_short_term_memory(line);
            }
        }
    }

    /// Attach media artifacts and enqueue a narration record.
    pub(crate) fn push_narration(&mut self, mut narration: Narration) {
        let artifacts = self.media.generate(&narration.text);
        narration.audio_path = artifacts.audio_path;
        narration.image_path = artifacts.image_path;
        self.narrations.push(narration);
    }

    /// Take this round's narrations, moving them into history.
    fn drain_narrations(&mut self) -> Vec<Narration> {
        let narrations = std::mem::take(&mut self.narrations);
        self.history.extend(narrations.iter().cloned());
        narrations
    }

    // === Used by the reconciler ===

    pub(crate) fn import_into_focus(&mut self, names: &[String]) {
        for raw in names {
            let name = CharacterName::new(raw.clone());
            if self.roster.contains_key(&name) && !self.in_focus.contains(&name) {
                info!(character = %name, "imported into active play");
                self.in_focus.push(name);
            }
        }
    }

    pub(crate) fn run_actions(
        &mut self,
        actor: &CharacterName,
        queued: Vec<ActionKind>,
    ) -> Result<(), EngineError> {
        for kind in queued {
            let chained = self.activate_action(actor, kind)?;
            if chained.is_empty() {
                continue;
            }
            let mut wave = Vec::new();
            for id in chained {
                let def = self.data.triggers.resolve(&id)?;
                if let Some(armed) =
                    def.prepare(&self.player.quest_log, &self.environment, &mut self.rng)
                {
                    wave.push(armed);
                }
            }
            self.reconcile(wave)?;
        }
        Ok(())
    }

    /// Take the narrations accumulated mid-round, without draining a turn.
    #[cfg(test)]
    pub(crate) fn take_narrations(&mut self) -> Vec<Narration> {
        std::mem::take(&mut self.narrations)
    }
}
