//! # reverie
//!
//! The rules and orchestration core of a narrative interactive game: a
//! single-threaded engine that tracks world state, gates story content
//! behind quest and trigger conditions, resolves turn order between the
//! player and non-player actors, and resolves stochastic outcomes
//! deterministically from a seeded die.
//!
//! ## Design Principles
//!
//! 1. **Catalog-driven**: Triggers, items, quests, environments, and
//!    characters are id-keyed JSON loaded once at session start and
//!    validated fail-fast.
//!
//! 2. **Tagged variants over hierarchies**: Trigger classes and actions
//!    are closed enums sharing one gating/activation contract; adding a
//!    variant never means adding a subclass.
//!
//! 3. **Deterministic**: Every stochastic outcome draws from one seeded
//!    RNG owned by the session. A session replays identically from the
//!    same seed and input sequence.
//!
//! 4. **Exclusive ownership**: All mutable state belongs to one `Game`
//!    session. There is no intra-session concurrency; collaborators
//!    (narrative agent, media generator) are synchronous seams.
//!
//! ## Modules
//!
//! - `core`: Identifier newtypes, deterministic RNG, attribute bags
//! - `error`: Fatal engine errors and recoverable user-facing rejections
//! - `quests`: Quest catalog and the per-player quest log / exclusion ledger
//! - `items`: Item model and catalog
//! - `characters`: Skills, health, inventory, characters and the player
//! - `combat`: Deterministic attack and initiative resolution
//! - `triggers`: Trigger definitions, gating, catalog, responses
//! - `environment`: Locations, dwell tracking, positions, reveals
//! - `catalog`: All static data, loaded and cross-validated together
//! - `engine`: The turn controller, reconciler, and `play` entry point

pub mod catalog;
pub mod characters;
pub mod combat;
pub mod core;
pub mod engine;
pub mod environment;
pub mod error;
pub mod items;
pub mod quests;
pub mod triggers;

// Re-export commonly used types
pub use crate::core::{
    AttributeKey, AttributeValue, Attributes, CharacterName, GameRng, GameRngState, ItemId,
    LocationId, PositionId, QuestId, TriggerId,
};

pub use crate::catalog::GameData;
pub use crate::characters::{
    Backpack, Character, Equipped, Health, HealthStatus, Player, Proficiency, Skill, SkillTree,
};
pub use crate::combat::{AttackScores, CombatOutcome, InitiativeOutcome, ATTACK_DC};
pub use crate::engine::{
    actions::{catalog_for, ActionKind},
    agent::{
        ActionInvocation, ActionParam, ActionSpec, MediaArtifacts, MediaGenerator, NarrativeAgent,
        NullMediaGenerator, ScriptedAgent,
    },
    mode::{GameMode, Turn},
    narration::{Narration, NarrationSource, NarrationTag},
    Game, SaveSnapshot,
};
pub use crate::environment::{CharacterPosition, Environment, EnvironmentCatalog, ObjectPosition};
pub use crate::error::{EngineError, Rejection};
pub use crate::items::{EquipSlot, Item, ItemCatalog};
pub use crate::quests::{Quest, QuestCatalog, QuestLog};
pub use crate::triggers::{
    ArmedTrigger, Comparator, DwellGate, PresenceMode, TriggerCatalog, TriggerDef, TriggerGates,
    TriggerKind, TriggerResponse,
};
