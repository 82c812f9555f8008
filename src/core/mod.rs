//! Core engine types: identifiers, deterministic RNG, attribute bags.
//!
//! These are the building blocks the rest of the engine is written against.
//! Nothing in here knows about triggers, characters, or turns.

pub mod attributes;
pub mod ids;
pub mod rng;

pub use attributes::{AttributeKey, AttributeValue, Attributes};
pub use ids::{CharacterName, ItemId, LocationId, PositionId, QuestId, TriggerId};
pub use rng::{GameRng, GameRngState};
