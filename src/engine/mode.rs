//! The two orthogonal state enums of the turn controller.
//!
//! `Turn` decides whose queues drain this round; `GameMode` decides which
//! action catalog the narrative agent sees. Both only change through
//! explicit calls on the session ([`Game::set_turn`](super::Game::set_turn)
//! and [`Game::switch_game_mode`](super::Game::switch_game_mode)).

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Whose turn the next round processes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    /// Drain the player's action queue.
    #[default]
    Player,
    /// Run the environment or NPC reaction pass.
    Game,
    /// Serialize session state.
    Save,
    /// Unsupported; fails loudly.
    NewMap,
    /// Serialize, then stop the session.
    Quit,
}

impl Turn {
    /// Lowercase name matching the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Game => "game",
            Self::Save => "save",
            Self::NewMap => "new_map",
            Self::Quit => "quit",
        }
    }

    /// Parse a turn name. Unknown values are a configuration error.
    pub fn parse(name: &str) -> Result<Self, EngineError> {
        match name {
            "player" => Ok(Self::Player),
            "game" => Ok(Self::Game),
            "save" => Ok(Self::Save),
            "new_map" => Ok(Self::NewMap),
            "quit" => Ok(Self::Quit),
            other => Err(EngineError::Configuration(format!(
                "unknown turn: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Turn {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The current interaction context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Free movement and observation.
    #[default]
    Explore,
    /// Close interaction with an object or fixture.
    Interact,
    /// Buying and selling.
    Trade,
    /// Conversation with one or more characters.
    Dialogue,
    /// An active fight.
    Combat,
}

impl GameMode {
    /// Lowercase name matching the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explore => "explore",
            Self::Interact => "interact",
            Self::Trade => "trade",
            Self::Dialogue => "dialogue",
            Self::Combat => "combat",
        }
    }

    /// Parse a mode name. Unknown values are a configuration error.
    pub fn parse(name: &str) -> Result<Self, EngineError> {
        match name {
            "explore" => Ok(Self::Explore),
            "interact" => Ok(Self::Interact),
            "trade" => Ok(Self::Trade),
            "dialogue" => Ok(Self::Dialogue),
            "combat" => Ok(Self::Combat),
            other => Err(EngineError::Configuration(format!(
                "unknown game mode: {other}"
            ))),
        }
    }

    /// Whether this mode runs the NPC reaction pass on the game turn.
    #[must_use]
    pub const fn has_npc_reactions(self) -> bool {
        matches!(self, Self::Dialogue | Self::Combat)
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GameMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
