//! Engine error types.
//!
//! Two channels, deliberately separate:
//!
//! - [`EngineError`] is fatal. Bad static data, an unsupported operation, a
//!   malformed turn or mode value. These abort session start or the round.
//! - [`Rejection`] is recoverable and user-facing. A failed precondition on
//!   an action (invalid equip target, insufficient capacity) produces a
//!   rejection message that is handed back to the narrative agent so it can
//!   self-correct on its next attempt. No state is mutated on rejection.

use thiserror::Error;

/// Fatal engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Static data referenced an unknown or malformed value. Raised at
    /// session load; the session must not start.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Static data could not be parsed at all.
    #[error("failed to parse static data: {0}")]
    Parse(#[from] serde_json::Error),

    /// An operation the engine does not support was requested.
    /// Fails loudly; no partial mutation has occurred.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl EngineError {
    /// Configuration error for an unknown id in static data.
    #[must_use]
    pub fn unknown_id(kind: &str, id: &str) -> Self {
        Self::Configuration(format!("unknown {kind} id: {id}"))
    }
}

/// Recoverable, user-facing rejections.
///
/// The `Display` text is the message surfaced to the narrative agent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The named item is not in the actor's backpack.
    #[error("{0} is not in the backpack")]
    ItemNotHeld(String),

    /// The item cannot be equipped at all.
    #[error("{0} is not equipable")]
    NotEquipable(String),

    /// The actor's proficiency is below the item's minimum.
    #[error("insufficient proficiency to equip {0}")]
    InsufficientProficiency(String),

    /// The backpack cannot absorb the mass this operation would add.
    #[error("not enough capacity in backpack: {0}")]
    Capacity(String),

    /// Nothing is equipped in the named slot.
    #[error("no item equipped in slot {0}")]
    EmptySlot(String),

    /// The named interaction target is not present.
    #[error("{0} is not here")]
    UnknownTarget(String),

    /// The actor lacks the gold for the exchange.
    #[error("insufficient gold")]
    InsufficientGold,

    /// The agent invoked an action the current mode does not expose.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The agent supplied arguments the action schema does not accept.
    #[error("invalid arguments for {action}: {detail}")]
    InvalidArguments { action: String, detail: String },
}
