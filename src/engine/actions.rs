//! The action catalog and prepared actions.
//!
//! Each game mode exposes a fixed, ordered list of named actions to the
//! narrative agent. The tables are static - resolved once, never rebuilt
//! per call. An agent invocation is translated into an [`ActionKind`] and
//! queued on the acting character; the queue drains on that actor's turn.

use serde::{Deserialize, Serialize};

use crate::core::{CharacterName, ItemId, LocationId};
use crate::error::Rejection;
use crate::items::EquipSlot;

use super::agent::{ActionInvocation, ActionParam, ActionSpec};
use super::mode::GameMode;

/// A prepared action on an actor's queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionKind {
    /// Emote in third person, without dialogue.
    StageDirection { text: String },
    /// Say something to whoever is present.
    Speak { dialogue: String },
    /// Attack a present character outright.
    Attack { target: CharacterName },
    /// Contest initiative before attacking.
    PrepareAttack { target: CharacterName },
    /// Equip a carried item.
    EquipItem { item: ItemId },
    /// Unequip a slot back into the backpack.
    UnequipItem { slot: EquipSlot },
    /// Pick up an item lying in the location.
    TakeItem { item: ItemId },
    /// Move to a connected location.
    MoveLocation { destination: LocationId },
    /// Leave the current conversation or fight and return to exploring.
    EndConversation,
}

const STAGE_DIRECTION: ActionSpec = ActionSpec {
    name: "stage_direction",
    description: "Write a third-person stage direction describing how the character is \
                  emoting. Physical description only, no dialogue.",
    params: &[ActionParam {
        name: "text",
        description: "The stage direction.",
    }],
};

const SPEAK: ActionSpec = ActionSpec {
    name: "speak",
    description: "Make the character speak. Only the words spoken, no stage directions.",
    params: &[ActionParam {
        name: "dialogue",
        description: "The dialogue to say.",
    }],
};

const ATTACK: ActionSpec = ActionSpec {
    name: "attack",
    description: "Attack another character. Choose only if it suits the narrative.",
    params: &[ActionParam {
        name: "target",
        description: "The name of the character to attack.",
    }],
};

const PREPARE_ATTACK: ActionSpec = ActionSpec {
    name: "prepare_attack",
    description: "Prepare to attack a character: an initiative contest decides whether \
                  they notice in time to respond.",
    params: &[ActionParam {
        name: "target",
        description: "The name of the character to prepare against.",
    }],
};

const EQUIP_ITEM: ActionSpec = ActionSpec {
    name: "equip_item",
    description: "Equip an item from the character's backpack.",
    params: &[ActionParam {
        name: "item_id",
        description: "The id of the item to equip.",
    }],
};

const UNEQUIP_ITEM: ActionSpec = ActionSpec {
    name: "unequip_item",
    description: "Unequip an item back into the backpack.",
    params: &[ActionParam {
        name: "slot",
        description: "The slot to unequip (head, chest, legs, feet, main_hand, off_hand).",
    }],
};

const TAKE_ITEM: ActionSpec = ActionSpec {
    name: "take_item",
    description: "Pick up an item lying in the location.",
    params: &[ActionParam {
        name: "item_id",
        description: "The id of the item to take.",
    }],
};

const MOVE_LOCATION: ActionSpec = ActionSpec {
    name: "move_location",
    description: "Travel to a connected location.",
    params: &[ActionParam {
        name: "destination",
        description: "The id of the destination location.",
    }],
};

const END_CONVERSATION: ActionSpec = ActionSpec {
    name: "end_conversation",
    description: "Leave the current conversation and return to exploring.",
    params: &[],
};

/// The ordered action table for a game mode.
///
/// Static data: the same slice is returned for the life of the process.
#[must_use]
pub fn catalog_for(mode: GameMode) -> &'static [ActionSpec] {
    match mode {
        GameMode::Explore => &[
            STAGE_DIRECTION,
            SPEAK,
            MOVE_LOCATION,
            TAKE_ITEM,
            EQUIP_ITEM,
            UNEQUIP_ITEM,
            PREPARE_ATTACK,
        ],
        GameMode::Interact => &[
            STAGE_DIRECTION,
            SPEAK,
            TAKE_ITEM,
            EQUIP_ITEM,
            UNEQUIP_ITEM,
            END_CONVERSATION,
        ],
        GameMode::Trade => &[SPEAK, STAGE_DIRECTION, END_CONVERSATION],
        GameMode::Dialogue => &[
            SPEAK,
            STAGE_DIRECTION,
            PREPARE_ATTACK,
            END_CONVERSATION,
        ],
        GameMode::Combat => &[ATTACK, STAGE_DIRECTION, SPEAK],
    }
}

fn required_arg(invocation: &ActionInvocation, name: &str) -> Result<String, Rejection> {
    invocation
        .arg(name)
        .map(str::to_string)
        .ok_or_else(|| Rejection::InvalidArguments {
            action: invocation.name.clone(),
            detail: format!("missing argument {name}"),
        })
}

/// Translate an agent invocation into a prepared action.
///
/// Only actions in the given catalog translate; anything else is a
/// rejection the agent can correct on its next attempt.
pub fn translate(
    invocation: &ActionInvocation,
    catalog: &[ActionSpec],
) -> Result<ActionKind, Rejection> {
    if !catalog.iter().any(|spec| spec.name == invocation.name) {
        return Err(Rejection::UnknownAction(invocation.name.clone()));
    }

    match invocation.name.as_str() {
        "stage_direction" => Ok(ActionKind::StageDirection {
            text: required_arg(invocation, "text")?,
        }),
        "speak" => Ok(ActionKind::Speak {
            dialogue: required_arg(invocation, "dialogue")?,
        }),
        "attack" => Ok(ActionKind::Attack {
            target: CharacterName::new(required_arg(invocation, "target")?),
        }),
        "prepare_attack" => Ok(ActionKind::PrepareAttack {
            target: CharacterName::new(required_arg(invocation, "target")?),
        }),
        "equip_item" => Ok(ActionKind::EquipItem {
            item: ItemId::new(required_arg(invocation, "item_id")?),
        }),
        "unequip_item" => {
            let slot = required_arg(invocation, "slot")?;
            let slot = EquipSlot::parse(&slot).map_err(|_| Rejection::InvalidArguments {
                action: invocation.name.clone(),
                detail: format!("unknown slot {slot}"),
            })?;
            Ok(ActionKind::UnequipItem { slot })
        }
        "take_item" => Ok(ActionKind::TakeItem {
            item: ItemId::new(required_arg(invocation, "item_id")?),
        }),
        "move_location" => Ok(ActionKind::MoveLocation {
            destination: LocationId::new(required_arg(invocation, "destination")?),
        }),
        "end_conversation" => Ok(ActionKind::EndConversation),
        other => Err(Rejection::UnknownAction(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_are_nonempty_and_ordered() {
        for mode in [
            GameMode::Explore,
            GameMode::Interact,
            GameMode::Trade,
            GameMode::Dialogue,
            GameMode::Combat,
        ] {
            assert!(!catalog_for(mode).is_empty());
        }
        // Combat leads with attack.
        assert_eq!(catalog_for(GameMode::Combat)[0].name, "attack");
    }

    #[test]
    fn test_translate_speak() {
        let invocation = ActionInvocation::new("speak").with_arg("dialogue", "Who goes there?");
        let action = translate(&invocation, catalog_for(GameMode::Dialogue)).unwrap();
        assert_eq!(
            action,
            ActionKind::Speak {
                dialogue: "Who goes there?".to_string()
            }
        );
    }

    #[test]
    fn test_translate_rejects_unknown_action() {
        let invocation = ActionInvocation::new("dance");
        let err = translate(&invocation, catalog_for(GameMode::Explore)).unwrap_err();
        assert!(matches!(err, Rejection::UnknownAction(_)));
    }

    #[test]
    fn test_translate_rejects_out_of_mode_action() {
        // attack is a combat action; the explore catalog does not carry it.
        let invocation = ActionInvocation::new("attack").with_arg("target", "Mira");
        assert!(translate(&invocation, catalog_for(GameMode::Explore)).is_err());
        assert!(translate(&invocation, catalog_for(GameMode::Combat)).is_ok());
    }

    #[test]
    fn test_translate_rejects_missing_args() {
        let invocation = ActionInvocation::new("speak");
        let err = translate(&invocation, catalog_for(GameMode::Dialogue)).unwrap_err();
        assert!(matches!(err, Rejection::InvalidArguments { .. }));
    }

    #[test]
    fn test_translate_rejects_bad_slot() {
        let invocation = ActionInvocation::new("unequip_item").with_arg("slot", "tail");
        let err = translate(&invocation, catalog_for(GameMode::Explore)).unwrap_err();
        assert!(matches!(err, Rejection::InvalidArguments { .. }));
    }

    #[test]
    fn test_action_kind_serde() {
        let action = ActionKind::Attack {
            target: CharacterName::new("Mira"),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"action\":\"attack\""));
        let back: ActionKind = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }
}
