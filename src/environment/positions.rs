//! Character and object positions within an environment.
//!
//! A position places characters or items somewhere in the location, with an
//! optional `hidden` flag. Hidden positions do not exist as far as the
//! player is concerned until a Reveal trigger clears the flag, emits the
//! position's reveal narrative, and chains any triggers nested under it.

use serde::{Deserialize, Serialize};

use crate::core::{CharacterName, ItemId, PositionId, TriggerId};

/// Characters placed somewhere in the location.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterPosition {
    /// Unique within the environment.
    pub id: PositionId,

    /// Who is here.
    pub characters: Vec<CharacterName>,

    /// Where they are, for narration.
    pub position_description: String,

    /// What they are doing, for narration.
    #[serde(default)]
    pub activity_description: String,

    /// Narration emitted when this position is revealed.
    #[serde(default)]
    pub reveal_description: Option<String>,

    /// Whether the position is still concealed.
    #[serde(default)]
    pub hidden: bool,

    /// Triggers chained when this position is revealed.
    #[serde(default)]
    pub trigger_ids: Vec<TriggerId>,
}

impl CharacterPosition {
    /// Create a visible position.
    pub fn new(
        id: impl Into<PositionId>,
        characters: impl IntoIterator<Item = CharacterName>,
        position_description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            characters: characters.into_iter().collect(),
            position_description: position_description.into(),
            ..Self::default()
        }
    }

    /// Mark hidden with a reveal narrative (builder pattern).
    #[must_use]
    pub fn hidden(mut self, reveal_description: impl Into<String>) -> Self {
        self.hidden = true;
        self.reveal_description = Some(reveal_description.into());
        self
    }

    /// Add a nested trigger (builder pattern).
    #[must_use]
    pub fn with_trigger(mut self, id: impl Into<TriggerId>) -> Self {
        self.trigger_ids.push(id.into());
        self
    }

    /// Position line used when describing the location.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.activity_description.is_empty() {
            self.position_description.clone()
        } else {
            format!("{}, {}", self.position_description, self.activity_description)
        }
    }
}

/// Items placed somewhere in the location.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPosition {
    /// Unique within the environment.
    pub id: PositionId,

    /// What lies here.
    pub items: Vec<ItemId>,

    /// Where it is, for narration.
    pub position_description: String,

    /// Narration emitted when this position is revealed.
    #[serde(default)]
    pub reveal_description: Option<String>,

    /// Whether the position is still concealed.
    #[serde(default)]
    pub hidden: bool,

    /// Triggers chained when this position is revealed.
    #[serde(default)]
    pub trigger_ids: Vec<TriggerId>,
}

impl ObjectPosition {
    /// Create a visible position.
    pub fn new(
        id: impl Into<PositionId>,
        items: impl IntoIterator<Item = ItemId>,
        position_description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            items: items.into_iter().collect(),
            position_description: position_description.into(),
            ..Self::default()
        }
    }

    /// Mark hidden with a reveal narrative (builder pattern).
    #[must_use]
    pub fn hidden(mut self, reveal_description: impl Into<String>) -> Self {
        self.hidden = true;
        self.reveal_description = Some(reveal_description.into());
        self
    }

    /// Add a nested trigger (builder pattern).
    #[must_use]
    pub fn with_trigger(mut self, id: impl Into<TriggerId>) -> Self {
        self.trigger_ids.push(id.into());
        self
    }

    /// Remove an item from this position, if present.
    pub fn take_item(&mut self, id: &ItemId) -> Option<ItemId> {
        let index = self.items.iter().position(|i| i == id)?;
        Some(self.items.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_position_describe() {
        let position = CharacterPosition::new(
            "pos_quay",
            [CharacterName::new("Mira")],
            "by the quay",
        );
        assert_eq!(position.describe(), "by the quay");

        let mut busy = position;
        busy.activity_description = "mending a net".to_string();
        assert_eq!(busy.describe(), "by the quay, mending a net");
    }

    #[test]
    fn test_hidden_builder() {
        let position = CharacterPosition::new("pos_loft", [], "up in the loft")
            .hidden("A figure stirs in the loft above.")
            .with_trigger("t_loft_reveal");

        assert!(position.hidden);
        assert!(position.reveal_description.is_some());
        assert_eq!(position.trigger_ids.len(), 1);
    }

    #[test]
    fn test_take_item() {
        let mut position = ObjectPosition::new(
            "pos_crate",
            [ItemId::new("rope"), ItemId::new("lantern")],
            "inside a crate",
        );

        assert_eq!(
            position.take_item(&ItemId::new("rope")),
            Some(ItemId::new("rope"))
        );
        assert_eq!(position.take_item(&ItemId::new("rope")), None);
        assert_eq!(position.items.len(), 1);
    }
}
