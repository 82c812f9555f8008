//! Narration records, the engine's only output channel.
//!
//! Every `play` round returns the ordered narrations it produced. Media
//! artifacts (audio, images) are attached by the session's media generator
//! at enqueue time; the engine itself never touches the filesystem.

use serde::{Deserialize, Serialize};

use crate::core::CharacterName;

/// How a narration line is staged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationTag {
    /// Scene description or action beats.
    #[default]
    Stage,
    /// Spoken lines.
    Dialogue,
}

/// Who produced a narration line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationSource {
    /// The engine itself (trigger narration, rejections, status lines).
    #[default]
    Engine,
    /// A character, player or NPC.
    Character(CharacterName),
}

/// One narration record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    /// The narration text.
    pub text: String,

    /// Stage direction or dialogue.
    #[serde(default)]
    pub tag: NarrationTag,

    /// Who it came from.
    #[serde(default)]
    pub source: NarrationSource,

    /// Generated audio artifact, if any.
    #[serde(default)]
    pub audio_path: Option<String>,

    /// Generated image artifact, if any.
    #[serde(default)]
    pub image_path: Option<String>,
}

impl Narration {
    /// A stage line from the engine.
    pub fn stage(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: NarrationTag::Stage,
            ..Self::default()
        }
    }

    /// A dialogue line from a character.
    pub fn dialogue(speaker: CharacterName, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: NarrationTag::Dialogue,
            source: NarrationSource::Character(speaker),
            ..Self::default()
        }
    }

    /// Set the source (builder pattern).
    #[must_use]
    pub fn from_character(mut self, speaker: CharacterName) -> Self {
        self.source = NarrationSource::Character(speaker);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let stage = Narration::stage("Fog rolls in off the water.");
        assert_eq!(stage.tag, NarrationTag::Stage);
        assert_eq!(stage.source, NarrationSource::Engine);

        let line = Narration::dialogue(CharacterName::new("Mira"), "You're late.");
        assert_eq!(line.tag, NarrationTag::Dialogue);
        assert_eq!(
            line.source,
            NarrationSource::Character(CharacterName::new("Mira"))
        );
    }

    #[test]
    fn test_serde() {
        let narration = Narration::stage("Fog.").from_character(CharacterName::new("Mira"));
        let json = serde_json::to_string(&narration).unwrap();
        let back: Narration = serde_json::from_str(&json).unwrap();
        assert_eq!(narration, back);
    }
}
