//! Skills and proficiency tiers.
//!
//! Four tiers map to flat integer modifiers. Upskilling walks a fixed map;
//! master is terminal.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Skill name the combat resolver uses for defense.
pub const DEXTERITY: &str = "dexterity";
/// Skill name the initiative contest checks alongside dexterity.
pub const PERCEPTION: &str = "perception";
/// Fallback weapon skill when nothing is equipped in the main hand.
pub const UNARMED: &str = "brawl";

/// Proficiency tier in a skill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    /// No training: modifier 0.
    #[default]
    Untrained,
    /// Basic training: modifier 1.
    Trained,
    /// Advanced training: modifier 2.
    Expert,
    /// Mastery: modifier 3. Terminal tier.
    Master,
}

impl Proficiency {
    /// The flat roll modifier for this tier.
    #[must_use]
    pub const fn modifier(self) -> i32 {
        match self {
            Self::Untrained => 0,
            Self::Trained => 1,
            Self::Expert => 2,
            Self::Master => 3,
        }
    }

    /// The next tier on the upskill map. Master stays master.
    #[must_use]
    pub const fn upskilled(self) -> Self {
        match self {
            Self::Untrained => Self::Trained,
            Self::Trained => Self::Expert,
            Self::Expert => Self::Master,
            Self::Master => Self::Master,
        }
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Untrained => "untrained",
            Self::Trained => "trained",
            Self::Expert => "expert",
            Self::Master => "master",
        }
    }

    /// Parse a tier name from catalog data.
    pub fn parse(name: &str) -> Result<Self, EngineError> {
        match name {
            "untrained" => Ok(Self::Untrained),
            "trained" => Ok(Self::Trained),
            "expert" => Ok(Self::Expert),
            "master" => Ok(Self::Master),
            other => Err(EngineError::Configuration(format!(
                "unknown proficiency tier: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Proficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single skill with the holder's proficiency in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Skill name (lowercase, catalog-keyed).
    pub name: String,
    /// What the skill covers.
    #[serde(default)]
    pub description: String,
    /// The holder's tier.
    #[serde(default)]
    pub proficiency: Proficiency,
}

impl Skill {
    /// Create a new untrained skill.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            proficiency: Proficiency::Untrained,
        }
    }

    /// Set the proficiency (builder pattern).
    #[must_use]
    pub fn with_proficiency(mut self, proficiency: Proficiency) -> Self {
        self.proficiency = proficiency;
        self
    }
}

/// A character's skill set, keyed by skill name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTree {
    skills: FxHashMap<String, Skill>,
}

/// The default skill list characters start with.
const DEFAULT_SKILLS: &[&str] = &[
    "dexterity",
    "aim",
    "athletics",
    "brawl",
    "lockpick",
    "medicine",
    "mechanics",
    "computers",
    "driving",
    "stealth",
    "perception",
];

impl Default for SkillTree {
    fn default() -> Self {
        let mut skills = FxHashMap::default();
        for name in DEFAULT_SKILLS {
            skills.insert((*name).to_string(), Skill::new(*name));
        }
        Self { skills }
    }
}

impl SkillTree {
    /// Create a skill tree with the default skill list, all untrained.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit skills.
    #[must_use]
    pub fn from_skills(skills: impl IntoIterator<Item = Skill>) -> Self {
        Self {
            skills: skills
                .into_iter()
                .map(|s| (s.name.clone(), s))
                .collect(),
        }
    }

    /// Set a skill's proficiency, adding the skill if absent.
    pub fn set_proficiency(&mut self, skill: &str, proficiency: Proficiency) {
        self.skills
            .entry(skill.to_string())
            .or_insert_with(|| Skill::new(skill))
            .proficiency = proficiency;
    }

    /// The holder's tier in a skill, if they have it.
    #[must_use]
    pub fn proficiency(&self, skill: &str) -> Option<Proficiency> {
        self.skills.get(skill).map(|s| s.proficiency)
    }

    /// The roll modifier for a skill. Unknown skills contribute 0, which is
    /// what the unarmed fallback relies on.
    #[must_use]
    pub fn modifier(&self, skill: &str) -> i32 {
        self.proficiency(skill).map_or(0, Proficiency::modifier)
    }

    /// Check whether a skill exists in this tree.
    #[must_use]
    pub fn contains(&self, skill: &str) -> bool {
        self.skills.contains_key(skill)
    }

    /// Walk a skill one step up the upskill map.
    ///
    /// Returns the narration for the improvement, or `None` if the skill is
    /// unknown or already mastered.
    pub fn increase_proficiency(&mut self, name: &str, skill: &str) -> Option<String> {
        let entry = self.skills.get_mut(skill)?;
        if entry.proficiency == Proficiency::Master {
            return None;
        }
        entry.proficiency = entry.proficiency.upskilled();
        Some(format!(
            "{name} has increased their proficiency in {skill} to {}.",
            entry.proficiency
        ))
    }

    /// Iterate over all skills.
    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers() {
        assert_eq!(Proficiency::Untrained.modifier(), 0);
        assert_eq!(Proficiency::Trained.modifier(), 1);
        assert_eq!(Proficiency::Expert.modifier(), 2);
        assert_eq!(Proficiency::Master.modifier(), 3);
    }

    #[test]
    fn test_upskill_map_is_monotone_and_terminal() {
        let mut tier = Proficiency::Untrained;
        for _ in 0..10 {
            let next = tier.upskilled();
            assert!(next.modifier() >= tier.modifier());
            tier = next;
        }
        assert_eq!(tier, Proficiency::Master);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Proficiency::parse("expert").unwrap(), Proficiency::Expert);
        assert!(Proficiency::parse("grandmaster").is_err());
    }

    #[test]
    fn test_default_tree() {
        let tree = SkillTree::new();
        assert!(tree.contains(DEXTERITY));
        assert!(tree.contains(PERCEPTION));
        assert_eq!(tree.modifier(DEXTERITY), 0);
    }

    #[test]
    fn test_modifier_unknown_skill_is_zero() {
        let tree = SkillTree::new();
        assert_eq!(tree.modifier("basket_weaving"), 0);
    }

    #[test]
    fn test_increase_proficiency() {
        let mut tree = SkillTree::new();

        let message = tree.increase_proficiency("Mira", "aim").unwrap();
        assert!(message.contains("trained"));
        assert_eq!(tree.proficiency("aim"), Some(Proficiency::Trained));

        tree.set_proficiency("aim", Proficiency::Master);
        assert!(tree.increase_proficiency("Mira", "aim").is_none());

        assert!(tree.increase_proficiency("Mira", "basket_weaving").is_none());
    }

    #[test]
    fn test_skill_tree_serde() {
        let mut tree = SkillTree::new();
        tree.set_proficiency("aim", Proficiency::Expert);

        let json = serde_json::to_string(&tree).unwrap();
        let back: SkillTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back.proficiency("aim"), Some(Proficiency::Expert));
    }
}
