//! Characters: skills, health, inventory, and the character/player types.

pub mod character;
pub mod health;
pub mod inventory;
pub mod skills;

pub use character::{Character, Player};
pub use health::{Health, HealthStatus};
pub use inventory::{Backpack, Equipped, WeaponAttack, DEFAULT_CAPACITY};
pub use skills::{Proficiency, Skill, SkillTree, DEXTERITY, PERCEPTION, UNARMED};
