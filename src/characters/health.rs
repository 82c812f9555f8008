//! Health status machine.
//!
//! Status degrades under damage (healthy → injured → dying → dead) and moves
//! along a fixed tick table otherwise: injured recovers to healthy after 3
//! turns, dying degrades to dead after 5. Healthy and dead do not tick.
//!
//! Leaving injured or dying may leave a permanent scar - 10% and 50%
//! respectively, rolled on the session RNG.

use serde::{Deserialize, Serialize};

use crate::core::GameRng;

/// Scar chance when an injury heals.
const INJURED_SCAR_CHANCE: f64 = 0.10;
/// Scar chance when dying resolves to death.
const DYING_SCAR_CHANCE: f64 = 0.50;

/// A character's health status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Injured,
    Dying,
    Dead,
}

impl HealthStatus {
    /// The roll penalty magnitude this status imposes. Subtracted from both
    /// attack and defense scores.
    #[must_use]
    pub const fn penalty(self) -> i32 {
        match self {
            Self::Healthy => 0,
            Self::Injured => 1,
            Self::Dying => 2,
            Self::Dead => 3,
        }
    }

    /// Turns in this status before the tick transition fires.
    /// Zero means the status never transitions on its own.
    #[must_use]
    pub const fn tick_threshold(self) -> u32 {
        match self {
            Self::Healthy => 0,
            Self::Injured => 3,
            Self::Dying => 5,
            Self::Dead => 0,
        }
    }

    /// Where the tick transition leads.
    #[must_use]
    pub const fn tick_target(self) -> Self {
        match self {
            Self::Healthy => Self::Healthy,
            Self::Injured => Self::Healthy,
            Self::Dying => Self::Dead,
            Self::Dead => Self::Dead,
        }
    }

    /// One step of damage-driven degradation.
    #[must_use]
    pub const fn degraded(self) -> Self {
        match self {
            Self::Healthy => Self::Injured,
            Self::Injured => Self::Dying,
            Self::Dying => Self::Dead,
            Self::Dead => Self::Dead,
        }
    }

    /// Status line used in narration.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Healthy => "is healthy",
            Self::Injured => "is injured, but recovering",
            Self::Dying => "is dying, they need healing soon or they will die!",
            Self::Dead => "is dead",
        }
    }

    /// Single-word status label for transition lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Injured => "injured",
            Self::Dying => "dying",
            Self::Dead => "dead",
        }
    }
}

/// A character's health: status, time in status, permanent scars.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Current status.
    pub status: HealthStatus,
    /// Turns spent in the current status.
    pub status_turn_count: u32,
    /// Permanent scars, append-only.
    pub scars: Vec<String>,
}

impl Health {
    /// Create a healthy, unscarred record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One-line status narration for a named character.
    #[must_use]
    pub fn status_line(&self, name: &str) -> String {
        format!("{name} {}", self.status.description())
    }

    /// Whether the character can still act.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.status != HealthStatus::Dead
    }

    /// Advance the status clock one turn.
    ///
    /// Returns the transition narration when a threshold is crossed,
    /// `None` otherwise. Healthy and dead characters do not tick.
    pub fn tick(&mut self, name: &str, rng: &mut GameRng) -> Option<String> {
        let threshold = self.status.tick_threshold();
        if threshold == 0 {
            return None;
        }

        self.status_turn_count += 1;
        if self.status_turn_count < threshold {
            return None;
        }

        let prev = self.status;
        self.status = self.status.tick_target();
        self.status_turn_count = 0;

        let mut message = format!(
            "{name} is no longer {} and is now {}.",
            prev.label(),
            self.status.label(),
        );
        if let Some(scar) = self.roll_scar(prev, rng) {
            message.push(' ');
            message.push_str(&scar);
        }
        Some(message)
    }

    /// Degrade one status step from damage. Resets the status clock.
    ///
    /// Returns the narration for the new status.
    pub fn apply_damage(&mut self, name: &str, rng: &mut GameRng) -> String {
        let prev = self.status;
        self.status = self.status.degraded();
        self.status_turn_count = 0;

        let mut message = self.status_line(name);
        // Dying straight to dead from damage can still scar the remains.
        if self.status == HealthStatus::Dead {
            if let Some(scar) = self.roll_scar(prev, rng) {
                message.push(' ');
                message.push_str(&scar);
            }
        }
        message
    }

    fn roll_scar(&mut self, prev: HealthStatus, rng: &mut GameRng) -> Option<String> {
        let chance = match prev {
            HealthStatus::Injured => INJURED_SCAR_CHANCE,
            HealthStatus::Dying => DYING_SCAR_CHANCE,
            _ => return None,
        };
        if !rng.gen_bool(chance) {
            return None;
        }
        let scar = format!("a scar earned while {}", prev.label());
        self.scars.push(scar.clone());
        Some(format!("It leaves {scar}."))
    }
}
