//! Deterministic random number generation.
//!
//! Every stochastic outcome in the engine - trigger chance gates, combat
//! rolls, scar rolls - draws from one seeded [`GameRng`] owned by the
//! session. Nothing reads OS entropy, so a session replays identically from
//! the same seed and input sequence.
//!
//! The ChaCha8 word position makes state capture O(1) regardless of how many
//! numbers have been generated, which keeps save snapshots cheap.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG for a game session.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random boolean with the given probability of `true`.
    ///
    /// Used for trigger chance gates and scar rolls.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        // gen_bool panics outside [0, 1]; catalog data is already validated,
        // but clamp so a hand-built gate cannot take the engine down.
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Roll uniformly in `[0, 100]` inclusive. The combat resolution roll.
    pub fn d100(&mut self) -> i32 {
        self.inner.gen_range(0..=100)
    }

    /// Generate a random integer in the given range.
    pub fn gen_range(&mut self, range: std::ops::Range<i32>) -> i32 {
        self.inner.gen_range(range)
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state for save snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.d100(), rng2.d100());
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.d100()).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.d100()).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_d100_bounds() {
        let mut rng = GameRng::new(7);
        for _ in 0..1000 {
            let roll = rng.d100();
            assert!((0..=100).contains(&roll));
        }
    }

    #[test]
    fn test_gen_bool_extremes() {
        let mut rng = GameRng::new(42);
        assert!(rng.gen_bool(1.0));
        assert!(!rng.gen_bool(0.0));
        // Out-of-range probabilities are clamped, not panicked on.
        assert!(rng.gen_bool(2.5));
    }

    #[test]
    fn test_state_round_trip() {
        let mut rng = GameRng::new(42);

        for _ in 0..100 {
            rng.d100();
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.d100()).collect();

        let mut restored = GameRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.d100()).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_state_serde() {
        let state = GameRngState {
            seed: 42,
            word_pos: 12345,
        };

        let json = serde_json::to_string(&state).unwrap();
        let deserialized: GameRngState = serde_json::from_str(&json).unwrap();

        assert_eq!(state, deserialized);
    }
}
