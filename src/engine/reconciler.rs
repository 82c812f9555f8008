//! Recursive trigger reconciliation, iteratively.
//!
//! The reconciler drives an explicit worklist: activate every trigger in
//! the current wave, collect the chained ids, re-validate each against the
//! *current* quest log and environment, and make the survivors the next
//! wave. Chained triggers get no gating bypass. The loop ends when a wave
//! arms nothing.
//!
//! An explicit queue, not recursion: chain depth is bounded by catalog
//! size, not stack size. Termination is guaranteed because the catalog
//! rejects chain cycles with no exclusion member at load time - every
//! cycle eventually writes the exclusion ledger and stops re-arming.

use tracing::{debug, info};

use crate::core::TriggerId;
use crate::error::EngineError;
use crate::triggers::ArmedTrigger;

use super::narration::Narration;
use super::Game;

impl Game {
    /// Resolve a worklist of armed triggers to a terminal state.
    ///
    /// Returns the number of waves processed (an already-empty worklist is
    /// zero waves).
    pub fn reconcile(&mut self, initial: Vec<ArmedTrigger>) -> Result<u32, EngineError> {
        let mut wave = initial;
        let mut waves = 0u32;

        while !wave.is_empty() {
            waves += 1;
            debug!(wave = waves, triggers = wave.len(), "reconciliation wave");

            let mut chained: Vec<TriggerId> = Vec::new();
            for armed in &wave {
                let response = self.activate_trigger(armed);
                if let Some(text) = &response.narrative_message {
                    self.push_narration(Narration::stage(text.clone()));
                }
                if let Some(log) = &response.log_message {
                    info!(trigger = %armed.id, "{log}");
                }
                chained.extend(response.chained);
            }

            // Re-validate every chained id against the state the wave left
            // behind; only those that arm make the next wave.
            let mut next = Vec::new();
            for id in chained {
                let def = self.data.triggers.resolve(&id)?;
                if let Some(armed) =
                    def.prepare(&self.player.quest_log, &self.environment, &mut self.rng)
                {
                    next.push(armed);
                }
            }
            wave = next;
        }

        Ok(waves)
    }
}
