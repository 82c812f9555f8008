//! Trigger activation: the Armed → Resolved step.
//!
//! Activation performs side effects - narration, mode switches, character
//! imports, reveals - and reports everything else through the returned
//! [`TriggerResponse`].
//!
//! The exclusion-ledger write happens **before** any side effect. If a
//! later step fails, the trigger is already recorded and cannot refire;
//! a trigger that fired without recording its exclusions could.

use tracing::info;

use crate::core::attributes::{get_text, get_text_list};
use crate::triggers::{ArmedTrigger, TriggerKind, TriggerResponse};

use super::mode::GameMode;
use super::Game;

impl Game {
    /// Activate one armed trigger.
    pub(crate) fn activate_trigger(&mut self, armed: &ArmedTrigger) -> TriggerResponse {
        // At-most-once: record exclusions before anything can observe the
        // activation.
        for id in &armed.ids_to_exclude {
            self.player_mut().quest_log.record_completed_trigger(id.clone());
        }

        // Quest effects land with the exclusion write, ahead of narration,
        // so a failure mid-activation cannot leave the ledger half-updated.
        for id in &armed.quests_to_activate {
            if self.player_mut().quest_log.activate_quest(id.clone()) {
                info!(quest = %id, "quest activated");
            }
        }
        for id in &armed.quests_to_complete {
            self.player_mut().quest_log.complete_quest(id.clone());
            info!(quest = %id, "quest completed");
        }

        let mut response = TriggerResponse::new()
            .with_chained(armed.ids_to_trigger.iter().cloned())
            .with_log(format!("Trigger {} activated", armed.id.as_str()));

        if let Some(prompt) = &armed.narrative_prompt {
            response.push_narrative(prompt);
        }

        match &armed.kind {
            TriggerKind::OnEntry
            | TriggerKind::OnExit
            | TriggerKind::TurnsInLocation
            | TriggerKind::OnReveal => {
                // Narration-only variants; the prompt above is the effect.
            }

            TriggerKind::DescribeLocation => {
                let description = get_text(&armed.attributes, "description")
                    .map(str::to_string)
                    .unwrap_or_else(|| self.environment().visual_description.clone());
                response.push_narrative(&description);
            }

            TriggerKind::TriggerEventAnyCharacter | TriggerKind::TriggerEventAllCharacter => {
                if let Some(names) = get_text_list(&armed.attributes, "characters") {
                    let names = names.to_vec();
                    self.import_into_focus(&names);
                }
                self.switch_game_mode(GameMode::Dialogue);
            }

            TriggerKind::Reveal { targets } => {
                for target in targets {
                    let Some(outcome) = self.environment_mut().reveal_position(target) else {
                        continue;
                    };
                    info!(position = %target, "position revealed");
                    if let Some(narration) = &outcome.narration {
                        response.push_narrative(narration);
                    }
                    response.chained.extend(outcome.chained);
                }
            }
        }

        response
    }
}
