//! The activation return channel.
//!
//! `activate` communicates exclusively through a [`TriggerResponse`]:
//! triggers to chain, narration to emit, attributes to pass along, and a
//! log line. The reconciler consumes responses; nothing else does.

use serde::{Deserialize, Serialize};

use crate::core::{Attributes, TriggerId};

/// What activating a trigger produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerResponse {
    /// Trigger ids fired as a consequence. Each re-runs the full gating
    /// before it arms.
    #[serde(default)]
    pub chained: Vec<TriggerId>,

    /// Narration to emit, if any.
    #[serde(default)]
    pub narrative_message: Option<String>,

    /// Attributes carried forward from the arming stash.
    #[serde(default)]
    pub attributes: Option<Attributes>,

    /// Line for the session log.
    #[serde(default)]
    pub log_message: Option<String>,
}

impl TriggerResponse {
    /// An empty response: nothing chained, nothing narrated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add chained trigger ids (builder pattern).
    #[must_use]
    pub fn with_chained(mut self, ids: impl IntoIterator<Item = TriggerId>) -> Self {
        self.chained.extend(ids);
        self
    }

    /// Set the narration (builder pattern).
    #[must_use]
    pub fn with_narrative(mut self, message: impl Into<String>) -> Self {
        self.narrative_message = Some(message.into());
        self
    }

    /// Attach attributes (builder pattern).
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Set the log line (builder pattern).
    #[must_use]
    pub fn with_log(mut self, message: impl Into<String>) -> Self {
        self.log_message = Some(message.into());
        self
    }

    /// Append a narration line, joining with a newline if one is set.
    pub fn push_narrative(&mut self, message: &str) {
        match &mut self.narrative_message {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(message);
            }
            None => self.narrative_message = Some(message.to_string()),
        }
    }
}
