//! Collaborator seams: the narrative agent and the media generator.
//!
//! Both are synchronous from the engine's perspective. The engine does not
//! advance state while a call is outstanding, and nothing else mutates the
//! session meanwhile. Implementations backed by a language model or an
//! image/audio pipeline live outside this crate; the test doubles here are
//! all the engine itself needs.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::narration::Narration;

/// A named parameter of a catalog action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionParam {
    /// Parameter name as it appears in invocations.
    pub name: &'static str,
    /// Natural-language description for the agent.
    pub description: &'static str,
}

/// One action the current game mode exposes to the narrative agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSpec {
    /// Action name as it appears in invocations.
    pub name: &'static str,
    /// Natural-language description for the agent.
    pub description: &'static str,
    /// Typed parameters.
    pub params: &'static [ActionParam],
}

/// An action the agent chose, with its arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionInvocation {
    /// Catalog action name.
    pub name: String,
    /// Argument values by parameter name.
    pub args: FxHashMap<String, String>,
}

impl ActionInvocation {
    /// Create an invocation with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: FxHashMap::default(),
        }
    }

    /// Add an argument (builder pattern).
    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Look up an argument.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }
}

/// The narrative agent: event text plus an action catalog in, chosen
/// invocations out.
pub trait NarrativeAgent {
    /// Choose zero or more actions in response to an event.
    fn choose_actions(
        &mut self,
        event: &str,
        catalog: &[ActionSpec],
        history: &[Narration],
    ) -> Vec<ActionInvocation>;
}

/// Artifact handles produced for one narration line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaArtifacts {
    /// Rendered audio, if any.
    pub audio_path: Option<String>,
    /// Rendered image, if any.
    pub image_path: Option<String>,
}

/// The media generator: narration text in, opaque artifact handles out.
pub trait MediaGenerator {
    /// Produce artifacts for a narration line.
    fn generate(&mut self, text: &str) -> MediaArtifacts;
}

/// Test double: replays scripted invocation batches, one per call, then
/// falls silent.
#[derive(Debug, Default)]
pub struct ScriptedAgent {
    batches: VecDeque<Vec<ActionInvocation>>,
}

impl ScriptedAgent {
    /// Create an agent with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch of invocations for the next call (builder pattern).
    #[must_use]
    pub fn then(mut self, batch: Vec<ActionInvocation>) -> Self {
        self.batches.push_back(batch);
        self
    }

    /// Queue a batch of invocations for the next call.
    pub fn push(&mut self, batch: Vec<ActionInvocation>) {
        self.batches.push_back(batch);
    }
}

impl NarrativeAgent for ScriptedAgent {
    fn choose_actions(
        &mut self,
        _event: &str,
        _catalog: &[ActionSpec],
        _history: &[Narration],
    ) -> Vec<ActionInvocation> {
        self.batches.pop_front().unwrap_or_default()
    }
}

/// Test double: produces no artifacts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMediaGenerator;

impl MediaGenerator for NullMediaGenerator {
    fn generate(&mut self, _text: &str) -> MediaArtifacts {
        MediaArtifacts::default()
    }
}
