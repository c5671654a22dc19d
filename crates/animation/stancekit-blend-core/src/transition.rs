//! Transition requests and their outcomes.

use serde::{Deserialize, Serialize};

use crate::ids::CompletionTag;

/// Everything `BlendEngine::prepare_transition` needs to pick and run one
/// transition primitive. Transient; nothing keeps it after the call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub from: String,
    pub to: String,
    /// Fade-in time in seconds.
    pub duration: f32,
    pub end_weight: f32,
    /// Fade time used when a one-shot hands back control.
    pub restore_duration: f32,
    /// Wait for `from` to finish its current loop before fading.
    pub sync: bool,
    /// Plain crossfade into a looping target.
    pub looping: bool,
    /// Reported back in `OneShotFinished`.
    pub on_done: Option<CompletionTag>,
}

impl TransitionRequest {
    /// Plain crossfade into a looping action.
    pub fn looping(from: impl Into<String>, to: impl Into<String>, duration: f32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            duration,
            end_weight: 1.0,
            restore_duration: 0.0,
            sync: false,
            looping: true,
            on_done: None,
        }
    }

    /// Crossfade deferred to the end of `from`'s current loop.
    pub fn synced(from: impl Into<String>, to: impl Into<String>, duration: f32) -> Self {
        Self {
            sync: true,
            looping: false,
            ..Self::looping(from, to, duration)
        }
    }

    /// One-shot that restores after completion.
    pub fn one_shot(
        from: impl Into<String>,
        to: impl Into<String>,
        duration: f32,
        restore_duration: f32,
    ) -> Self {
        Self {
            restore_duration,
            looping: false,
            ..Self::looping(from, to, duration)
        }
    }

    pub fn with_end_weight(mut self, end_weight: f32) -> Self {
        self.end_weight = end_weight;
        self
    }

    pub fn with_on_done(mut self, tag: CompletionTag) -> Self {
        self.on_done = Some(tag);
        self
    }
}

/// What a transition call actually did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionOutcome {
    /// A crossfade (or one-shot fade-in) began.
    Started,
    /// A one-shot is busy; the target was stored as the cached action.
    Queued,
    /// Armed to fire on the next loop boundary of `from`.
    Synced,
    /// Target already active; only its pending effect (if any) was applied.
    Refreshed,
    /// Target already active, nothing to do.
    Unchanged,
}
