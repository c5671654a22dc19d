//! Output contracts from the blend engine.
//!
//! Outputs carry the discrete events raised while stepping one frame. Host
//! adapters read them after `BlendEngine::update` to react to completions.

use serde::{Deserialize, Serialize};

use crate::ids::CompletionTag;

/// Discrete signals emitted during `update`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BlendEvent {
    /// A weight ramp reached its end value.
    FadeCompleted { nick: String, weight: f32 },
    /// A looping action wrapped around.
    Looped { nick: String },
    /// A loop-synchronised crossfade executed.
    SyncCrossFadeFired { from: String, to: String },
    /// A one-shot reached its natural end; emitted after the restore started.
    OneShotFinished {
        nick: String,
        tag: Option<CompletionTag>,
    },
    /// Control handed back after a one-shot.
    Restored {
        from: String,
        to: String,
        /// The requested target was unusable and the fallback was taken.
        fallback: bool,
    },
}

/// Per-frame outputs returned by `BlendEngine::update`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<BlendEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: BlendEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Completion tags of one-shots that finished this frame, in order.
    pub fn finished_one_shots(&self) -> impl Iterator<Item = (&str, Option<CompletionTag>)> {
        self.events.iter().filter_map(|ev| match ev {
            BlendEvent::OneShotFinished { nick, tag } => Some((nick.as_str(), *tag)),
            _ => None,
        })
    }
}

/// One weighted contribution to the composed pose.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseLayer {
    pub nick: String,
    pub clip: String,
    pub weight: f32,
    pub time: f32,
}
