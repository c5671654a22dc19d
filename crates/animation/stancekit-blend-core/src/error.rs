//! Error types for the blend engine

use serde::{Deserialize, Serialize};

/// Errors raised by registry and blend operations.
///
/// None of these are retried: configuration problems surface at registration,
/// an unknown nick at the call that referenced it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BlendError {
    /// No action registered under this nick
    #[error("Action not found: {nick}")]
    ActionNotFound { nick: String },

    /// Nick registered twice
    #[error("Action already registered: {nick}")]
    DuplicateAction { nick: String },

    /// A second action claimed to be the default
    #[error("Default action already set to {existing}, cannot also mark {nick}")]
    DuplicateDefault { existing: String, nick: String },

    /// Clip metadata unusable for playback
    #[error("Invalid clip for action {nick}: {reason}")]
    InvalidClip { nick: String, reason: String },

    /// Negative or non-finite frame delta
    #[error("Invalid frame delta: {delta}")]
    InvalidDelta { delta: f32 },
}

impl BlendError {
    pub(crate) fn not_found(nick: impl Into<String>) -> Self {
        Self::ActionNotFound { nick: nick.into() }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::ActionNotFound { .. } => "lookup",
            Self::DuplicateAction { .. }
            | Self::DuplicateDefault { .. }
            | Self::InvalidClip { .. } => "configuration",
            Self::InvalidDelta { .. } => "timing",
        }
    }
}
