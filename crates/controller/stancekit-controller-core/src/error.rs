//! Controller error types.

use stancekit_blend::BlendError;

use crate::variant::EntityVariant;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ControllerError {
    /// The clip table cannot back this variant's decision table. Raised at
    /// construction, never lazily.
    #[error("Configuration error for {variant:?}: {reason}")]
    Configuration {
        variant: EntityVariant,
        reason: String,
    },

    /// Controller config JSON did not parse
    #[error("Failed to parse controller config: {reason}")]
    Parse { reason: String },

    /// Blend engine rejected a call at runtime
    #[error(transparent)]
    Blend(#[from] BlendError),
}

impl ControllerError {
    pub(crate) fn config(variant: EntityVariant, reason: impl Into<String>) -> Self {
        Self::Configuration {
            variant,
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } | Self::Parse { .. } => "configuration",
            Self::Blend(inner) => inner.category(),
        }
    }
}

impl From<serde_json::Error> for ControllerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
