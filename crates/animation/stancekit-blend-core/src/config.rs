//! Static clip configuration table consumed at registration time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reference to a playable clip. Only the name and length matter to blending;
/// sampling the clip is the renderer's business.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipRef {
    pub name: String,
    /// Clip length in seconds.
    pub duration: f32,
}

impl ClipRef {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Per-action registration settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    #[serde(default)]
    pub loop_once: bool,
    #[serde(default = "default_true")]
    pub start_immediately: bool,
    #[serde(default = "default_one")]
    pub time_scale: f32,
    /// Steady-state weight once faded in.
    #[serde(default = "default_one")]
    pub weight: f32,
    #[serde(default)]
    pub is_default: bool,
}

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            loop_once: false,
            start_immediately: true,
            time_scale: 1.0,
            weight: 1.0,
            is_default: false,
        }
    }
}

impl ActionConfig {
    /// Looping action that plays from registration.
    pub fn looping() -> Self {
        Self::default()
    }

    /// One-shot action; never auto-started.
    pub fn once() -> Self {
        Self {
            loop_once: true,
            start_immediately: false,
            ..Self::default()
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}

/// One row of the clip table: which clip a nick plays and how.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipEntry {
    pub clip: String,
    pub duration: f32,
    #[serde(flatten)]
    pub config: ActionConfig,
}

impl ClipEntry {
    pub fn clip_ref(&self) -> ClipRef {
        ClipRef::new(self.clip.clone(), self.duration)
    }
}

/// Nick -> clip entry. Registration follows table order so ids are stable for a
/// given table.
pub type ClipTable = IndexMap<String, ClipEntry>;

/// Parse a clip table from its JSON object form.
pub fn parse_clip_table(json: &str) -> Result<ClipTable, serde_json::Error> {
    serde_json::from_str(json)
}
