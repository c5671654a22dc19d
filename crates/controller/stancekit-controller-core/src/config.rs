//! Controller configuration: transition tuning, weapon profile and the
//! per-entity config document.

use serde::{Deserialize, Serialize};
use stancekit_blend::ClipTable;

use crate::error::ControllerError;
use crate::variant::EntityVariant;

/// Transition durations (seconds) and weight constants. Weight scales pose
/// amplitude, duration scales elapsed blend time; the two never interact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub idle_to_walk: f32,
    pub walk_to_idle: f32,
    pub walk_to_run: f32,
    pub run_to_walk: f32,
    pub idle_to_run: f32,
    pub run_to_idle: f32,
    /// Any locomotion pair not listed above, including a same-gait refresh.
    pub default_fade: f32,

    /// Walk weight while rotating in place.
    pub turn_weight: f32,
    /// Walk weight and playback direction when moving backwards.
    pub back_walk_weight: f32,
    pub back_walk_time_scale: f32,

    pub aim_in: f32,
    pub aim_out: f32,
    pub shoot_in: f32,
    pub shoot_restore: f32,
    pub melee_in: f32,
    pub melee_restore: f32,
    pub interact_in: f32,
    pub interact_restore: f32,

    /// Hold walk <-> run changes until the current stride loop ends.
    pub sync_gait: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            idle_to_walk: 0.1,
            walk_to_idle: 0.1,
            walk_to_run: 0.2,
            run_to_walk: 0.2,
            idle_to_run: 0.2,
            run_to_idle: 0.2,
            default_fade: 0.2,
            turn_weight: 0.7,
            back_walk_weight: 0.7,
            back_walk_time_scale: -1.0,
            aim_in: 0.2,
            aim_out: 0.2,
            shoot_in: 0.05,
            shoot_restore: 0.1,
            melee_in: 0.1,
            melee_restore: 0.2,
            interact_in: 0.15,
            interact_restore: 0.25,
            sync_gait: false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FireMode {
    /// One shot per trigger press.
    Semi,
    /// Repeats every interval while the trigger is held.
    Auto,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub fire_mode: FireMode,
    /// Seconds between shots; a shot is "in flight" for this long.
    pub interval: f32,
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self {
            fire_mode: FireMode::Semi,
            interval: 0.35,
        }
    }
}

/// Everything needed to build one entity's controller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub variant: EntityVariant,
    pub clips: ClipTable,
    /// Replaces the variant's tuning wholesale; missing fields take the global
    /// defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuning: Option<Tuning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<WeaponProfile>,
}

impl ControllerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ControllerError> {
        Ok(serde_json::from_str(json)?)
    }
}
