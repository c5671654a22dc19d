//! Action records: one playable pose source with its own weight, time scale and
//! play position.

use serde::{Deserialize, Serialize};

use crate::config::{ActionConfig, ClipRef};
use crate::ids::ActionId;

/// Deferred side effect attached to an action.
///
/// Applied exactly once, at the moment the action is picked as a crossfade
/// target. Both fields are optional so a caller can refresh only the time scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionEffect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_scale: Option<f32>,
}

impl ActionEffect {
    pub fn weight(weight: f32) -> Self {
        Self {
            weight: Some(weight),
            time_scale: None,
        }
    }

    pub fn time_scale(time_scale: f32) -> Self {
        Self {
            weight: None,
            time_scale: Some(time_scale),
        }
    }

    pub fn weight_and_scale(weight: f32, time_scale: f32) -> Self {
        Self {
            weight: Some(weight),
            time_scale: Some(time_scale),
        }
    }
}

/// Coarse blend phase of a single action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendPhase {
    Idle,
    FadingIn,
    SteadyActive,
    FadingOut,
}

/// Linear weight ramp.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Fade {
    pub from: f32,
    pub to: f32,
    pub elapsed: f32,
    pub duration: f32,
}

impl Fade {
    #[inline]
    fn sample(&self) -> f32 {
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        let lo = self.from.min(self.to);
        let hi = self.from.max(self.to);
        (self.from + (self.to - self.from) * t).clamp(lo, hi)
    }

    #[inline]
    fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// What happened to an action during one `advance` step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct StepFlags {
    pub fade_completed: bool,
    pub looped: bool,
    pub finished: bool,
}

#[derive(Clone, Debug)]
pub struct Action {
    pub(crate) id: ActionId,
    pub(crate) nick: String,
    pub(crate) clip: ClipRef,
    pub(crate) weight: f32,
    pub(crate) target_weight: f32,
    pub(crate) time_scale: f32,
    pub(crate) loop_once: bool,
    pub(crate) is_default: bool,
    pub(crate) busy: bool,
    pub(crate) enabled: bool,
    pub(crate) playing: bool,
    pub(crate) time: f32,
    pub(crate) pending: Option<ActionEffect>,
    pub(crate) fade: Option<Fade>,
}

impl Action {
    pub(crate) fn new(id: ActionId, nick: String, clip: ClipRef, cfg: &ActionConfig) -> Self {
        let mut action = Self {
            id,
            nick,
            clip,
            weight: if cfg.is_default { 1.0 } else { 0.0 },
            target_weight: if cfg.is_default { 1.0 } else { cfg.weight },
            time_scale: cfg.time_scale,
            loop_once: cfg.loop_once,
            is_default: cfg.is_default,
            busy: false,
            enabled: true,
            playing: false,
            time: 0.0,
            pending: None,
            fade: None,
        };
        if !cfg.loop_once && cfg.start_immediately {
            action.play_from_start();
        }
        action
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn clip(&self) -> &ClipRef {
        &self.clip
    }

    /// Current blend influence, including any in-flight fade.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Weight this action settles at when faded in.
    pub fn target_weight(&self) -> f32 {
        self.target_weight
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn loop_once(&self) -> bool {
        self.loop_once
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Play position in clip seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn pending_effect(&self) -> Option<&ActionEffect> {
        self.pending.as_ref()
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn phase(&self) -> BlendPhase {
        match self.fade {
            Some(f) if f.to > 0.0 => BlendPhase::FadingIn,
            Some(_) => BlendPhase::FadingOut,
            None if self.weight > 0.0 => BlendPhase::SteadyActive,
            None => BlendPhase::Idle,
        }
    }

    /// Rewind to the start of the clip in the current play direction and play.
    pub(crate) fn play_from_start(&mut self) {
        self.time = if self.time_scale < 0.0 {
            self.clip.duration
        } else {
            0.0
        };
        self.playing = true;
    }

    /// Ramp the weight towards `to` over `duration` seconds, starting from the
    /// current weight. A non-positive duration snaps.
    pub(crate) fn fade_to(&mut self, to: f32, duration: f32) {
        if duration <= 0.0 || (self.weight - to).abs() <= f32::EPSILON {
            self.weight = to;
            self.fade = None;
            return;
        }
        self.fade = Some(Fade {
            from: self.weight,
            to,
            elapsed: 0.0,
            duration,
        });
    }

    /// Set weight directly, dropping any ramp in progress.
    pub(crate) fn set_weight_now(&mut self, weight: f32) {
        self.weight = weight;
        self.target_weight = weight;
        self.fade = None;
    }

    pub(crate) fn apply_effect(&mut self, effect: ActionEffect) {
        if let Some(ts) = effect.time_scale {
            self.time_scale = ts;
        }
        if let Some(w) = effect.weight {
            self.target_weight = w;
        }
    }

    /// Advance fade and play position by `dt` seconds.
    pub(crate) fn advance(&mut self, dt: f32) -> StepFlags {
        let mut flags = StepFlags::default();

        if let Some(fade) = self.fade.as_mut() {
            fade.elapsed += dt;
            if fade.is_done() {
                self.weight = fade.to;
                self.fade = None;
                flags.fade_completed = true;
            } else {
                self.weight = fade.sample();
            }
        }

        let duration = self.clip.duration;
        if !self.playing || duration <= 0.0 {
            return flags;
        }

        self.time += dt * self.time_scale;
        if self.loop_once {
            if self.time_scale >= 0.0 && self.time >= duration {
                self.time = duration;
                self.playing = false;
                flags.finished = true;
            } else if self.time_scale < 0.0 && self.time <= 0.0 {
                self.time = 0.0;
                self.playing = false;
                flags.finished = true;
            }
        } else if self.time >= duration || self.time < 0.0 {
            self.time = self.time.rem_euclid(duration);
            flags.looped = true;
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk(cfg: ActionConfig, duration: f32) -> Action {
        Action::new(ActionId(0), "a".into(), ClipRef::new("A", duration), &cfg)
    }

    #[test]
    fn looping_action_wraps_and_flags() {
        let mut a = mk(ActionConfig::looping(), 1.0);
        assert!(a.is_playing());
        assert!(!a.advance(0.6).looped);
        let step = a.advance(0.6);
        assert!(step.looped);
        assert!((a.time() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn reversed_loop_wraps_backwards() {
        let mut a = mk(ActionConfig::looping().with_time_scale(-1.0), 1.0);
        assert_eq!(a.time(), 1.0);
        assert!(!a.advance(0.5).looped);
        assert!(a.advance(0.75).looped);
        assert!((a.time() - 0.75).abs() < 1e-5);
    }

    #[test]
    fn one_shot_finishes_once() {
        let mut a = mk(ActionConfig::once(), 0.5);
        assert!(!a.is_playing());
        a.play_from_start();
        assert!(!a.advance(0.3).finished);
        assert!(a.advance(0.3).finished);
        assert_eq!(a.time(), 0.5);
        assert!(!a.advance(0.3).finished);
    }

    #[test]
    fn fade_is_linear_and_settles() {
        let mut a = mk(ActionConfig::looping(), 1.0);
        a.fade_to(1.0, 0.2);
        assert_eq!(a.phase(), BlendPhase::FadingIn);
        a.advance(0.1);
        assert!((a.weight() - 0.5).abs() < 1e-5);
        let step = a.advance(0.15);
        assert!(step.fade_completed);
        assert_eq!(a.weight(), 1.0);
        assert_eq!(a.phase(), BlendPhase::SteadyActive);
    }

    #[test]
    fn effect_updates_scale_and_target() {
        let mut a = mk(ActionConfig::looping(), 1.0);
        a.apply_effect(ActionEffect::weight_and_scale(0.7, -1.0));
        assert_eq!(a.time_scale(), -1.0);
        assert_eq!(a.target_weight(), 0.7);
        assert_eq!(a.weight(), 0.0);
    }
}
