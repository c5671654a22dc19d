//! Per-entity controller state: input flags, the shot timer and deferred
//! cancels. Engine-side state (active, previous, cached, temp) is read from
//! the blend engine, never mirrored here.

use serde::{Deserialize, Serialize};

use crate::decision::{CancelKind, Decision};
use crate::input::{InputChannel, InputEdge};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFlags {
    pub forward: bool,
    pub backward: bool,
    pub turning_left: bool,
    pub turning_right: bool,
    pub accelerating: bool,
    pub meleeing: bool,
    pub gun_pointing: bool,
    pub shooting: bool,
    /// Set when an interaction starts, cleared when it completes.
    pub interacting: bool,
}

impl InputFlags {
    #[inline]
    pub fn attacking(&self) -> bool {
        self.meleeing || self.gun_pointing
    }

    /// Copy with a movement edge applied; other channels leave it unchanged.
    pub fn with_movement(mut self, edge: InputEdge) -> Self {
        let v = edge.pressed;
        match edge.channel {
            InputChannel::MovingForward => self.forward = v,
            InputChannel::MovingBackward => self.backward = v,
            InputChannel::MovingLeft => self.turning_left = v,
            InputChannel::MovingRight => self.turning_right = v,
            InputChannel::Accelerate => self.accelerating = v,
            _ => {}
        }
        self
    }
}

/// Releases that arrived while a shot was in flight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredCancels {
    pub gun_point: bool,
    pub shoot: bool,
}

impl DeferredCancels {
    pub fn is_pending(&self, kind: CancelKind) -> bool {
        match kind {
            CancelKind::GunPoint => self.gun_point,
            CancelKind::Shoot => self.shoot,
        }
    }

    fn set(&mut self, kind: CancelKind, value: bool) {
        match kind {
            CancelKind::GunPoint => self.gun_point = value,
            CancelKind::Shoot => self.shoot = value,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    pub flags: InputFlags,
    /// Seconds left on the shot in flight.
    pub shot_remaining: Option<f32>,
    pub cancels: DeferredCancels,
}

impl ControllerState {
    /// True while the weapon interval of the last shot has not elapsed.
    #[inline]
    pub fn firing(&self) -> bool {
        self.shot_remaining.is_some()
    }

    /// Write the flags for `edge` once its decision has run. Rejected edges
    /// leave the state untouched; deferred releases keep their flag set until
    /// the attack tick applies them.
    pub fn commit(&mut self, edge: InputEdge, decision: &Decision) {
        match decision {
            Decision::Reject(_) => return,
            Decision::DeferCancel(kind) => {
                self.cancels.set(*kind, true);
                return;
            }
            Decision::KeepAiming => {
                self.cancels.gun_point = false;
                return;
            }
            _ => {}
        }

        let v = edge.pressed;
        match edge.channel {
            c if c.is_movement() => self.flags = self.flags.with_movement(edge),
            InputChannel::Melee => self.flags.meleeing = v,
            InputChannel::GunPoint => {
                self.flags.gun_pointing = v;
                if !v {
                    self.cancels.gun_point = false;
                }
            }
            InputChannel::Shoot => {
                self.flags.shooting = v;
                if v {
                    // A re-press during the interval drops both pending
                    // releases, including an unrelated gun-point cancel.
                    self.cancels = DeferredCancels::default();
                }
            }
            InputChannel::Interact => {
                if v {
                    self.flags.interacting = true;
                }
            }
            _ => {}
        }
    }

    /// Advance the shot timer; true on the frame the interval runs out.
    pub(crate) fn tick_shot(&mut self, dt: f32) -> bool {
        match self.shot_remaining.as_mut() {
            Some(left) => {
                *left -= dt;
                if *left <= 0.0 {
                    self.shot_remaining = None;
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }
}
