//! Pure decision functions: (state, edge, engine view) -> Decision.
//!
//! Nothing here touches the engine. The controller executes the returned
//! decision, then commits the edge to its flags, so every rule below reads
//! the flags as they were before the edge.

use serde::{Deserialize, Serialize};
use stancekit_blend::{ActionEffect, CompletionTag, TransitionRequest};

use crate::config::{FireMode, Tuning, WeaponProfile};
use crate::input::{InputChannel, InputEdge};
use crate::state::{ControllerState, InputFlags};
use crate::variant::{ActionGroup, DecisionTable, Gait};

pub const MELEE_DONE: CompletionTag = CompletionTag(1);
pub const INTERACT_DONE: CompletionTag = CompletionTag(2);
pub const SHOT_DONE: CompletionTag = CompletionTag(3);

/// What the decision functions may know about the engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineView<'a> {
    pub active: &'a str,
    /// One-shot in flight, if any.
    pub busy: Option<&'a str>,
}

impl EngineView<'_> {
    fn busy_with_other(&self, nick: &str) -> bool {
        self.busy.is_some_and(|b| b != nick)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The variant has no action for this channel.
    Unsupported,
    Interacting,
    /// Melee and gun pointing exclude each other and interaction.
    ExclusiveAttack,
    /// A different one-shot is still playing.
    Busy,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancelKind {
    GunPoint,
    Shoot,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Decision {
    /// Flags only.
    Ignore,
    Reject(RejectReason),
    /// Attach `effect` to the target (if any), then `prepare_transition`.
    Transition {
        request: TransitionRequest,
        effect: Option<ActionEffect>,
    },
    /// Attach `effect` to `target` without transitioning. With `queue` the
    /// target also becomes the restore target of a busy one-shot.
    Defer {
        target: String,
        effect: ActionEffect,
        queue: bool,
    },
    /// Release arrived mid-shot; applied when the shot interval ends.
    DeferCancel(CancelKind),
    /// Gun point re-pressed while its release was still deferred.
    KeepAiming,
    /// Start the shoot one-shot and the weapon interval.
    Fire { request: TransitionRequest },
    RequestAimTarget,
}

/// Locomotion action to settle into, with its weight and direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Locomotion {
    pub gait: Gait,
    pub weight: f32,
    pub time_scale: f32,
}

impl Locomotion {
    pub fn effect(&self) -> ActionEffect {
        ActionEffect::weight_and_scale(self.weight, self.time_scale)
    }
}

pub fn locomotion(flags: &InputFlags, tuning: &Tuning) -> Locomotion {
    let (gait, weight, time_scale) = match (flags.forward, flags.backward) {
        (true, false) if flags.accelerating => (Gait::Run, 1.0, 1.0),
        (true, false) => (Gait::Walk, 1.0, 1.0),
        (false, true) => (
            Gait::Walk,
            tuning.back_walk_weight,
            tuning.back_walk_time_scale,
        ),
        _ if flags.turning_left != flags.turning_right => (Gait::Walk, tuning.turn_weight, 1.0),
        _ => (Gait::Idle, 1.0, 1.0),
    };
    Locomotion {
        gait,
        weight,
        time_scale,
    }
}

/// Crossfade time between two gaits; `from` is `None` off locomotion.
pub fn gait_fade(from: Option<Gait>, to: Gait, tuning: &Tuning) -> f32 {
    use Gait::*;
    match (from, to) {
        (Some(Idle), Walk) => tuning.idle_to_walk,
        (Some(Walk), Idle) => tuning.walk_to_idle,
        (Some(Walk), Run) => tuning.walk_to_run,
        (Some(Run), Walk) => tuning.run_to_walk,
        (Some(Idle), Run) => tuning.idle_to_run,
        (Some(Run), Idle) => tuning.run_to_idle,
        _ => tuning.default_fade,
    }
}

fn locomotion_request(
    group: &ActionGroup,
    tuning: &Tuning,
    active: &str,
    loco: &Locomotion,
    duration: Option<f32>,
) -> TransitionRequest {
    let from_gait = group.gait_of(active);
    let to = group.gait_nick(loco.gait);
    let duration = duration.unwrap_or_else(|| gait_fade(from_gait, loco.gait, tuning));
    let stride_change = matches!(
        (from_gait, loco.gait),
        (Some(Gait::Walk), Gait::Run) | (Some(Gait::Run), Gait::Walk)
    );
    let req = if tuning.sync_gait && stride_change && active != to {
        TransitionRequest::synced(active, to, duration)
    } else {
        TransitionRequest::looping(active, to, duration)
    };
    req.with_end_weight(loco.weight)
}

/// Crossfade out of aim into whatever the movement flags ask for.
pub fn aim_exit(flags: &InputFlags, table: &DecisionTable, view: &EngineView<'_>) -> Decision {
    let loco = locomotion(flags, &table.tuning);
    Decision::Transition {
        request: locomotion_request(
            &table.group,
            &table.tuning,
            view.active,
            &loco,
            Some(table.tuning.aim_out),
        ),
        effect: Some(loco.effect()),
    }
}

pub fn fire_request(table: &DecisionTable, shoot: &str, view: &EngineView<'_>) -> TransitionRequest {
    TransitionRequest::one_shot(
        view.active,
        shoot,
        table.tuning.shoot_in,
        table.tuning.shoot_restore,
    )
    .with_on_done(SHOT_DONE)
}

pub fn melee_request(table: &DecisionTable, melee: &str, view: &EngineView<'_>) -> TransitionRequest {
    TransitionRequest::one_shot(
        view.active,
        melee,
        table.tuning.melee_in,
        table.tuning.melee_restore,
    )
    .with_on_done(MELEE_DONE)
}

/// Map one input edge to one decision.
pub fn decide(
    state: &ControllerState,
    table: &DecisionTable,
    weapon: &WeaponProfile,
    view: &EngineView<'_>,
    edge: InputEdge,
) -> Decision {
    match edge.channel {
        c if c.is_movement() => decide_movement(state, table, view, edge),
        InputChannel::Melee => decide_melee(state, table, view, edge.pressed),
        InputChannel::GunPoint => decide_gun_point(state, table, weapon, view, edge.pressed),
        InputChannel::Shoot => decide_shoot(state, table, view, edge.pressed),
        InputChannel::Interact => decide_interact(state, table, view, edge.pressed),
        InputChannel::NextAimTarget if edge.pressed && state.flags.gun_pointing => {
            Decision::RequestAimTarget
        }
        _ => Decision::Ignore,
    }
}

fn decide_movement(
    state: &ControllerState,
    table: &DecisionTable,
    view: &EngineView<'_>,
    edge: InputEdge,
) -> Decision {
    let next = state.flags.with_movement(edge);
    if next == state.flags {
        return Decision::Ignore;
    }
    let loco = locomotion(&next, &table.tuning);

    if state.flags.attacking() {
        // Aim (or the swing) keeps playing; the change lands when it ends.
        return Decision::Defer {
            target: table.group.gait_nick(loco.gait).to_string(),
            effect: loco.effect(),
            queue: state.flags.meleeing,
        };
    }
    Decision::Transition {
        request: locomotion_request(&table.group, &table.tuning, view.active, &loco, None),
        effect: Some(loco.effect()),
    }
}

fn decide_melee(
    state: &ControllerState,
    table: &DecisionTable,
    view: &EngineView<'_>,
    pressed: bool,
) -> Decision {
    if !pressed {
        return Decision::Ignore;
    }
    let Some(melee) = table.group.melee.as_deref() else {
        return Decision::Reject(RejectReason::Unsupported);
    };
    let flags = &state.flags;
    if flags.meleeing {
        Decision::Ignore
    } else if flags.interacting {
        Decision::Reject(RejectReason::Interacting)
    } else if flags.gun_pointing {
        Decision::Reject(RejectReason::ExclusiveAttack)
    } else if view.busy == Some(melee) {
        // the swing already playing picks up the held button when it ends
        Decision::Ignore
    } else if view.busy_with_other(melee) {
        Decision::Reject(RejectReason::Busy)
    } else {
        Decision::Transition {
            request: melee_request(table, melee, view),
            effect: None,
        }
    }
}

fn decide_gun_point(
    state: &ControllerState,
    table: &DecisionTable,
    weapon: &WeaponProfile,
    view: &EngineView<'_>,
    pressed: bool,
) -> Decision {
    let flags = &state.flags;
    if !pressed {
        if !flags.gun_pointing {
            Decision::Ignore
        } else if weapon.fire_mode == FireMode::Semi && state.firing() {
            Decision::DeferCancel(CancelKind::GunPoint)
        } else {
            aim_exit(flags, table, view)
        }
    } else if flags.gun_pointing {
        if state.cancels.gun_point {
            Decision::KeepAiming
        } else {
            Decision::Ignore
        }
    } else {
        let Some(aim) = table.group.aim.as_deref() else {
            return Decision::Reject(RejectReason::Unsupported);
        };
        if flags.interacting {
            Decision::Reject(RejectReason::Interacting)
        } else if flags.meleeing {
            Decision::Reject(RejectReason::ExclusiveAttack)
        } else {
            Decision::Transition {
                request: TransitionRequest::looping(view.active, aim, table.tuning.aim_in),
                effect: None,
            }
        }
    }
}

fn decide_shoot(
    state: &ControllerState,
    table: &DecisionTable,
    view: &EngineView<'_>,
    pressed: bool,
) -> Decision {
    if !pressed {
        return if state.firing() {
            Decision::DeferCancel(CancelKind::Shoot)
        } else {
            Decision::Ignore
        };
    }
    let shoot = match table.group.shoot.as_deref() {
        Some(shoot) if table.capabilities.shoot => shoot,
        _ => return Decision::Ignore,
    };
    if !state.flags.gun_pointing || state.firing() {
        Decision::Ignore
    } else if view.busy_with_other(shoot) {
        Decision::Reject(RejectReason::Busy)
    } else {
        Decision::Fire {
            request: fire_request(table, shoot, view),
        }
    }
}

fn decide_interact(
    state: &ControllerState,
    table: &DecisionTable,
    view: &EngineView<'_>,
    pressed: bool,
) -> Decision {
    if !pressed {
        return Decision::Ignore;
    }
    let Some(interact) = table.group.interact.as_deref() else {
        return Decision::Reject(RejectReason::Unsupported);
    };
    let flags = &state.flags;
    if flags.interacting {
        Decision::Ignore
    } else if flags.attacking() {
        Decision::Reject(RejectReason::ExclusiveAttack)
    } else if view.busy_with_other(interact) {
        Decision::Reject(RejectReason::Busy)
    } else {
        Decision::Transition {
            request: TransitionRequest::one_shot(
                view.active,
                interact,
                table.tuning.interact_in,
                table.tuning.interact_restore,
            )
            .with_on_done(INTERACT_DONE),
            effect: None,
        }
    }
}
