use stancekit_controller::{
    ActionStateController, ControllerEvent, Decision, InputChannel, InputEdge, RejectReason,
};
use stancekit_test_fixtures::entities;

use InputChannel::*;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn controller(name: &str) -> ActionStateController {
    ActionStateController::from_json_str(&entities::json(name).unwrap()).unwrap()
}

fn press(c: &mut ActionStateController, channel: InputChannel) -> Decision {
    c.set_input(channel, true).unwrap()
}

fn release(c: &mut ActionStateController, channel: InputChannel) -> Decision {
    c.set_input(channel, false).unwrap()
}

fn step(c: &mut ActionStateController, dt: f32) -> Vec<ControllerEvent> {
    c.update(dt).unwrap().to_vec()
}

#[test]
fn interaction_blocks_attacks_until_finished() {
    let mut c = controller("player");
    press(&mut c, Interact);
    assert_eq!(c.active_nick(), Some("interact"));
    assert!(c.flags().interacting);

    assert_eq!(
        press(&mut c, Melee),
        Decision::Reject(RejectReason::Interacting)
    );
    assert!(!c.flags().meleeing);
    assert_eq!(
        press(&mut c, GunPoint),
        Decision::Reject(RejectReason::Interacting)
    );
    assert!(!c.flags().gun_pointing);
    assert!(c.pending_events().contains(&ControllerEvent::Rejected {
        edge: InputEdge::press(Melee),
        reason: RejectReason::Interacting,
    }));

    // releasing the button does not end the interaction
    assert_eq!(release(&mut c, Interact), Decision::Ignore);
    assert!(c.flags().interacting);

    step(&mut c, 0.7);
    let events = step(&mut c, 0.7);
    assert!(events.contains(&ControllerEvent::InteractionFinished));
    assert!(!c.flags().interacting);
    assert_eq!(c.active_nick(), Some("idle"));

    // melee is available again
    release(&mut c, Melee);
    press(&mut c, Melee);
    assert_eq!(c.active_nick(), Some("melee"));
}

#[test]
fn movement_during_interaction_restores_to_latest_gait() {
    let mut c = controller("player");
    press(&mut c, Interact);
    press(&mut c, MovingForward);
    assert_eq!(c.engine().cached_nick(), Some("walk"));
    press(&mut c, Accelerate);
    assert_eq!(c.engine().cached_nick(), Some("run"));
    assert_eq!(c.active_nick(), Some("interact"));

    step(&mut c, 0.7);
    step(&mut c, 0.7);
    assert_eq!(c.active_nick(), Some("run"));
    step(&mut c, 0.3);
    assert_eq!(c.engine().weight("run").unwrap(), 1.0);
    assert_eq!(c.engine().weight("walk").unwrap(), 0.0);
    assert_eq!(c.engine().weight("interact").unwrap(), 0.0);
}

#[test]
fn melee_and_gun_point_exclude_each_other() {
    let mut c = controller("player");
    press(&mut c, GunPoint);
    assert_eq!(
        press(&mut c, Melee),
        Decision::Reject(RejectReason::ExclusiveAttack)
    );
    assert_eq!(
        press(&mut c, Interact),
        Decision::Reject(RejectReason::ExclusiveAttack)
    );
    release(&mut c, GunPoint);
    step(&mut c, 0.3);

    press(&mut c, Melee);
    assert_eq!(
        press(&mut c, GunPoint),
        Decision::Reject(RejectReason::ExclusiveAttack)
    );
    assert_eq!(c.active_nick(), Some("melee"));
}

#[test]
fn held_melee_swings_again() {
    let mut c = controller("brawler");
    press(&mut c, Melee);
    assert_eq!(c.active_nick(), Some("punch"));
    assert!(c
        .pending_events()
        .contains(&ControllerEvent::MeleeSwing { repeat: false }));

    step(&mut c, 0.3);
    let events = step(&mut c, 0.3);
    assert!(events.contains(&ControllerEvent::MeleeSwing { repeat: true }));
    assert_eq!(c.active_nick(), Some("punch"));
    assert!(c.engine().is_busy());
    assert_eq!(c.engine().temp_nick(), Some("idle"));

    release(&mut c, Melee);
    let events = step(&mut c, 0.6);
    assert!(!events
        .iter()
        .any(|e| matches!(e, ControllerEvent::MeleeSwing { .. })));
    assert!(!c.engine().is_busy());
    assert_eq!(c.active_nick(), Some("idle"));
}

#[test]
fn melee_re_press_mid_swing_is_not_a_new_swing() {
    let mut c = controller("brawler");
    press(&mut c, Melee);
    release(&mut c, Melee);
    step(&mut c, 0.2);

    // same one-shot still playing: nothing restarts
    assert_eq!(press(&mut c, Melee), Decision::Ignore);
    assert!(c.flags().meleeing);
    approx(c.engine().action("punch").unwrap().time(), 0.2, 1e-6);
    assert!(!c
        .pending_events()
        .contains(&ControllerEvent::MeleeSwing { repeat: false }));
}

#[test]
fn melee_re_press_keeps_queued_movement() {
    let mut c = controller("player");
    press(&mut c, Melee);
    press(&mut c, MovingForward);
    assert_eq!(c.engine().cached_nick(), Some("walk"));

    release(&mut c, Melee);
    step(&mut c, 0.1);
    assert_eq!(press(&mut c, Melee), Decision::Ignore);
    assert_eq!(c.engine().cached_nick(), Some("walk"));
    assert_eq!(c.engine().temp_nick(), Some("idle"));

    release(&mut c, Melee);
    step(&mut c, 0.7);
    assert!(!c.engine().is_busy());
    assert_eq!(c.active_nick(), Some("walk"));
    step(&mut c, 0.25);
    assert_eq!(c.engine().weight("walk").unwrap(), 1.0);
    assert_eq!(c.engine().weight("melee").unwrap(), 0.0);
}

#[test]
fn backward_walk_plays_reversed_at_reduced_weight() {
    let mut c = controller("player");
    press(&mut c, MovingBackward);
    step(&mut c, 0.2);
    let walk = c.active_action().unwrap();
    assert_eq!(walk.nick(), "walk");
    approx(walk.weight(), 0.7, 1e-6);
    assert_eq!(walk.time_scale(), -1.0);
    assert!(walk.time() < 1.0);

    // forward and backward together cancel out
    press(&mut c, MovingForward);
    assert_eq!(c.active_nick(), Some("idle"));

    release(&mut c, MovingBackward);
    step(&mut c, 0.2);
    let walk = c.active_action().unwrap();
    assert_eq!(walk.nick(), "walk");
    assert_eq!(walk.weight(), 1.0);
    assert_eq!(walk.time_scale(), 1.0);
}

#[test]
fn turning_then_forward_refreshes_walk_weight() {
    let mut c = controller("player");
    press(&mut c, MovingRight);
    step(&mut c, 0.2);
    approx(c.engine().weight("walk").unwrap(), 0.7, 1e-6);
    let t_before = c.active_action().unwrap().time();

    press(&mut c, MovingForward);
    assert_eq!(c.active_nick(), Some("walk"));
    // refreshed in place: no rewind, previous untouched
    assert_eq!(c.active_action().unwrap().time(), t_before);
    assert_eq!(c.previous_action().map(|a| a.nick()), Some("idle"));

    step(&mut c, 0.25);
    assert_eq!(c.engine().weight("walk").unwrap(), 1.0);

    // both turn directions cancel when not moving forward
    release(&mut c, MovingForward);
    press(&mut c, MovingLeft);
    assert_eq!(c.active_nick(), Some("idle"));
}

#[test]
fn unsupported_channels_are_rejected_per_variant() {
    let mut civilian = controller("civilian");
    assert_eq!(
        press(&mut civilian, Melee),
        Decision::Reject(RejectReason::Unsupported)
    );
    assert_eq!(
        press(&mut civilian, GunPoint),
        Decision::Reject(RejectReason::Unsupported)
    );
    assert_eq!(press(&mut civilian, Shoot), Decision::Ignore);

    let mut soldier = controller("soldier");
    assert_eq!(
        press(&mut soldier, Interact),
        Decision::Reject(RejectReason::Unsupported)
    );
    assert!(!soldier.flags().interacting);
}

#[test]
fn invalid_delta_is_reported() {
    let mut c = controller("player");
    let err = c.update(-0.1).unwrap_err();
    assert_eq!(err.category(), "timing");
    assert!(c.update(f32::NAN).is_err());
}
