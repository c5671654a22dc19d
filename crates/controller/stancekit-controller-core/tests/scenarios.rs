use stancekit_controller::{
    ActionStateController, CancelKind, ControllerEvent, Decision, DeferredCancels, InputChannel,
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

fn weight(c: &ActionStateController, nick: &str) -> f32 {
    c.engine().weight(nick).unwrap()
}

#[test]
fn idle_to_walk_on_forward() {
    let mut c = controller("player");
    assert_eq!(c.active_nick(), Some("idle"));

    press(&mut c, MovingForward);
    assert_eq!(c.active_nick(), Some("walk"));
    step(&mut c, 0.05);
    approx(weight(&c, "walk"), 0.5, 1e-4);
    approx(weight(&c, "idle"), 0.5, 1e-4);

    step(&mut c, 0.1);
    assert_eq!(weight(&c, "walk"), 1.0);
    assert_eq!(weight(&c, "idle"), 0.0);
    assert_eq!(c.previous_action().map(|a| a.nick()), Some("idle"));
}

#[test]
fn walk_to_run_on_accelerate() {
    let mut c = controller("player");
    press(&mut c, MovingForward);
    step(&mut c, 0.2);

    press(&mut c, Accelerate);
    assert_eq!(c.active_nick(), Some("run"));
    step(&mut c, 0.1);
    approx(weight(&c, "run"), 0.5, 1e-4);
    step(&mut c, 0.15);
    assert_eq!(weight(&c, "run"), 1.0);
    assert_eq!(weight(&c, "walk"), 0.0);
    assert_eq!(c.previous_action().map(|a| a.nick()), Some("walk"));

    release(&mut c, Accelerate);
    step(&mut c, 0.25);
    assert_eq!(c.active_nick(), Some("walk"));
    assert_eq!(weight(&c, "walk"), 1.0);
    assert_eq!(weight(&c, "run"), 0.0);
}

#[test]
fn forward_during_swing_lands_on_restore() {
    let mut c = controller("player");
    // turning in place walks at reduced weight
    press(&mut c, MovingLeft);
    step(&mut c, 0.2);
    approx(weight(&c, "walk"), 0.7, 1e-6);

    press(&mut c, Melee);
    assert_eq!(c.active_nick(), Some("melee"));
    assert_eq!(c.engine().temp_nick(), Some("walk"));

    let d = press(&mut c, MovingForward);
    assert!(matches!(d, Decision::Defer { ref target, queue: true, .. } if target == "walk"));
    // no transition while the swing plays
    assert_eq!(c.active_nick(), Some("melee"));
    assert_eq!(c.engine().cached_nick(), Some("walk"));

    release(&mut c, Melee);
    step(&mut c, 0.3);
    step(&mut c, 0.35);
    assert!(!c.engine().is_busy());
    assert_eq!(c.active_nick(), Some("walk"));

    step(&mut c, 0.25);
    assert_eq!(weight(&c, "walk"), 1.0);
    assert_eq!(weight(&c, "melee"), 0.0);
    assert_eq!(c.active_action().unwrap().time_scale(), 1.0);
}

#[test]
fn movement_during_swing_collapses_to_latest() {
    let mut c = controller("player");
    press(&mut c, MovingForward);
    step(&mut c, 0.2);
    press(&mut c, Melee);

    release(&mut c, MovingForward);
    assert_eq!(c.engine().cached_nick(), Some("idle"));
    press(&mut c, MovingBackward);
    assert_eq!(c.engine().cached_nick(), Some("walk"));

    release(&mut c, Melee);
    step(&mut c, 0.7);
    assert_eq!(c.active_nick(), Some("walk"));
    step(&mut c, 0.25);
    let walk = c.active_action().unwrap();
    approx(walk.weight(), 0.7, 1e-6);
    assert_eq!(walk.time_scale(), -1.0);
    assert_eq!(weight(&c, "idle"), 0.0);
}

#[test]
fn gun_point_release_mid_shot_waits_for_interval() {
    let mut c = controller("player");
    press(&mut c, GunPoint);
    step(&mut c, 0.25);
    assert_eq!(c.active_nick(), Some("aim"));

    press(&mut c, Shoot);
    assert_eq!(c.active_nick(), Some("shoot"));
    assert!(c.state().firing());

    let d = release(&mut c, GunPoint);
    assert_eq!(d, Decision::DeferCancel(CancelKind::GunPoint));
    assert!(c.flags().gun_pointing);

    let events = step(&mut c, 0.1);
    assert!(events.contains(&ControllerEvent::ShotFired { auto: false }));
    assert!(!events.contains(&ControllerEvent::CancelApplied(CancelKind::GunPoint)));
    assert!(c.flags().gun_pointing);

    // interval (0.35s) runs out during this step
    let events = step(&mut c, 0.3);
    assert_eq!(
        events,
        vec![ControllerEvent::CancelApplied(CancelKind::GunPoint)]
    );
    assert!(!c.flags().gun_pointing);
    assert!(!c.state().firing());
    assert_eq!(c.active_nick(), Some("idle"));

    step(&mut c, 0.3);
    assert_eq!(weight(&c, "idle"), 1.0);
    assert_eq!(weight(&c, "aim"), 0.0);
    assert_eq!(weight(&c, "shoot"), 0.0);
}

#[test]
fn shoot_repress_mid_interval_drops_deferred_cancels() {
    let mut c = controller("player");
    press(&mut c, GunPoint);
    step(&mut c, 0.25);
    press(&mut c, Shoot);

    release(&mut c, GunPoint);
    assert_eq!(
        release(&mut c, Shoot),
        Decision::DeferCancel(CancelKind::Shoot)
    );
    assert!(c.state().cancels.gun_point && c.state().cancels.shoot);

    // the re-press clears both pending releases, not just the shoot one
    assert_eq!(press(&mut c, Shoot), Decision::Ignore);
    assert_eq!(c.state().cancels, DeferredCancels::default());

    let mut events = step(&mut c, 0.2);
    events.extend(step(&mut c, 0.2));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ControllerEvent::CancelApplied(_))));
    assert!(c.flags().gun_pointing);
    assert!(c.flags().shooting);
    assert_eq!(c.active_nick(), Some("aim"));
}

#[test]
fn gun_point_repress_keeps_aiming() {
    let mut c = controller("player");
    press(&mut c, GunPoint);
    step(&mut c, 0.25);
    press(&mut c, Shoot);
    release(&mut c, GunPoint);

    assert_eq!(press(&mut c, GunPoint), Decision::KeepAiming);
    assert!(!c.state().cancels.gun_point);

    step(&mut c, 0.4);
    step(&mut c, 0.2);
    assert!(c.flags().gun_pointing);
    assert_eq!(c.active_nick(), Some("aim"));
}

#[test]
fn semi_weapon_fires_once_per_press() {
    let mut c = controller("player");
    press(&mut c, GunPoint);
    step(&mut c, 0.25);
    press(&mut c, Shoot);

    let mut shots = 0;
    for _ in 0..20 {
        shots += step(&mut c, 0.1)
            .iter()
            .filter(|e| matches!(e, ControllerEvent::ShotFired { .. }))
            .count();
    }
    assert_eq!(shots, 1);

    release(&mut c, Shoot);
    press(&mut c, Shoot);
    assert!(c.state().firing());
    assert!(c
        .pending_events()
        .contains(&ControllerEvent::ShotFired { auto: false }));
}

#[test]
fn aim_exit_follows_movement_changed_while_aiming() {
    let mut c = controller("player");
    press(&mut c, MovingForward);
    step(&mut c, 0.2);
    press(&mut c, GunPoint);
    step(&mut c, 0.25);
    assert_eq!(c.active_nick(), Some("aim"));

    release(&mut c, MovingForward);
    press(&mut c, MovingBackward);
    // aim keeps playing
    assert_eq!(c.active_nick(), Some("aim"));

    release(&mut c, GunPoint);
    assert_eq!(c.active_nick(), Some("walk"));
    step(&mut c, 0.25);
    let walk = c.active_action().unwrap();
    approx(walk.weight(), 0.7, 1e-6);
    assert_eq!(walk.time_scale(), -1.0);
    assert_eq!(weight(&c, "aim"), 0.0);
}

#[test]
fn next_aim_target_only_emits_event() {
    let mut c = controller("player");
    press(&mut c, GunPoint);
    step(&mut c, 0.25);

    assert_eq!(press(&mut c, NextAimTarget), Decision::RequestAimTarget);
    assert_eq!(c.active_nick(), Some("aim"));
    let events = step(&mut c, 0.0);
    assert_eq!(events, vec![ControllerEvent::AimTargetRequested]);
}
