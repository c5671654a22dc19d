//! Gameplay events the controller raises for the host. They queue between
//! updates and are handed out by `ActionStateController::update`.

use serde::{Deserialize, Serialize};

use crate::decision::{CancelKind, RejectReason};
use crate::input::InputEdge;

/// Gameplay-facing notifications, collected until the host drains them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ControllerEvent {
    /// A shot started; the weapon interval is now running.
    ShotFired { auto: bool },
    /// A melee swing started (first press or held re-swing).
    MeleeSwing { repeat: bool },
    InteractionFinished,
    /// Hand-off to the targeting collaborator; no animation change.
    AimTargetRequested,
    /// A deferred release took effect after the shot interval.
    CancelApplied(CancelKind),
    Rejected { edge: InputEdge, reason: RejectReason },
}
