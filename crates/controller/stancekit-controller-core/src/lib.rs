//! stancekit action-state controller
//!
//! Turns boolean gameplay input edges (move, accelerate, melee, aim, shoot,
//! interact) into blend engine transitions for one entity. Each edge yields a
//! [`Decision`] from a pure decision function, which the controller executes
//! as at most one transition call. Entity variants differ only in the actions
//! they drive and their transition tuning.

pub mod config;
pub mod controller;
pub mod decision;
pub mod error;
pub mod events;
pub mod input;
pub mod state;
pub mod variant;

pub use config::{ControllerConfig, FireMode, Tuning, WeaponProfile};
pub use controller::ActionStateController;
pub use decision::{
    decide, gait_fade, locomotion, CancelKind, Decision, EngineView, Locomotion, RejectReason,
};
pub use error::ControllerError;
pub use events::ControllerEvent;
pub use input::{InputChannel, InputEdge};
pub use state::{ControllerState, DeferredCancels, InputFlags};
pub use variant::{ActionGroup, Capabilities, DecisionTable, EntityVariant, Gait};

// Engine types show up in decisions and accessors.
pub use stancekit_blend::{ActionEffect, BlendEngine, TransitionRequest};
