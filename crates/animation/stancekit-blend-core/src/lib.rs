//! stancekit blend core (engine-agnostic)
//!
//! Owns a registry of named actions (one clip each, with independent weight,
//! time scale and play position) and the transition primitives that move blend
//! influence between them: crossfades, one-shots that restore afterwards, and
//! crossfades held back until a loop boundary. Hosts call
//! [`BlendEngine::update`] once per frame and sample the clips listed by
//! [`BlendEngine::blend_weights`].

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod outputs;
pub mod registry;
pub mod transition;

// Re-exports for consumers (controllers, host adapters)
pub use action::{Action, ActionEffect, BlendPhase};
pub use config::{parse_clip_table, ActionConfig, ClipEntry, ClipRef, ClipTable};
pub use engine::BlendEngine;
pub use error::BlendError;
pub use ids::{ActionId, CompletionTag};
pub use outputs::{BlendEvent, Outputs, PoseLayer};
pub use registry::ActionRegistry;
pub use transition::{TransitionOutcome, TransitionRequest};
