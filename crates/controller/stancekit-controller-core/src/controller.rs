//! ActionStateController: one per entity, owns that entity's blend engine.
//!
//! Input edges go through `decision::decide`, the decision is executed as at
//! most one transition call on the engine, then the edge is committed to the
//! flags. `update` steps the engine, consumes one-shot completions and runs
//! the attack tick, in that order.

use log::{debug, info, trace};
use stancekit_blend::{
    Action, BlendEngine, BlendError, TransitionOutcome, TransitionRequest,
};

use crate::config::{ControllerConfig, FireMode, WeaponProfile};
use crate::decision::{
    self, aim_exit, decide, fire_request, melee_request, CancelKind, Decision, EngineView,
};
use crate::error::ControllerError;
use crate::events::ControllerEvent;
use crate::input::{InputChannel, InputEdge};
use crate::state::{ControllerState, InputFlags};
use crate::variant::{DecisionTable, EntityVariant};

#[derive(Debug)]
pub struct ActionStateController {
    variant: EntityVariant,
    table: DecisionTable,
    weapon: WeaponProfile,
    engine: BlendEngine,
    state: ControllerState,
    /// Raised since the last `update`.
    pending: Vec<ControllerEvent>,
    /// Returned by the last `update`.
    outputs: Vec<ControllerEvent>,
}

impl ActionStateController {
    /// Register the clip table and check it against the variant's decision
    /// table. Every mismatch is a configuration error here rather than a
    /// missing action at runtime.
    pub fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        let ControllerConfig {
            variant,
            clips,
            tuning,
            weapon,
        } = config;

        let engine = BlendEngine::from_table(&clips)
            .map_err(|e| ControllerError::config(variant, e.to_string()))?;
        let table = variant.decision_table(tuning);
        validate(variant, &table, &engine)?;

        let mut controller = Self {
            variant,
            table,
            weapon: weapon.unwrap_or_default(),
            engine,
            state: ControllerState::default(),
            pending: Vec::new(),
            outputs: Vec::new(),
        };
        let idle = controller.table.group.idle.clone();
        controller.engine.set_fallback_action(&idle)?;

        info!(
            "{variant:?} controller ready: {} actions, capabilities {:?}",
            controller.engine.registry().len(),
            controller.table.capabilities
        );
        Ok(controller)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ControllerError> {
        Self::new(ControllerConfig::from_json_str(json)?)
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    pub fn variant(&self) -> EntityVariant {
        self.variant
    }

    pub fn table(&self) -> &DecisionTable {
        &self.table
    }

    pub fn weapon(&self) -> &WeaponProfile {
        &self.weapon
    }

    pub fn engine(&self) -> &BlendEngine {
        &self.engine
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn flags(&self) -> &InputFlags {
        &self.state.flags
    }

    pub fn active_action(&self) -> Option<&Action> {
        self.engine.active_action()
    }

    pub fn previous_action(&self) -> Option<&Action> {
        self.engine.previous_action()
    }

    pub fn active_nick(&self) -> Option<&str> {
        self.engine.active_nick()
    }

    /// Events raised by input edges since the last `update`.
    pub fn pending_events(&self) -> &[ControllerEvent] {
        &self.pending
    }

    fn view(&self) -> EngineView<'_> {
        EngineView {
            active: self
                .engine
                .active_nick()
                .unwrap_or(self.table.group.idle.as_str()),
            busy: self.engine.busy_nick(),
        }
    }

    // ---------------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------------

    /// Feed one input edge. Returns the decision that was executed.
    pub fn handle_input(&mut self, edge: InputEdge) -> Result<Decision, ControllerError> {
        let decision = decide(&self.state, &self.table, &self.weapon, &self.view(), edge);
        debug!("{edge:?} -> {decision:?}");
        self.execute(&decision, edge)?;
        self.state.commit(edge, &decision);
        Ok(decision)
    }

    /// Shorthand for `handle_input` with a constructed edge.
    pub fn set_input(
        &mut self,
        channel: InputChannel,
        pressed: bool,
    ) -> Result<Decision, ControllerError> {
        self.handle_input(InputEdge { channel, pressed })
    }

    fn execute(&mut self, decision: &Decision, edge: InputEdge) -> Result<(), ControllerError> {
        match decision {
            Decision::Ignore | Decision::DeferCancel(_) | Decision::KeepAiming => {}
            Decision::Reject(reason) => {
                debug!("{:?} rejected {edge:?}: {reason:?}", self.variant);
                self.pending.push(ControllerEvent::Rejected {
                    edge,
                    reason: *reason,
                });
            }
            Decision::Transition { request, effect } => {
                if let Some(effect) = effect {
                    self.engine.set_callback_on_completion(&request.to, *effect)?;
                }
                let outcome = self.engine.prepare_transition(request)?;
                if request.on_done == Some(decision::MELEE_DONE)
                    && outcome == TransitionOutcome::Started
                {
                    self.pending.push(ControllerEvent::MeleeSwing { repeat: false });
                }
            }
            Decision::Defer {
                target,
                effect,
                queue,
            } => {
                self.engine.set_callback_on_completion(target, *effect)?;
                if *queue && self.engine.is_busy() {
                    let req = TransitionRequest::looping(self.view().active, target.as_str(), 0.0);
                    self.engine.prepare_transition(&req)?;
                }
            }
            Decision::Fire { request } => {
                self.fire(request, false)?;
            }
            Decision::RequestAimTarget => self.pending.push(ControllerEvent::AimTargetRequested),
        }
        Ok(())
    }

    /// Only a shot clip that actually restarts counts as a shot. While the
    /// previous one is still playing the timer stays idle, so an automatic
    /// weapon retries on the next tick.
    fn fire(&mut self, request: &TransitionRequest, auto: bool) -> Result<bool, BlendError> {
        let outcome = self.engine.prepare_transition(request)?;
        if outcome != TransitionOutcome::Started {
            trace!("shot not fired, '{}' {outcome:?}", request.to);
            return Ok(false);
        }
        self.state.shot_remaining = Some(self.weapon.interval);
        self.pending.push(ControllerEvent::ShotFired { auto });
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // Frame step
    // ---------------------------------------------------------------------

    /// Step the engine by `dt`, react to finished one-shots, then run the
    /// attack tick. Returns every event raised since the previous update.
    pub fn update(&mut self, dt: f32) -> Result<&[ControllerEvent], ControllerError> {
        self.outputs.clear();

        let finished: Vec<_> = self
            .engine
            .update(dt)?
            .finished_one_shots()
            .filter_map(|(_, tag)| tag)
            .collect();
        for tag in finished {
            if tag == decision::MELEE_DONE {
                self.melee_done()?;
            } else if tag == decision::INTERACT_DONE {
                self.state.flags.interacting = false;
                self.pending.push(ControllerEvent::InteractionFinished);
            }
        }

        self.attack_tick(dt)?;

        self.outputs.append(&mut self.pending);
        Ok(&self.outputs)
    }

    /// A held melee button swings again.
    fn melee_done(&mut self) -> Result<(), ControllerError> {
        let flags = self.state.flags;
        if !flags.meleeing || flags.interacting || flags.gun_pointing {
            return Ok(());
        }
        let Some(melee) = self.table.group.melee.clone() else {
            return Ok(());
        };
        let req = melee_request(&self.table, &melee, &self.view());
        if self.engine.prepare_transition(&req)? == TransitionOutcome::Started {
            self.pending.push(ControllerEvent::MeleeSwing { repeat: true });
        }
        Ok(())
    }

    fn attack_tick(&mut self, dt: f32) -> Result<(), ControllerError> {
        self.state.tick_shot(dt);
        if self.state.firing() {
            return Ok(());
        }

        if self.state.cancels.shoot {
            self.state.cancels.shoot = false;
            self.state.flags.shooting = false;
            self.pending
                .push(ControllerEvent::CancelApplied(CancelKind::Shoot));
        }
        if self.state.cancels.gun_point {
            self.state.cancels.gun_point = false;
            if let Decision::Transition { request, effect } =
                aim_exit(&self.state.flags, &self.table, &self.view())
            {
                if let Some(effect) = effect {
                    self.engine.set_callback_on_completion(&request.to, effect)?;
                }
                self.engine.prepare_transition(&request)?;
            }
            self.state.flags.gun_pointing = false;
            self.pending
                .push(ControllerEvent::CancelApplied(CancelKind::GunPoint));
        }

        let flags = self.state.flags;
        if self.weapon.fire_mode == FireMode::Auto && flags.shooting && flags.gun_pointing {
            if let Some(shoot) = self.table.group.shoot.clone() {
                let view = self.view();
                // the previous shot clip has to finish before the next one
                if view.busy.is_none() {
                    let req = fire_request(&self.table, &shoot, &view);
                    self.fire(&req, true)?;
                }
            }
        }
        Ok(())
    }
}

fn validate(
    variant: EntityVariant,
    table: &DecisionTable,
    engine: &BlendEngine,
) -> Result<(), ControllerError> {
    if engine.registry().default_action().is_none() {
        return Err(ControllerError::config(variant, "no default action"));
    }
    let back = table.tuning.back_walk_time_scale;
    if !back.is_finite() {
        return Err(ControllerError::config(
            variant,
            format!("backward walk time scale {back} is not finite"),
        ));
    }
    let lookup = |nick: &str| {
        engine
            .action(nick)
            .map_err(|_| ControllerError::config(variant, format!("action '{nick}' is not registered")))
    };
    for nick in table.group.looping_nicks() {
        if lookup(nick)?.loop_once() {
            return Err(ControllerError::config(
                variant,
                format!("action '{nick}' must loop"),
            ));
        }
    }
    for nick in table.group.one_shot_nicks() {
        if !lookup(nick)?.loop_once() {
            return Err(ControllerError::config(
                variant,
                format!("action '{nick}' must play once"),
            ));
        }
    }
    Ok(())
}
