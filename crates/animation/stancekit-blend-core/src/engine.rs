//! BlendEngine: owns the action registry and runs every pose transition.
//!
//! Methods:
//! - register_action / register_table, set_weight / set_time_scale / set_enabled
//! - cross_fade, one_shot_then_restore, sync_cross_fade_on_loop_boundary
//! - prepare_transition (single entry point used by controllers)
//! - set_callback_on_completion / clear_callback
//! - update (advance fades and play positions, then poll completions)
//!
//! Nothing here runs on a timer. Deferred work (cached target, pending effect,
//! armed sync crossfade, one-shot restore) is plain state that `update` reads
//! back once per frame.

use log::{debug, trace, warn};

use crate::action::{Action, ActionEffect};
use crate::config::{ActionConfig, ClipRef, ClipTable};
use crate::error::BlendError;
use crate::ids::{ActionId, CompletionTag};
use crate::outputs::{BlendEvent, Outputs, PoseLayer};
use crate::registry::{check_time_scale, ActionRegistry};
use crate::transition::{TransitionOutcome, TransitionRequest};

/// The one-shot currently in flight.
#[derive(Copy, Clone, Debug, PartialEq)]
struct OneShot {
    action: ActionId,
    restore_duration: f32,
    on_done: Option<CompletionTag>,
}

/// Crossfade waiting for `from` to complete its current loop.
#[derive(Copy, Clone, Debug, PartialEq)]
struct SyncRequest {
    from: ActionId,
    to: ActionId,
    duration: f32,
    end_weight: f32,
}

#[derive(Debug, Default)]
pub struct BlendEngine {
    registry: ActionRegistry,

    active: Option<ActionId>,
    previous: Option<ActionId>,
    /// Most recent request made while busy. Overwritten, never stacked.
    cached: Option<ActionId>,
    /// Active action at the moment the current one-shot began.
    temp: Option<ActionId>,
    /// Restore target of last resort.
    fallback: Option<ActionId>,

    one_shot: Option<OneShot>,
    pending_sync: Option<SyncRequest>,

    outputs: Outputs,
}

impl BlendEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine and register every row of `table` in table order.
    pub fn from_table(table: &ClipTable) -> Result<Self, BlendError> {
        let mut engine = Self::new();
        engine.register_table(table)?;
        Ok(engine)
    }

    pub fn register_table(&mut self, table: &ClipTable) -> Result<(), BlendError> {
        for (nick, entry) in table {
            self.register_action(nick, entry.clip_ref(), entry.config.clone())?;
        }
        Ok(())
    }

    /// Create an action. The default action starts at weight 1 and becomes both
    /// the active and previous action; every other action starts at weight 0.
    pub fn register_action(
        &mut self,
        nick: &str,
        clip: ClipRef,
        cfg: ActionConfig,
    ) -> Result<ActionId, BlendError> {
        let id = self.registry.insert(nick, clip, &cfg)?;
        if cfg.is_default {
            self.active = Some(id);
            self.previous = Some(id);
            if self.fallback.is_none() {
                self.fallback = Some(id);
            }
        }
        trace!("registered action '{nick}' as {id:?}");
        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn action(&self, nick: &str) -> Result<&Action, BlendError> {
        self.registry.get(nick)
    }

    pub fn weight(&self, nick: &str) -> Result<f32, BlendError> {
        Ok(self.registry.get(nick)?.weight())
    }

    pub fn active_action(&self) -> Option<&Action> {
        self.active.map(|id| self.registry.by_id(id))
    }

    pub fn previous_action(&self) -> Option<&Action> {
        self.previous.map(|id| self.registry.by_id(id))
    }

    pub fn active_nick(&self) -> Option<&str> {
        self.active_action().map(Action::nick)
    }

    pub fn previous_nick(&self) -> Option<&str> {
        self.previous_action().map(Action::nick)
    }

    pub fn cached_nick(&self) -> Option<&str> {
        self.cached.map(|id| self.registry.by_id(id).nick())
    }

    pub fn temp_nick(&self) -> Option<&str> {
        self.temp.map(|id| self.registry.by_id(id).nick())
    }

    pub fn fallback_nick(&self) -> Option<&str> {
        self.fallback.map(|id| self.registry.by_id(id).nick())
    }

    /// True while a one-shot is in flight.
    pub fn is_busy(&self) -> bool {
        self.one_shot.is_some()
    }

    pub fn busy_nick(&self) -> Option<&str> {
        self.one_shot
            .map(|os| self.registry.by_id(os.action).nick())
    }

    /// (from, to) of an armed loop-synchronised crossfade.
    pub fn pending_sync(&self) -> Option<(&str, &str)> {
        self.pending_sync.map(|s| {
            (
                self.registry.by_id(s.from).nick(),
                self.registry.by_id(s.to).nick(),
            )
        })
    }

    /// Enabled actions with non-zero influence, in registration order.
    pub fn blend_weights(&self) -> Vec<PoseLayer> {
        self.registry
            .iter()
            .filter(|a| a.is_enabled() && a.weight() > 0.0)
            .map(|a| PoseLayer {
                nick: a.nick().to_string(),
                clip: a.clip().name.clone(),
                weight: a.weight(),
                time: a.time(),
            })
            .collect()
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    // ---------------------------------------------------------------------
    // Direct mutators
    // ---------------------------------------------------------------------

    /// Set an action's weight immediately, cancelling any fade on it.
    pub fn set_weight(&mut self, nick: &str, weight: f32) -> Result<(), BlendError> {
        self.registry
            .get_mut(nick)?
            .set_weight_now(weight.clamp(0.0, 1.0));
        Ok(())
    }

    /// Set playback speed and direction. Weight is untouched.
    pub fn set_time_scale(&mut self, nick: &str, time_scale: f32) -> Result<(), BlendError> {
        let action = self.registry.get_mut(nick)?;
        check_time_scale(nick, time_scale, action.loop_once)?;
        action.time_scale = time_scale;
        Ok(())
    }

    /// Disabled actions are left out of the pose and are never restore targets.
    pub fn set_enabled(&mut self, nick: &str, enabled: bool) -> Result<(), BlendError> {
        self.registry.get_mut(nick)?.enabled = enabled;
        Ok(())
    }

    /// Action a one-shot restores to when its recorded target is unusable.
    pub fn set_fallback_action(&mut self, nick: &str) -> Result<(), BlendError> {
        self.fallback = Some(self.registry.id_of(nick)?);
        Ok(())
    }

    /// Attach the single deferred effect of `nick`, replacing any earlier one.
    /// It fires when `nick` next becomes a crossfade target.
    pub fn set_callback_on_completion(
        &mut self,
        nick: &str,
        effect: ActionEffect,
    ) -> Result<Option<ActionEffect>, BlendError> {
        let action = self.registry.get_mut(nick)?;
        if let Some(ts) = effect.time_scale {
            check_time_scale(nick, ts, action.loop_once)?;
        }
        debug!("deferred effect on '{nick}': {effect:?}");
        Ok(action.pending.replace(effect))
    }

    pub fn clear_callback(&mut self, nick: &str) -> Result<Option<ActionEffect>, BlendError> {
        Ok(self.registry.get_mut(nick)?.pending.take())
    }

    // ---------------------------------------------------------------------
    // Transition primitives
    // ---------------------------------------------------------------------

    /// Move influence from `from` to `to` over `duration` seconds.
    pub fn cross_fade(
        &mut self,
        from: &str,
        to: &str,
        duration: f32,
        end_weight: f32,
    ) -> Result<TransitionOutcome, BlendError> {
        let from = self.registry.id_of(from)?;
        let to = self.registry.id_of(to)?;
        if let Some(os) = self.one_shot {
            if os.action != to {
                // an explicit crossfade pre-empts the one-shot and its restore
                self.abandon_one_shot(os);
            }
        }
        Ok(self.cross_fade_ids(from, to, duration, end_weight))
    }

    /// Fade `to` in from the active action and mark it busy. When it plays to
    /// its end, `update` restores to the cached action, else the snapshot taken
    /// here, else the previous action.
    pub fn one_shot_then_restore(
        &mut self,
        to: &str,
        duration: f32,
        restore_duration: f32,
        end_weight: f32,
        on_done: Option<CompletionTag>,
    ) -> Result<TransitionOutcome, BlendError> {
        let to = self.registry.id_of(to)?;
        Ok(self.one_shot_ids(to, duration, restore_duration, end_weight, on_done))
    }

    /// Arm a crossfade that fires when `from` next completes a loop.
    pub fn sync_cross_fade_on_loop_boundary(
        &mut self,
        from: &str,
        to: &str,
        duration: f32,
    ) -> Result<TransitionOutcome, BlendError> {
        let from = self.registry.id_of(from)?;
        let to = self.registry.id_of(to)?;
        Ok(self.sync_ids(from, to, duration, 1.0))
    }

    /// Pick and run one transition primitive for `req`.
    ///
    /// While a one-shot is busy, any request for a different target only
    /// overwrites the cached action.
    pub fn prepare_transition(
        &mut self,
        req: &TransitionRequest,
    ) -> Result<TransitionOutcome, BlendError> {
        let from = self.registry.id_of(&req.from)?;
        let to = self.registry.id_of(&req.to)?;

        if self.is_busy() && Some(to) != self.active {
            if let Some(old) = self.cached.replace(to) {
                if old != to {
                    debug!(
                        "dropping queued '{}' in favour of '{}'",
                        self.registry.by_id(old).nick(),
                        req.to
                    );
                }
            }
            debug!("busy, queued '{}'", req.to);
            return Ok(TransitionOutcome::Queued);
        }
        self.cached = None;

        let outcome = if req.looping {
            self.cross_fade_ids(from, to, req.duration, req.end_weight)
        } else if req.sync {
            self.sync_ids(from, to, req.duration, req.end_weight)
        } else if Some(to) != self.active {
            self.one_shot_ids(
                to,
                req.duration,
                req.restore_duration,
                req.end_weight,
                req.on_done,
            )
        } else {
            TransitionOutcome::Unchanged
        };
        Ok(outcome)
    }

    fn cross_fade_ids(
        &mut self,
        from: ActionId,
        to: ActionId,
        duration: f32,
        end_weight: f32,
    ) -> TransitionOutcome {
        self.pending_sync = None;
        let duration = duration.max(0.0);

        let target = self.registry.by_id(to);
        let fading_out = target.fade.is_some_and(|f| f.to <= 0.0);
        if Some(to) == self.active && !fading_out {
            return self.refresh_active(from, to, duration);
        }

        let action = self.registry.by_id_mut(to);
        action.target_weight = end_weight.clamp(0.0, 1.0);
        if let Some(effect) = action.pending.take() {
            debug!("firing deferred effect on '{}'", action.nick);
            action.apply_effect(effect);
        }
        action.play_from_start();
        let settle = action.target_weight;
        action.fade_to(settle, duration);

        if from != to {
            self.registry.by_id_mut(from).fade_to(0.0, duration);
        }
        if let Some(active) = self.active {
            if active != from && active != to {
                self.registry.by_id_mut(active).fade_to(0.0, duration);
            }
        }

        self.previous = self.active;
        self.active = Some(to);
        debug!(
            "crossfade '{}' -> '{}' over {duration}s to {settle}",
            self.registry.by_id(from).nick(),
            self.registry.by_id(to).nick()
        );
        TransitionOutcome::Started
    }

    /// Crossfade into the action that is already active: no fade, no rewind,
    /// but a pending effect still fires.
    fn refresh_active(&mut self, from: ActionId, to: ActionId, duration: f32) -> TransitionOutcome {
        if from != to {
            self.registry.by_id_mut(from).fade_to(0.0, duration);
        }
        let action = self.registry.by_id_mut(to);
        match action.pending.take() {
            Some(effect) => {
                action.apply_effect(effect);
                let settle = action.target_weight;
                action.fade_to(settle, duration);
                debug!("refreshed active '{}' with {effect:?}", action.nick);
                TransitionOutcome::Refreshed
            }
            None => TransitionOutcome::Unchanged,
        }
    }

    fn one_shot_ids(
        &mut self,
        to: ActionId,
        duration: f32,
        restore_duration: f32,
        end_weight: f32,
        on_done: Option<CompletionTag>,
    ) -> TransitionOutcome {
        if let Some(os) = self.one_shot {
            if os.action == to {
                return TransitionOutcome::Unchanged;
            }
            self.cached = Some(to);
            debug!(
                "'{}' busy, queued '{}'",
                self.registry.by_id(os.action).nick(),
                self.registry.by_id(to).nick()
            );
            return TransitionOutcome::Queued;
        }
        if Some(to) == self.active {
            return TransitionOutcome::Unchanged;
        }

        let snapshot = self.active;
        let from = snapshot.unwrap_or(to);
        self.cross_fade_ids(from, to, duration, end_weight);
        self.registry.by_id_mut(to).busy = true;
        self.one_shot = Some(OneShot {
            action: to,
            restore_duration: restore_duration.max(0.0),
            on_done,
        });
        self.temp = snapshot;
        TransitionOutcome::Started
    }

    fn sync_ids(
        &mut self,
        from: ActionId,
        to: ActionId,
        duration: f32,
        end_weight: f32,
    ) -> TransitionOutcome {
        let source = self.registry.by_id(from);
        if !source.is_playing() || source.time_scale() == 0.0 {
            // A stopped or paused source never reaches a loop boundary.
            return self.cross_fade_ids(from, to, duration, end_weight);
        }
        self.pending_sync = Some(SyncRequest {
            from,
            to,
            duration,
            end_weight,
        });
        debug!(
            "armed crossfade '{}' -> '{}' on next loop boundary",
            self.registry.by_id(from).nick(),
            self.registry.by_id(to).nick()
        );
        TransitionOutcome::Synced
    }

    // ---------------------------------------------------------------------
    // Frame step
    // ---------------------------------------------------------------------

    /// Advance all fades and play positions by `dt` seconds, then run the
    /// completions that became due: an armed sync crossfade first, then the
    /// restore of a finished one-shot.
    pub fn update(&mut self, dt: f32) -> Result<&Outputs, BlendError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(BlendError::InvalidDelta { delta: dt });
        }
        self.outputs.clear();

        let mut looped: Vec<ActionId> = Vec::new();
        let mut finished: Vec<ActionId> = Vec::new();
        for action in self.registry.iter_mut() {
            let step = action.advance(dt);
            if step.fade_completed {
                self.outputs.push_event(BlendEvent::FadeCompleted {
                    nick: action.nick.clone(),
                    weight: action.weight,
                });
            }
            if step.looped {
                looped.push(action.id);
                self.outputs.push_event(BlendEvent::Looped {
                    nick: action.nick.clone(),
                });
            }
            if step.finished {
                finished.push(action.id);
            }
        }

        if let Some(sync) = self.pending_sync {
            let source = self.registry.by_id(sync.from);
            if looped.contains(&sync.from)
                || finished.contains(&sync.from)
                || !source.is_playing()
                || source.time_scale() == 0.0
            {
                trace!("loop boundary reached on '{}'", source.nick());
                self.pending_sync = None;
                self.cross_fade_ids(sync.from, sync.to, sync.duration, sync.end_weight);
                self.outputs.push_event(BlendEvent::SyncCrossFadeFired {
                    from: self.registry.by_id(sync.from).nick.clone(),
                    to: self.registry.by_id(sync.to).nick.clone(),
                });
            }
        }

        if let Some(os) = self.one_shot {
            if finished.contains(&os.action) {
                self.finish_one_shot(os);
            }
        }

        Ok(&self.outputs)
    }

    fn abandon_one_shot(&mut self, os: OneShot) {
        self.one_shot = None;
        self.temp = None;
        self.cached = None;
        let action = self.registry.by_id_mut(os.action);
        action.busy = false;
        debug!("one-shot '{}' pre-empted, restore dropped", action.nick);
    }

    fn finish_one_shot(&mut self, os: OneShot) {
        self.one_shot = None;
        let requested = self.cached.take().or(self.temp.take()).or(self.previous);
        self.temp = None;

        let (target, fallback) = match requested.filter(|&id| self.can_restore_to(id, os.action)) {
            Some(id) => (Some(id), false),
            None => {
                let fb = self
                    .fallback
                    .or(self.registry.default_action())
                    .filter(|&id| self.can_restore_to(id, os.action));
                warn!(
                    "restore target of '{}' unusable, falling back to {:?}",
                    self.registry.by_id(os.action).nick(),
                    fb.map(|id| self.registry.by_id(id).nick())
                );
                (fb, true)
            }
        };

        if let Some(target) = target {
            let settle = self.registry.by_id(target).target_weight;
            self.cross_fade_ids(os.action, target, os.restore_duration, settle);
            self.outputs.push_event(BlendEvent::Restored {
                from: self.registry.by_id(os.action).nick.clone(),
                to: self.registry.by_id(target).nick.clone(),
                fallback,
            });
        }
        self.registry.by_id_mut(os.action).busy = false;

        self.outputs.push_event(BlendEvent::OneShotFinished {
            nick: self.registry.by_id(os.action).nick.clone(),
            tag: os.on_done,
        });
    }

    fn can_restore_to(&self, id: ActionId, one_shot: ActionId) -> bool {
        let action = self.registry.by_id(id);
        id != one_shot && action.is_enabled() && !action.loop_once()
    }
}
