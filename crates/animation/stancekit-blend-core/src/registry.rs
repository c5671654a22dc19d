//! Nick -> Action storage. Pure data owner; blend logic lives in the engine.

use hashbrown::HashMap;

use crate::action::Action;
use crate::config::{ActionConfig, ClipRef};
use crate::error::BlendError;
use crate::ids::{ActionId, IdAllocator};

/// A play-once action at time scale zero never finishes, so it would hold
/// the engine busy forever.
pub(crate) fn check_time_scale(
    nick: &str,
    time_scale: f32,
    loop_once: bool,
) -> Result<(), BlendError> {
    let reason = if !time_scale.is_finite() {
        format!("time scale {time_scale} is not finite")
    } else if loop_once && time_scale == 0.0 {
        "play-once action needs a non-zero time scale".to_string()
    } else {
        return Ok(());
    };
    Err(BlendError::InvalidClip {
        nick: nick.to_string(),
        reason,
    })
}

#[derive(Debug, Default)]
pub struct ActionRegistry {
    ids: IdAllocator,
    actions: Vec<Action>,
    by_nick: HashMap<String, ActionId>,
    default: Option<ActionId>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store a new action. Actions are never removed.
    pub fn insert(
        &mut self,
        nick: &str,
        clip: ClipRef,
        cfg: &ActionConfig,
    ) -> Result<ActionId, BlendError> {
        if self.by_nick.contains_key(nick) {
            return Err(BlendError::DuplicateAction {
                nick: nick.to_string(),
            });
        }
        if !clip.duration.is_finite() || clip.duration <= 0.0 {
            return Err(BlendError::InvalidClip {
                nick: nick.to_string(),
                reason: format!("clip '{}' has duration {}", clip.name, clip.duration),
            });
        }
        check_time_scale(nick, cfg.time_scale, cfg.loop_once)?;
        if cfg.is_default {
            if let Some(existing) = self.default {
                return Err(BlendError::DuplicateDefault {
                    existing: self.actions[existing.index()].nick.clone(),
                    nick: nick.to_string(),
                });
            }
        }

        let id = self.ids.alloc_action();
        self.actions
            .push(Action::new(id, nick.to_string(), clip, cfg));
        self.by_nick.insert(nick.to_string(), id);
        if cfg.is_default {
            self.default = Some(id);
        }
        Ok(id)
    }

    pub fn id_of(&self, nick: &str) -> Result<ActionId, BlendError> {
        self.by_nick
            .get(nick)
            .copied()
            .ok_or_else(|| BlendError::not_found(nick))
    }

    pub fn contains(&self, nick: &str) -> bool {
        self.by_nick.contains_key(nick)
    }

    pub fn get(&self, nick: &str) -> Result<&Action, BlendError> {
        let id = self.id_of(nick)?;
        Ok(&self.actions[id.index()])
    }

    pub fn get_mut(&mut self, nick: &str) -> Result<&mut Action, BlendError> {
        let id = self.id_of(nick)?;
        Ok(&mut self.actions[id.index()])
    }

    /// Ids handed out by this registry always index a live action.
    #[inline]
    pub fn by_id(&self, id: ActionId) -> &Action {
        &self.actions[id.index()]
    }

    #[inline]
    pub fn by_id_mut(&mut self, id: ActionId) -> &mut Action {
        &mut self.actions[id.index()]
    }

    pub fn default_action(&self) -> Option<ActionId> {
        self.default
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Action> {
        self.actions.iter_mut()
    }
}
