//! Entity variants and the decision tables they contribute.
//!
//! The set of variants is closed: each one names the action nicks it drives
//! and the tuning it starts from. Behaviour shared by every variant lives in
//! `decision`; a variant only changes which actions exist and how fast the
//! transitions between them are.

use serde::{Deserialize, Serialize};

use crate::config::Tuning;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityVariant {
    /// Player character: locomotion, pistol, melee and interaction.
    Player,
    /// Rifle infantry: locomotion and aimed fire only.
    Soldier,
    /// Unarmed fighter: locomotion and melee.
    Brawler,
    /// Non-combatant: locomotion and interaction.
    Civilian,
}

/// Locomotion gait; picks between the idle, walk and run nicks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gait {
    Idle,
    Walk,
    Run,
}

/// Action nicks a variant drives. `None` means the variant has no such action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGroup {
    pub idle: String,
    pub walk: String,
    pub run: Option<String>,
    pub aim: Option<String>,
    pub shoot: Option<String>,
    pub melee: Option<String>,
    pub interact: Option<String>,
}

impl ActionGroup {
    /// Nick for `gait`. A group without a run action walks instead.
    pub fn gait_nick(&self, gait: Gait) -> &str {
        match gait {
            Gait::Idle => &self.idle,
            Gait::Walk => &self.walk,
            Gait::Run => self.run.as_deref().unwrap_or(&self.walk),
        }
    }

    /// Gait whose nick is `nick`, if it is a locomotion action at all.
    pub fn gait_of(&self, nick: &str) -> Option<Gait> {
        if nick == self.idle {
            Some(Gait::Idle)
        } else if nick == self.walk {
            Some(Gait::Walk)
        } else if self.run.as_deref() == Some(nick) {
            Some(Gait::Run)
        } else {
            None
        }
    }

    /// Nicks that must play as loops.
    pub fn looping_nicks(&self) -> impl Iterator<Item = &str> {
        [Some(&self.idle), Some(&self.walk), self.run.as_ref(), self.aim.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Nicks that must play once and restore.
    pub fn one_shot_nicks(&self) -> impl Iterator<Item = &str> {
        [self.shoot.as_ref(), self.melee.as_ref(), self.interact.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            melee: self.melee.is_some(),
            aim: self.aim.is_some(),
            shoot: self.aim.is_some() && self.shoot.is_some(),
            interact: self.interact.is_some(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub melee: bool,
    pub aim: bool,
    pub shoot: bool,
    pub interact: bool,
}

/// Per-variant input: the actions to drive and the durations to drive them with.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionTable {
    pub group: ActionGroup,
    pub capabilities: Capabilities,
    pub tuning: Tuning,
}

fn nick(s: &str) -> Option<String> {
    Some(s.to_string())
}

impl EntityVariant {
    pub const ALL: [EntityVariant; 4] = [
        EntityVariant::Player,
        EntityVariant::Soldier,
        EntityVariant::Brawler,
        EntityVariant::Civilian,
    ];

    pub fn action_group(self) -> ActionGroup {
        match self {
            EntityVariant::Player => ActionGroup {
                idle: "idle".into(),
                walk: "walk".into(),
                run: nick("run"),
                aim: nick("aim"),
                shoot: nick("shoot"),
                melee: nick("melee"),
                interact: nick("interact"),
            },
            EntityVariant::Soldier => ActionGroup {
                idle: "rifle_idle".into(),
                walk: "rifle_walk".into(),
                run: nick("rifle_run"),
                aim: nick("rifle_aim"),
                shoot: nick("rifle_shoot"),
                melee: None,
                interact: None,
            },
            EntityVariant::Brawler => ActionGroup {
                idle: "idle".into(),
                walk: "walk".into(),
                run: nick("run"),
                aim: None,
                shoot: None,
                melee: nick("punch"),
                interact: None,
            },
            EntityVariant::Civilian => ActionGroup {
                idle: "idle".into(),
                walk: "walk".into(),
                run: nick("run"),
                aim: None,
                shoot: None,
                melee: None,
                interact: nick("interact"),
            },
        }
    }

    pub fn default_tuning(self) -> Tuning {
        let base = Tuning::default();
        match self {
            EntityVariant::Player => base,
            EntityVariant::Soldier => Tuning {
                aim_in: 0.3,
                aim_out: 0.25,
                shoot_in: 0.03,
                shoot_restore: 0.05,
                ..base
            },
            EntityVariant::Brawler => Tuning {
                melee_in: 0.05,
                melee_restore: 0.15,
                ..base
            },
            // Slower gait changes, and jog only switches on a stride boundary.
            EntityVariant::Civilian => Tuning {
                walk_to_run: 0.3,
                run_to_walk: 0.3,
                sync_gait: true,
                ..base
            },
        }
    }

    /// Table for this variant; `tuning` replaces the variant defaults.
    pub fn decision_table(self, tuning: Option<Tuning>) -> DecisionTable {
        let group = self.action_group();
        DecisionTable {
            capabilities: group.capabilities(),
            group,
            tuning: tuning.unwrap_or_else(|| self.default_tuning()),
        }
    }
}
