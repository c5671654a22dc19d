//! Boolean input channels and the edges hosts feed in.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputChannel {
    MovingForward,
    MovingBackward,
    MovingLeft,
    MovingRight,
    Accelerate,
    Melee,
    GunPoint,
    Shoot,
    Interact,
    NextAimTarget,
}

impl InputChannel {
    pub const ALL: [InputChannel; 10] = [
        InputChannel::MovingForward,
        InputChannel::MovingBackward,
        InputChannel::MovingLeft,
        InputChannel::MovingRight,
        InputChannel::Accelerate,
        InputChannel::Melee,
        InputChannel::GunPoint,
        InputChannel::Shoot,
        InputChannel::Interact,
        InputChannel::NextAimTarget,
    ];

    /// Channels that only feed the locomotion target.
    #[inline]
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            InputChannel::MovingForward
                | InputChannel::MovingBackward
                | InputChannel::MovingLeft
                | InputChannel::MovingRight
                | InputChannel::Accelerate
        )
    }
}

/// A channel changing value. Hosts send one per press and one per release.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEdge {
    pub channel: InputChannel,
    pub pressed: bool,
}

impl InputEdge {
    pub fn press(channel: InputChannel) -> Self {
        Self {
            channel,
            pressed: true,
        }
    }

    pub fn release(channel: InputChannel) -> Self {
        Self {
            channel,
            pressed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_channels() {
        let movement: Vec<_> = InputChannel::ALL
            .into_iter()
            .filter(|c| c.is_movement())
            .collect();
        assert_eq!(movement.len(), 5);
        assert!(!InputChannel::Shoot.is_movement());
    }

    #[test]
    fn edge_json_uses_camel_case_channels() {
        let edge: InputEdge =
            serde_json::from_str(r#"{ "channel": "gunPoint", "pressed": true }"#).unwrap();
        assert_eq!(edge, InputEdge::press(InputChannel::GunPoint));
    }
}
