//! Realtime channel messages
//!
//! The transport (socket, reconnection) lives outside the crate. This module
//! only knows the JSON payloads exchanged in a room and keeps the latest
//! score of every other player.

use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::GameError;
use crate::sim::JumpReport;

/// Channel event carrying jumps and score updates
pub const JUMP_EVENT: &str = "jump";
/// Channel event sent when a player's run ends
pub const FALL_EVENT: &str = "no-jump";

/// A player jumped, or announced a new score
///
/// Score announcements carry a negative `squat_ratio` and no position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerJump {
    pub room: String,
    pub name: String,
    pub squat_ratio: f64,
    pub score: u32,
    /// Position of the block the player jumped from, in their world frame
    #[serde(default, rename = "rltvPos")]
    pub relative_position: DVec3,
    #[serde(default, rename = "toX")]
    pub axis_is_x: bool,
}

impl PeerJump {
    /// Outgoing message for a jump we just made
    pub fn from_report(room: &str, name: &str, score: u32, report: &JumpReport) -> Self {
        Self {
            room: room.to_string(),
            name: name.to_string(),
            squat_ratio: report.squat_ratio,
            score,
            relative_position: report.relative_position,
            axis_is_x: report.axis_is_x,
        }
    }

    /// Outgoing score announcement
    pub fn score_update(room: &str, name: &str, score: u32) -> Self {
        Self {
            room: room.to_string(),
            name: name.to_string(),
            squat_ratio: -1.0,
            score,
            relative_position: DVec3::ZERO,
            axis_is_x: false,
        }
    }

    /// Whether the message describes an actual jump to replay
    pub fn is_jump(&self) -> bool {
        self.squat_ratio > 0.0
    }
}

/// A player's run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerFall {
    pub room: String,
    pub name: String,
    #[serde(default)]
    pub score: u32,
}

/// Any message the core consumes from the channel
#[derive(Debug, Clone, PartialEq)]
pub enum PeerMessage {
    Jump(PeerJump),
    Fall(PeerFall),
}

impl PeerMessage {
    /// Decode a payload received under channel event `event`
    pub fn decode(event: &str, payload: &str) -> Result<Self, GameError> {
        match event {
            JUMP_EVENT => Ok(PeerMessage::Jump(serde_json::from_str(payload)?)),
            FALL_EVENT => Ok(PeerMessage::Fall(serde_json::from_str(payload)?)),
            other => Err(GameError::UnknownEvent(other.to_string())),
        }
    }

    /// Channel event name and JSON payload
    pub fn encode(&self) -> Result<(&'static str, String), GameError> {
        Ok(match self {
            PeerMessage::Jump(jump) => (JUMP_EVENT, serde_json::to_string(jump)?),
            PeerMessage::Fall(fall) => (FALL_EVENT, serde_json::to_string(fall)?),
        })
    }

    pub fn room(&self) -> &str {
        match self {
            PeerMessage::Jump(jump) => &jump.room,
            PeerMessage::Fall(fall) => &fall.room,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PeerMessage::Jump(jump) => &jump.name,
            PeerMessage::Fall(fall) => &fall.name,
        }
    }
}

/// Latest known score of every other player in the room
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerBoard {
    scores: BTreeMap<String, u32>,
}

impl PeerBoard {
    pub fn record(&mut self, name: &str, score: u32) {
        self.scores.insert(name.to_string(), score);
    }

    pub fn score(&self, name: &str) -> Option<u32> {
        self.scores.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.scores.iter().map(|(name, score)| (name.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }
}
