//! Named events the session dispatches to UI and network collaborators

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::{Color, GameError};

/// Payload of the `jump` event, broadcast to other players
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpReport {
    pub squat_ratio: f64,
    /// World position of the block the hero jumped from
    pub relative_position: DVec3,
    pub axis_is_x: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Score(u32),
    /// Colour of the block just landed on
    Color(Color),
    Down,
    Up,
    Jump(JumpReport),
    /// Charge ratio of the jump just released
    Energy(f64),
    /// Colour of the newest block when the run ended
    GameOver(Color),
    BlockPlaced(u32),
    BlockRemoved(u32),
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::Score(_) => EventKind::Score,
            GameEvent::Color(_) => EventKind::Color,
            GameEvent::Down => EventKind::Down,
            GameEvent::Up => EventKind::Up,
            GameEvent::Jump(_) => EventKind::Jump,
            GameEvent::Energy(_) => EventKind::Energy,
            GameEvent::GameOver(_) => EventKind::GameOver,
            GameEvent::BlockPlaced(_) => EventKind::BlockPlaced,
            GameEvent::BlockRemoved(_) => EventKind::BlockRemoved,
        }
    }
}

/// Subscription key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Score,
    Color,
    Down,
    Up,
    Jump,
    Energy,
    GameOver,
    BlockPlaced,
    BlockRemoved,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        EventKind::Score,
        EventKind::Color,
        EventKind::Down,
        EventKind::Up,
        EventKind::Jump,
        EventKind::Energy,
        EventKind::GameOver,
        EventKind::BlockPlaced,
        EventKind::BlockRemoved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Score => "score",
            EventKind::Color => "color",
            EventKind::Down => "down",
            EventKind::Up => "up",
            EventKind::Jump => "jump",
            EventKind::Energy => "energy",
            EventKind::GameOver => "gameover",
            EventKind::BlockPlaced => "block_placed",
            EventKind::BlockRemoved => "block_removed",
        }
    }
}

impl FromStr for EventKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GameError::UnknownEvent(s.to_string()))
    }
}

type Handler = Box<dyn FnMut(&GameEvent)>;

/// Fan-out of events to any number of subscribers per kind
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<Handler>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (kind.as_str(), handlers.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

impl EventBus {
    pub fn subscribe(&mut self, kind: EventKind, handler: impl FnMut(&GameEvent) + 'static) {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    pub fn emit(&mut self, event: GameEvent) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for handler in handlers.iter_mut() {
                handler(&event);
            }
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}
