//! Seeded block-placement sequence
//!
//! The recurrence is chaotic but fully deterministic: two sessions started
//! from the same room draw the same chain of distances and directions.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::chain::Axis;
use crate::GameError;
use crate::consts::{DISTANCE_SPREAD, MIN_DISTANCE};

/// One draw: how far the next block sits and in which direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub distance: u32,
    pub axis: Axis,
}

/// Deterministic (distance, axis) generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeededSequence {
    initial: f64,
    seed: f64,
}

impl SeededSequence {
    pub fn new(seed: f64) -> Self {
        Self {
            initial: seed,
            seed,
        }
    }

    /// Sequence seeded from a room identifier
    pub fn from_room(room: &str) -> Result<Self, GameError> {
        room_seed(room).map(Self::new)
    }

    /// Current seed (advanced by every draw)
    pub fn seed(&self) -> f64 {
        self.seed
    }

    /// Seed the sequence was created with
    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// Go back to the initial seed
    pub fn rewind(&mut self) {
        self.seed = self.initial;
    }

    pub fn draw(&mut self) -> Draw {
        let whole = self.seed.trunc() as u64;
        let axis = if whole % 2 == 1 { Axis::X } else { Axis::Z };
        let distance = (whole % DISTANCE_SPREAD as u64) as u32 + MIN_DISTANCE;

        self.seed = self.seed.powf(PI) % 1000.0 + PI;
        log::debug!("seed draw: distance={distance} axis={axis:?} next_seed={}", self.seed);

        Draw { distance, axis }
    }
}

impl Iterator for SeededSequence {
    type Item = Draw;

    fn next(&mut self) -> Option<Draw> {
        Some(self.draw())
    }
}

/// Derive the initial seed of a room: `base36(room + "10") % 10000 / 100 + PI`
///
/// The base-36 prefix is read like a browser's `parseInt(s, 36)`: leading
/// whitespace is skipped, one sign is accepted and parsing stops at the first
/// non-digit. Exact for rooms of up to 8 digits; longer prefixes round like
/// any f64 accumulation.
///
/// Negative prefixes keep their sign through `%`. A room whose seed ends up
/// below zero is rejected, since draws from it would leave [12, 30).
pub fn room_seed(room: &str) -> Result<f64, GameError> {
    let digits = format!("{room}10");
    let value = parse_base36_prefix(&digits).ok_or_else(|| GameError::InvalidRoom(room.to_string()))?;
    let seed = value % 10000.0 / 100.0 + PI;
    if seed < 0.0 {
        return Err(GameError::InvalidRoom(room.to_string()));
    }
    Ok(seed)
}

fn parse_base36_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let mut value: Option<f64> = None;
    for c in s.chars() {
        let Some(digit) = c.to_digit(36) else { break };
        value = Some(value.unwrap_or(0.0) * 36.0 + digit as f64);
    }
    value.map(|v| if negative { -v } else { v })
}
