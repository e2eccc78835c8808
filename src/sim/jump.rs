//! Jump controller: squat charge to jump parameters, and the jump itself

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::actor::Hero;
use super::anim::{AnimationScheduler, Easing, Join, Motion, NodeId, Track, Tween};
use super::chain::Axis;
use super::world::World;
use crate::consts::{DISTANCE_PER_RATIO, HEIGHT_PER_RATIO, TIME_SCALE};

/// Shape of one jump
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpParams {
    /// Charge ratio in [0, 1]
    pub ratio: f64,
    pub height: f64,
    pub distance: f64,
    /// Time (ms) to reach the apex; the whole jump takes twice as long
    pub duration: f64,
}

impl JumpParams {
    pub fn from_ratio(ratio: f64) -> Self {
        Self::scaled(ratio, DISTANCE_PER_RATIO, HEIGHT_PER_RATIO)
    }

    /// Jump for `ratio` with custom full-charge distance and height
    pub fn scaled(ratio: f64, distance_per_ratio: f64, height_per_ratio: f64) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        let height = ratio * height_per_ratio;
        Self {
            ratio,
            height,
            distance: ratio * distance_per_ratio,
            duration: (2.0 * height).sqrt() * TIME_SCALE,
        }
    }

    /// Whether the jump is energetic enough to spin the hero
    pub fn spins(&self, threshold: f64) -> bool {
        self.ratio > threshold
    }

    /// World translation that brings the hero `distance` forward along `axis`
    pub fn world_shift(&self, axis: Axis) -> DVec3 {
        -axis.unit() * self.distance
    }
}

/// Run the player's jump: shift the world and hop the hero concurrently
///
/// The hero hops in place; the world slides the other way, so the target
/// block arrives under the hero. The join completes when both are done.
pub fn perform_jump(
    world: &World,
    scheduler: &mut AnimationScheduler,
    params: &JumpParams,
    axis: Axis,
    spin: bool,
) -> Join {
    let shift = scheduler.schedule(
        Tween::by(NodeId::World, Track::Position, params.world_shift(axis))
            .with(Motion::new(params.duration * 2.0, Easing::SinusoidalOut)),
    );
    let hop = world
        .hero
        .jump(scheduler, params.height, params.duration, spin, axis.is_x(), 0.0);
    hop.and(Join::single(shift))
}

/// Replay another player's jump on their ghost, which travels in its own frame
pub fn ghost_jump(ghost: &Hero, scheduler: &mut AnimationScheduler, params: &JumpParams, axis_is_x: bool, spin: bool) -> Join {
    ghost.jump(scheduler, params.height, params.duration, spin, axis_is_x, params.distance)
}
