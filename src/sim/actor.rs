//! Movable actors and the hero figure
//!
//! Anything with a [`NodeId`] can be animated through [`Movable`]; the hero
//! adds composite motions on top (hop, jump, topple, squat).

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::anim::{AnimationScheduler, Easing, Figure, Join, Mask, Motion, NodeId, TaskId, Track, Tween};
use super::collision::FallDirection;
use crate::Color;
use crate::consts::{FALL_SPEED, HEAD_REST, HERO_REST, MIN_DURATION_MS, TOPPLE_MS};

/// Capability to be moved, scaled and rotated over time
pub trait Movable {
    fn node(&self) -> NodeId;

    fn move_to(&self, scheduler: &mut AnimationScheduler, position: DVec3, motion: Motion) -> TaskId {
        scheduler.schedule(Tween::to(self.node(), Track::Position, position).with(motion))
    }

    fn move_by(&self, scheduler: &mut AnimationScheduler, delta: DVec3, motion: Motion) -> TaskId {
        scheduler.schedule(Tween::by(self.node(), Track::Position, delta).with(motion))
    }

    fn scale_to(&self, scheduler: &mut AnimationScheduler, scale: DVec3, motion: Motion) -> TaskId {
        scheduler.schedule(Tween::to(self.node(), Track::Scale, scale).with(motion))
    }

    fn rotate_to(&self, scheduler: &mut AnimationScheduler, rotation: DVec3, motion: Motion) -> TaskId {
        scheduler.schedule(Tween::to(self.node(), Track::Rotation, rotation).with(motion))
    }

    fn rotate_by(&self, scheduler: &mut AnimationScheduler, delta: DVec3, motion: Motion) -> TaskId {
        scheduler.schedule(Tween::by(self.node(), Track::Rotation, delta).with(motion))
    }

    /// Drop by `height` with a bounce, at constant nominal speed
    fn fall(&self, scheduler: &mut AnimationScheduler, height: f64, delay: f64) -> TaskId {
        self.move_by(
            scheduler,
            DVec3::new(0.0, -height, 0.0),
            Motion::new(height / FALL_SPEED, Easing::BounceOut).delayed(delay),
        )
    }
}

/// Hero proportions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroDims {
    pub head_radius: f64,
    pub body_top_radius: f64,
    /// Also the landing probe offset
    pub body_base_radius: f64,
    /// Also the landing probe drop below the root
    pub body_length: f64,
}

impl Default for HeroDims {
    fn default() -> Self {
        Self {
            head_radius: 1.0,
            body_top_radius: 0.4,
            body_base_radius: 1.0,
            body_length: 4.0,
        }
    }
}

#[derive(Debug, Clone)]
struct SquatPose {
    task: TaskId,
    node: NodeId,
    track: Track,
    rest: DVec3,
}

#[derive(Debug, Clone)]
struct Squat {
    started_at: f64,
    poses: Vec<SquatPose>,
}

/// A head-on-a-body figure: the player or a ghost of another player
#[derive(Debug, Clone)]
pub struct Hero {
    figure: Figure,
    pub position: DVec3,
    pub rotation: DVec3,
    pub scale: DVec3,
    /// Head position relative to the root
    pub head_offset: DVec3,
    /// Body position relative to the root
    pub body_offset: DVec3,
    pub body_scale: DVec3,
    pub dims: HeroDims,
    pub color: Color,
    pub opacity: f64,
    pub visible: bool,
    squat: Option<Squat>,
}

impl Hero {
    pub fn new(figure: Figure, position: DVec3) -> Self {
        Self {
            figure,
            position,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
            head_offset: HEAD_REST,
            body_offset: DVec3::ZERO,
            body_scale: DVec3::ONE,
            dims: HeroDims::default(),
            color: Color::DARK_BLUE,
            opacity: 1.0,
            visible: true,
            squat: None,
        }
    }

    /// The local player at rest
    pub fn player() -> Self {
        Self::new(Figure::Player, HERO_REST)
    }

    /// Translucent stand-in for another player, positioned in the ghost group frame
    pub fn ghost(slot: u32) -> Self {
        Self {
            color: Color::GHOST,
            opacity: 0.4,
            ..Self::new(Figure::Ghost(slot), DVec3::ZERO)
        }
    }

    pub fn figure(&self) -> Figure {
        self.figure
    }

    pub fn is_squatting(&self) -> bool {
        self.squat.is_some()
    }

    pub fn squat_started_at(&self) -> Option<f64> {
        self.squat.as_ref().map(|s| s.started_at)
    }

    /// Value of one animated slot; `node` must belong to this figure
    pub fn slot(&self, node: NodeId, track: Track) -> Option<DVec3> {
        match (node, track) {
            (NodeId::Hero(_), Track::Position) => Some(self.position),
            (NodeId::Hero(_), Track::Rotation) => Some(self.rotation),
            (NodeId::Hero(_), Track::Scale) => Some(self.scale),
            (NodeId::Head(_), Track::Position) => Some(self.head_offset),
            (NodeId::Body(_), Track::Position) => Some(self.body_offset),
            (NodeId::Body(_), Track::Scale) => Some(self.body_scale),
            _ => None,
        }
    }

    pub fn slot_mut(&mut self, node: NodeId, track: Track) -> Option<&mut DVec3> {
        match (node, track) {
            (NodeId::Hero(_), Track::Position) => Some(&mut self.position),
            (NodeId::Hero(_), Track::Rotation) => Some(&mut self.rotation),
            (NodeId::Hero(_), Track::Scale) => Some(&mut self.scale),
            (NodeId::Head(_), Track::Position) => Some(&mut self.head_offset),
            (NodeId::Body(_), Track::Position) => Some(&mut self.body_offset),
            (NodeId::Body(_), Track::Scale) => Some(&mut self.body_scale),
            _ => None,
        }
    }

    /// Start charging: compress head and body over `max_ms`
    ///
    /// Returns false (and does nothing) while a squat is already running.
    pub fn start_squat(&mut self, scheduler: &mut AnimationScheduler, max_ms: f64) -> bool {
        if self.squat.is_some() {
            return false;
        }
        let head = NodeId::Head(self.figure);
        let body = NodeId::Body(self.figure);
        let plan = [
            (head, Track::Position, HEAD_REST, DVec3::new(0.0, -1.5, 0.0)),
            (body, Track::Scale, DVec3::ONE, DVec3::new(0.0, -0.5, 0.0)),
            (body, Track::Position, DVec3::ZERO, DVec3::new(0.0, -1.0, 0.0)),
        ];
        let poses = plan
            .into_iter()
            .map(|(node, track, rest, delta)| SquatPose {
                task: scheduler.schedule(Tween::to(node, track, rest + delta).from(rest).with(Motion::linear(max_ms))),
                node,
                track,
                rest,
            })
            .collect();
        self.squat = Some(Squat {
            started_at: scheduler.now(),
            poses,
        });
        true
    }

    /// Release the charge and spring back to the rest pose
    ///
    /// Returns the charge ratio in [0, 1], or `None` if not squatting.
    pub fn stop_squat(&mut self, scheduler: &mut AnimationScheduler, max_ms: f64, restore_ms: f64) -> Option<f64> {
        let squat = self.squat.take()?;
        let ratio = ((scheduler.now() - squat.started_at) / max_ms).clamp(0.0, 1.0);
        for pose in squat.poses {
            scheduler.cancel(pose.task);
            scheduler.schedule(Tween::to(pose.node, pose.track, pose.rest).with(Motion::linear(ratio * restore_ms)));
        }
        Some(ratio)
    }

    /// Parabolic hop: linear horizontal leg over `2 * duration`, quadratic
    /// ascent then descent of `duration` each
    pub fn hop(&self, scheduler: &mut AnimationScheduler, height: f64, duration: f64, dx: f64, dz: f64) -> Join {
        let leg = duration.max(MIN_DURATION_MS);
        let node = self.node();
        let from = self.position;
        let apex = from + DVec3::Y * height;

        let horizontal = scheduler.schedule(
            Tween::by(node, Track::Position, DVec3::new(dx, 0.0, dz))
                .masked(Mask::XZ)
                .with(Motion::linear(leg * 2.0)),
        );
        scheduler.schedule(
            Tween::to(node, Track::Position, apex)
                .from(from)
                .masked(Mask::Y)
                .with(Motion::new(leg, Easing::QuadraticOut)),
        );
        let descent = scheduler.schedule(
            Tween::to(node, Track::Position, from)
                .from(apex)
                .masked(Mask::Y)
                .with(Motion::new(leg, Easing::QuadraticIn).delayed(leg)),
        );
        Join::all([horizontal, descent])
    }

    /// Hop forward, optionally spinning a full turn on the way
    ///
    /// The spin is not part of the returned join; it ends with the hop and
    /// leaves the rotation at zero.
    pub fn jump(
        &self,
        scheduler: &mut AnimationScheduler,
        height: f64,
        duration: f64,
        rotate: bool,
        axis_is_x: bool,
        distance: f64,
    ) -> Join {
        let leg = duration.max(MIN_DURATION_MS);
        if rotate {
            let turn = if axis_is_x { -TAU } else { TAU };
            scheduler.schedule(
                Tween::by(self.node(), Track::Rotation, DVec3::new(0.0, 0.0, turn))
                    .with(Motion::linear(leg * 2.0))
                    .settle_at(DVec3::ZERO),
            );
        }
        let (dx, dz) = if axis_is_x { (distance, 0.0) } else { (0.0, -distance) };
        self.hop(scheduler, height, leg, dx, dz)
    }

    /// Tip over a block edge and drop to the ground
    ///
    /// The root is moved onto the edge (lowered to the feet) and the head and
    /// body are offset the other way, so the figure does not jump visually
    /// and the rotation hinges on the edge.
    pub fn topple(&mut self, scheduler: &mut AnimationScheduler, direction: FallDirection, edge: f64) -> Join {
        let pivot = if direction.along_x() {
            DVec3::new(edge - self.position.x, 0.0, 0.0)
        } else {
            DVec3::new(0.0, 0.0, edge - self.position.z)
        };
        let lift = DVec3::Y * (self.dims.body_length * 0.5);
        self.head_offset += lift - pivot;
        self.body_offset += lift - pivot;
        self.position += pivot - lift;

        let tilt = self.rotate_by(scheduler, direction.tilt(), Motion::new(TOPPLE_MS, Easing::BounceOut));
        let drop = scheduler.schedule(
            Tween::to(self.node(), Track::Position, DVec3::ZERO)
                .masked(Mask::Y)
                .with(Motion::linear(TOPPLE_MS).delayed(TOPPLE_MS)),
        );
        Join::all([tilt, drop])
    }
}

impl Movable for Hero {
    fn node(&self) -> NodeId {
        NodeId::Hero(self.figure)
    }
}

impl FallDirection {
    /// Rotation that tips the figure over the edge
    pub fn tilt(self) -> DVec3 {
        match self {
            FallDirection::XMinus => DVec3::new(0.0, 0.0, FRAC_PI_2),
            FallDirection::XPlus => DVec3::new(0.0, 0.0, -FRAC_PI_2),
            FallDirection::ZMinus => DVec3::new(-FRAC_PI_2, 0.0, 0.0),
            FallDirection::ZPlus => DVec3::new(FRAC_PI_2, 0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::anim::Stage;

    /// Stage holding a single hero
    struct Solo(Hero);

    impl Stage for Solo {
        fn read(&self, node: NodeId, track: Track) -> Option<DVec3> {
            self.0.slot(node, track)
        }

        fn write(&mut self, node: NodeId, track: Track, value: DVec3) {
            if let Some(slot) = self.0.slot_mut(node, track) {
                *slot = value;
            }
        }
    }

    fn run(scheduler: &mut AnimationScheduler, stage: &mut Solo, ms: f64) {
        let steps = (ms / 10.0).ceil() as usize;
        for _ in 0..steps {
            scheduler.advance(10.0, stage);
        }
    }

    #[test]
    fn test_fall_duration_from_height() {
        let mut scheduler = AnimationScheduler::new();
        let mut stage = Solo(Hero::new(Figure::Player, DVec3::new(0.0, 24.0, 0.0)));
        let id = stage.0.fall(&mut scheduler, 18.0, 0.0);

        // 18 / 0.018 = 1000 ms
        scheduler.advance(990.0, &mut stage);
        assert!(!scheduler.is_complete(id));
        scheduler.advance(20.0, &mut stage);
        assert!(scheduler.is_complete(id));
        assert_eq!(stage.0.position.y, 6.0);
    }

    #[test]
    fn test_hop_arc() {
        let mut scheduler = AnimationScheduler::new();
        let mut stage = Solo(Hero::player());
        let join = stage.0.hop(&mut scheduler, 10.0, 100.0, 8.0, 0.0);

        scheduler.advance(100.0, &mut stage);
        assert_eq!(stage.0.position.y, 15.0);
        assert!((stage.0.position.x - 4.0).abs() < 1e-9);
        assert!(!join.is_complete(&scheduler));

        scheduler.advance(50.0, &mut stage);
        // Quadratic-in descent: a quarter of the way down at half time
        assert!((stage.0.position.y - 12.5).abs() < 1e-9);

        scheduler.advance(50.0, &mut stage);
        assert!(join.is_complete(&scheduler));
        assert_eq!(stage.0.position, DVec3::new(8.0, 5.0, 0.0));
    }

    #[test]
    fn test_jump_spin_resets_rotation() {
        let mut scheduler = AnimationScheduler::new();
        let mut stage = Solo(Hero::player());
        let join = stage.0.jump(&mut scheduler, 5.0, 100.0, true, true, 0.0);

        scheduler.advance(100.0, &mut stage);
        assert!((stage.0.rotation.z + std::f64::consts::PI).abs() < 1e-9);

        run(&mut scheduler, &mut stage, 100.0);
        assert!(join.is_complete(&scheduler));
        assert_eq!(stage.0.rotation, DVec3::ZERO);
        assert_eq!(stage.0.position, HERO_REST);
        assert_eq!(scheduler.task_count(), 0);
    }

    #[test]
    fn test_jump_along_z_moves_negative() {
        let mut scheduler = AnimationScheduler::new();
        let mut stage = Solo(Hero::ghost(0));
        stage.0.jump(&mut scheduler, 2.0, 50.0, false, false, 12.0);
        run(&mut scheduler, &mut stage, 100.0);
        assert_eq!(stage.0.position, DVec3::new(0.0, 0.0, -12.0));
    }

    #[test]
    fn test_squat_ratio_and_guard() {
        let mut scheduler = AnimationScheduler::new();
        let mut stage = Solo(Hero::player());

        assert!(stage.0.start_squat(&mut scheduler, 1500.0));
        assert!(!stage.0.start_squat(&mut scheduler, 1500.0));
        run(&mut scheduler, &mut stage, 750.0);
        assert!((stage.0.head_offset.y - 1.25).abs() < 1e-9);

        let ratio = stage.0.stop_squat(&mut scheduler, 1500.0, 200.0).unwrap();
        assert!((ratio - 0.5).abs() < 1e-9);
        assert!(stage.0.stop_squat(&mut scheduler, 1500.0, 200.0).is_none());

        run(&mut scheduler, &mut stage, 100.0);
        assert_eq!(stage.0.head_offset, HEAD_REST);
        assert_eq!(stage.0.body_scale, DVec3::ONE);
        assert_eq!(stage.0.body_offset, DVec3::ZERO);
        assert_eq!(scheduler.task_count(), 0);
    }

    #[test]
    fn test_squat_ratio_caps_at_one() {
        let mut scheduler = AnimationScheduler::new();
        let mut stage = Solo(Hero::player());
        stage.0.start_squat(&mut scheduler, 1500.0);
        run(&mut scheduler, &mut stage, 3000.0);
        assert_eq!(stage.0.stop_squat(&mut scheduler, 1500.0, 200.0), Some(1.0));
    }

    #[test]
    fn test_topple_hinges_on_edge() {
        let mut scheduler = AnimationScheduler::new();
        let mut stage = Solo(Hero::player());
        let join = stage.0.topple(&mut scheduler, FallDirection::XPlus, 6.0);

        // Re-rooted on the edge at foot height, head still above the old root
        assert_eq!(stage.0.position, DVec3::new(6.0, 3.0, 0.0));
        assert_eq!(stage.0.position + stage.0.head_offset, HERO_REST + HEAD_REST);

        run(&mut scheduler, &mut stage, 2000.0);
        assert!(join.is_complete(&scheduler));
        assert!((stage.0.rotation.z + FRAC_PI_2).abs() < 1e-9);
        assert_eq!(stage.0.position.y, 0.0);
    }
}
