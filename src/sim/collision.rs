//! Landing detection against the last two blocks
//!
//! The hero's footprint is sampled with three probes along X and three along
//! Z. How many of each land inside a block decides between a safe landing, a
//! topple over one edge, or a clean miss.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::actor::{Hero, HeroDims, Movable};
use super::anim::{AnimationScheduler, Easing, Motion, TaskId};
use super::chain::{Block, Bounds};
use crate::consts::{MISS_DROP, TIME_SCALE};

/// Side of a block the hero tips over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallDirection {
    XMinus,
    XPlus,
    ZMinus,
    ZPlus,
}

impl FallDirection {
    pub fn along_x(self) -> bool {
        matches!(self, FallDirection::XMinus | FallDirection::XPlus)
    }

    /// Coordinate of the edge the hero hinges on
    pub fn edge(self, bounds: &Bounds) -> f64 {
        match self {
            FallDirection::XMinus => bounds.min.x,
            FallDirection::XPlus => bounds.max.x,
            FallDirection::ZMinus => bounds.min.z,
            FallDirection::ZPlus => bounds.max.z,
        }
    }
}

/// Result of a jump
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// Standing on `block`; `scored` only when it is the newest block
    Landed { block: u32, scored: bool },
    /// Partly over `block`, tipping off at `edge`
    FallEdge {
        direction: FallDirection,
        block: u32,
        edge: f64,
    },
    Missed,
}

/// Containment of the probes, index 0 on the minus side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeHits {
    pub x: [bool; 3],
    pub z: [bool; 3],
}

impl ProbeHits {
    pub fn x_count(&self) -> usize {
        self.x.iter().filter(|&&hit| hit).count()
    }

    pub fn z_count(&self) -> usize {
        self.z.iter().filter(|&&hit| hit).count()
    }
}

/// Sample the hero footprint against one block
pub fn probe(block: &Block, position: DVec3, dims: &HeroDims) -> ProbeHits {
    let r = dims.body_base_radius;
    let y = position.y - dims.body_length;
    let offsets = [-r, 0.0, r];
    ProbeHits {
        x: offsets.map(|d| block.contains(DVec3::new(position.x + d, y, position.z))),
        z: offsets.map(|d| block.contains(DVec3::new(position.x, y, position.z + d))),
    }
}

/// Decide the outcome of a jump ending at `position`
///
/// `recent_first` holds the newest block first. Fewer than two blocks means
/// there is nothing sound to land on, which counts as a miss.
pub fn resolve(position: DVec3, dims: &HeroDims, recent_first: &[&Block]) -> Outcome {
    if recent_first.len() < 2 {
        return Outcome::Missed;
    }
    for (index, block) in recent_first.iter().take(2).enumerate() {
        let hits = probe(block, position, dims);
        if hits.x_count() >= 2 && hits.z_count() >= 2 {
            return Outcome::Landed {
                block: block.id,
                scored: index == 0,
            };
        }
        let direction = if hits.x_count() == 1 {
            Some(if hits.x[0] { FallDirection::XPlus } else { FallDirection::XMinus })
        } else if hits.z_count() == 1 {
            Some(if hits.z[0] { FallDirection::ZPlus } else { FallDirection::ZMinus })
        } else {
            None
        };
        if let Some(direction) = direction {
            return Outcome::FallEdge {
                direction,
                block: block.id,
                edge: direction.edge(&block.bounds()),
            };
        }
    }
    Outcome::Missed
}

/// Straight drop after missing every block
///
/// The curve starts with the speed the hop had when it came back down to its
/// take-off height, so the fall continues the arc instead of restarting it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallTrajectory {
    pub drop: f64,
    pub duration: f64,
    pub easing: Easing,
}

impl FallTrajectory {
    pub fn missed(height: f64, jump_duration: f64) -> Self {
        let d = MISS_DROP;
        let dt = TIME_SCALE * ((2.0 * height + 2.0 * d).sqrt() - (2.0 * height).sqrt());
        let easing = if height > 0.0 && jump_duration > 0.0 {
            let (h, t0) = (height, jump_duration);
            Easing::Polynomial {
                quad: h * dt * dt / d / t0 / t0,
                lin: 2.0 * h * dt / d / t0,
            }
        } else {
            Easing::QuadraticIn
        };
        Self {
            drop: d,
            duration: dt,
            easing,
        }
    }

    pub fn schedule(&self, hero: &Hero, scheduler: &mut AnimationScheduler) -> TaskId {
        hero.move_by(
            scheduler,
            DVec3::new(0.0, -self.drop, 0.0),
            Motion::new(self.duration, self.easing),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use crate::consts::{BLOCK_SIZE, HERO_REST};
    use crate::sim::chain::Axis;

    fn block(id: u32, x: f64, z: f64) -> Block {
        Block {
            id,
            position: DVec3::new(x, 0.0, z),
            placed_at: DVec3::new(x, 0.0, z),
            half_extents: BLOCK_SIZE * 0.5,
            axis: Axis::X,
            color: Color::GRAY,
            scale: DVec3::ONE,
        }
    }

    fn at(x: f64, z: f64) -> DVec3 {
        DVec3::new(x, HERO_REST.y, z)
    }

    #[test]
    fn test_centered_hero_lands_and_scores() {
        let newest = block(1, 0.0, 0.0);
        let older = block(0, -20.0, 0.0);
        let hits = probe(&newest, at(0.0, 0.0), &HeroDims::default());
        assert_eq!(hits.x_count(), 3);
        assert_eq!(hits.z_count(), 3);

        let outcome = resolve(at(0.0, 0.0), &HeroDims::default(), &[&newest, &older]);
        assert_eq!(outcome, Outcome::Landed { block: 1, scored: true });
    }

    #[test]
    fn test_partial_overlap_still_lands() {
        // Center and minus probe inside, plus probe past x.max = 5
        let newest = block(1, 0.0, 0.0);
        let older = block(0, -20.0, 0.0);
        let outcome = resolve(at(4.5, 0.0), &HeroDims::default(), &[&newest, &older]);
        assert_eq!(outcome, Outcome::Landed { block: 1, scored: true });
    }

    #[test]
    fn test_short_jump_lands_on_previous_block() {
        let newest = block(1, 20.0, 0.0);
        let older = block(0, 0.0, 0.0);
        let outcome = resolve(at(1.0, 0.0), &HeroDims::default(), &[&newest, &older]);
        assert_eq!(outcome, Outcome::Landed { block: 0, scored: false });
    }

    #[test]
    fn test_edge_fall_minus_x() {
        // Hero center at x = -5.5: only the plus probe (x = -4.5) is inside
        let newest = block(1, 0.0, 0.0);
        let older = block(0, -40.0, 0.0);
        let hits = probe(&newest, at(-5.5, 0.0), &HeroDims::default());
        assert_eq!(hits.x, [false, false, true]);
        assert_eq!(hits.z_count(), 0);

        let outcome = resolve(at(-5.5, 0.0), &HeroDims::default(), &[&newest, &older]);
        assert_eq!(
            outcome,
            Outcome::FallEdge {
                direction: FallDirection::XMinus,
                block: 1,
                edge: -5.0
            }
        );
    }

    #[test]
    fn test_edge_fall_plus_x() {
        let newest = block(1, 0.0, 0.0);
        let older = block(0, -40.0, 0.0);
        let outcome = resolve(at(5.5, 0.0), &HeroDims::default(), &[&newest, &older]);
        assert!(matches!(
            outcome,
            Outcome::FallEdge { direction: FallDirection::XPlus, edge, .. } if edge == 5.0
        ));
    }

    #[test]
    fn test_edge_fall_z_sides() {
        let newest = block(1, 0.0, -20.0);
        let older = block(0, 0.0, 20.0);
        let dims = HeroDims::default();
        assert!(matches!(
            resolve(at(0.0, -14.5), &dims, &[&newest, &older]),
            Outcome::FallEdge { direction: FallDirection::ZPlus, .. }
        ));
        assert!(matches!(
            resolve(at(0.0, -25.5), &dims, &[&newest, &older]),
            Outcome::FallEdge { direction: FallDirection::ZMinus, .. }
        ));
    }

    #[test]
    fn test_edge_on_previous_block() {
        // Jump fell short off the front of the block it started from
        let newest = block(1, 30.0, 0.0);
        let older = block(0, 0.0, 0.0);
        let outcome = resolve(at(5.5, 0.0), &HeroDims::default(), &[&newest, &older]);
        assert!(matches!(outcome, Outcome::FallEdge { block: 0, direction: FallDirection::XPlus, .. }));
    }

    #[test]
    fn test_gap_is_a_miss() {
        let newest = block(1, 20.0, 0.0);
        let older = block(0, 0.0, 0.0);
        let outcome = resolve(at(10.0, 0.0), &HeroDims::default(), &[&newest, &older]);
        assert_eq!(outcome, Outcome::Missed);
    }

    #[test]
    fn test_single_block_is_a_miss() {
        let only = block(0, 0.0, 0.0);
        assert_eq!(resolve(at(0.0, 0.0), &HeroDims::default(), &[&only]), Outcome::Missed);
    }

    #[test]
    fn test_missed_fall_curve_reaches_full_drop() {
        let height = 20.0;
        let duration = (2.0f64 * height).sqrt() * 60.0;
        let fall = FallTrajectory::missed(height, duration);
        assert_eq!(fall.drop, 3.0);
        assert!((fall.duration - 60.0 * (46f64.sqrt() - 40f64.sqrt())).abs() < 1e-9);
        assert!(fall.easing.apply(0.0).abs() < 1e-12);
        assert!((fall.easing.apply(1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missed_fall_without_height() {
        let fall = FallTrajectory::missed(0.0, 0.0);
        assert_eq!(fall.easing, Easing::QuadraticIn);
        assert!(fall.duration > 0.0);
    }
}
