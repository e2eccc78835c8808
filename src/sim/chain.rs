//! Block chain: the capped window of blocks the hero jumps between

use std::collections::VecDeque;

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::Movable;
use super::anim::{AnimationScheduler, Easing, Join, Motion, NodeId, Track, Tween};
use super::seed::SeededSequence;
use crate::Color;
use crate::consts::{BLOCK_SIZE, CHAIN_WINDOW};

/// Horizontal placement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Towards +X
    X,
    /// Towards -Z
    Z,
}

impl Axis {
    /// Unit step in the placement direction
    pub fn unit(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Z => DVec3::NEG_Z,
        }
    }

    pub fn is_x(self) -> bool {
        self == Axis::X
    }
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    /// Inclusive membership
    pub fn contains(&self, p: DVec3) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }
}

/// A placed block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    /// World position, moved by world shifts
    pub position: DVec3,
    /// Position in the room's shared frame, fixed at placement
    pub placed_at: DVec3,
    pub half_extents: DVec3,
    /// Direction from the previous block
    pub axis: Axis,
    pub color: Color,
    /// Visual scale (the rise animation grows it from the ground)
    pub scale: DVec3,
}

impl Block {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min: self.position - self.half_extents,
            max: self.position + self.half_extents,
        }
    }

    pub fn contains(&self, point: DVec3) -> bool {
        self.bounds().contains(point)
    }

    /// Grow out of the ground: flat, then 30% height linearly, then elastic to full
    pub fn rise(&mut self, scheduler: &mut AnimationScheduler, delay: f64, duration: f64) -> Join {
        self.scale = DVec3::new(1.0, 0.0, 1.0);
        let squash = duration * 0.1;
        scheduler.schedule(
            Tween::to(self.node(), Track::Scale, DVec3::new(1.0, 0.3, 1.0)).with(Motion::linear(squash).delayed(delay)),
        );
        let grow = self.scale_to(
            scheduler,
            DVec3::ONE,
            Motion::new(duration * 0.9, Easing::ElasticOut).delayed(delay + squash),
        );
        Join::single(grow)
    }
}

impl Movable for Block {
    fn node(&self) -> NodeId {
        NodeId::Block(self.id)
    }
}

/// Result of an append
#[derive(Debug, Clone)]
pub struct Placement {
    pub block: Block,
    /// Oldest block pushed out of the window, if any
    pub evicted: Option<Block>,
}

/// Ordered chain of live blocks, oldest first
#[derive(Debug, Clone)]
pub struct BlockChain {
    blocks: VecDeque<Block>,
    window: usize,
    sequence: SeededSequence,
    palette: Pcg32,
}

impl BlockChain {
    pub fn new(sequence: SeededSequence, window: usize) -> Self {
        let window = window.max(2);
        let palette = Pcg32::seed_from_u64(sequence.initial().to_bits());
        Self {
            blocks: VecDeque::with_capacity(window + 1),
            window,
            sequence,
            palette,
        }
    }

    /// Chain with the default window
    pub fn with_sequence(sequence: SeededSequence) -> Self {
        Self::new(sequence, CHAIN_WINDOW)
    }

    /// Place the next block
    ///
    /// A draw is always taken so the seed advances the same way whether or
    /// not overrides are given; overrides win over the drawn values.
    pub fn append(&mut self, distance: Option<u32>, axis: Option<Axis>) -> Placement {
        let draw = self.sequence.draw();
        let distance = distance.unwrap_or(draw.distance) as f64;
        let axis = axis.unwrap_or(draw.axis);
        let step = axis.unit() * distance;

        let (id, position, placed_at) = match self.blocks.back() {
            Some(last) => (last.id + 1, last.position + step, last.placed_at + step),
            None => (0, step, step),
        };
        let block = Block {
            id,
            position: DVec3::new(position.x, 0.0, position.z),
            placed_at: DVec3::new(placed_at.x, 0.0, placed_at.z),
            half_extents: BLOCK_SIZE * 0.5,
            axis,
            color: Color::from_hsl(self.palette.random::<f64>(), 0.65, 0.5),
            scale: DVec3::ONE,
        };
        self.blocks.push_back(block.clone());

        let evicted = if self.blocks.len() > self.window {
            self.blocks.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            log::debug!("block {} left the window", old.id);
        }

        Placement { block, evicted }
    }

    pub fn last(&self) -> Option<&Block> {
        self.blocks.back()
    }

    pub fn get(&self, id: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.blocks.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn sequence(&self) -> &SeededSequence {
        &self.sequence
    }

    /// Translate every live block by `delta`
    pub fn shift(&mut self, delta: DVec3) {
        for block in &mut self.blocks {
            block.position += delta;
        }
    }

    /// The last two blocks, most recent first (fewer if the chain is short)
    pub fn recent_pair(&self) -> Vec<&Block> {
        self.blocks.iter().rev().take(2).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chain(seed: f64) -> BlockChain {
        BlockChain::with_sequence(SeededSequence::new(seed))
    }

    #[test]
    fn test_first_block_and_ids() {
        let mut chain = chain(7.5);
        let first = chain.append(Some(1), Some(Axis::X)).block;
        assert_eq!(first.id, 0);
        assert_eq!(first.position, DVec3::new(1.0, 0.0, 0.0));

        let second = chain.append(Some(20), Some(Axis::Z)).block;
        assert_eq!(second.id, 1);
        assert_eq!(second.position, DVec3::new(1.0, 0.0, -20.0));
        assert_eq!(second.axis, Axis::Z);
    }

    #[test]
    fn test_overrides_still_advance_seed() {
        let mut with_overrides = chain(42.0);
        let mut plain = chain(42.0);
        with_overrides.append(Some(1), Some(Axis::X));
        plain.append(None, None);
        assert_eq!(with_overrides.sequence().seed(), plain.sequence().seed());
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut chain = chain(13.0);
        for _ in 0..6 {
            assert!(chain.append(None, None).evicted.is_none());
        }
        let placement = chain.append(None, None);
        assert_eq!(placement.evicted.map(|b| b.id), Some(0));
        assert_eq!(chain.len(), 6);
        assert_eq!(chain.iter().next().map(|b| b.id), Some(1));
    }

    #[test]
    fn test_shift_moves_position_not_placement() {
        let mut chain = chain(13.0);
        chain.append(Some(1), Some(Axis::X));
        chain.append(Some(20), Some(Axis::X));
        chain.shift(DVec3::new(-21.0, 0.0, 0.0));

        let last = chain.last().unwrap();
        assert_eq!(last.position, DVec3::ZERO);
        assert_eq!(last.placed_at, DVec3::new(21.0, 0.0, 0.0));
    }

    #[test]
    fn test_recent_pair_order() {
        let mut chain = chain(13.0);
        assert!(chain.recent_pair().is_empty());
        chain.append(None, None);
        chain.append(None, None);
        chain.append(None, None);
        let ids: Vec<u32> = chain.recent_pair().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let mut chain = chain(13.0);
        let block = chain.append(Some(1), Some(Axis::X)).block;
        // Box spans x in [-4, 6], y in [-3, 3], z in [-5, 5]
        assert!(block.contains(DVec3::new(-4.0, 3.0, 5.0)));
        assert!(!block.contains(DVec3::new(-4.0001, 0.0, 0.0)));
    }

    #[test]
    fn test_colors_are_deterministic() {
        let mut a = chain(99.0);
        let mut b = chain(99.0);
        for _ in 0..4 {
            assert_eq!(a.append(None, None).block.color, b.append(None, None).block.color);
        }
    }

    proptest! {
        #[test]
        fn prop_chain_invariants(seed in 3.2f64..1003.0, count in 1usize..40) {
            let mut chain = chain(seed);
            let mut previous: Option<Block> = None;
            for _ in 0..count {
                let block = chain.append(None, None).block;
                prop_assert!(chain.len() <= 6);
                if let Some(prev) = previous {
                    let step = block.placed_at - prev.placed_at;
                    let along = match block.axis {
                        Axis::X => step.x,
                        Axis::Z => -step.z,
                    };
                    prop_assert!((12.0..30.0).contains(&along));
                    // Offset along exactly one axis
                    let across = match block.axis {
                        Axis::X => step.z,
                        Axis::Z => step.x,
                    };
                    prop_assert_eq!(across, 0.0);
                    prop_assert_eq!(block.id, prev.id + 1);
                }
                previous = Some(block);
            }
        }
    }
}
