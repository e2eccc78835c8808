//! The live scene the animation tasks write into

use glam::DVec3;
use serde::Serialize;

use super::actor::Hero;
use super::anim::{Figure, NodeId, Stage, Track};
use super::chain::BlockChain;
use crate::consts::GHOST_GROUP_ORIGIN;

/// Another player's figure
#[derive(Debug, Clone)]
pub struct Ghost {
    pub name: String,
    pub hero: Hero,
}

/// A ghost as the renderer places it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GhostPose {
    pub name: String,
    pub position: DVec3,
    pub rotation: DVec3,
    pub opacity: f64,
    pub visible: bool,
}

/// Hero, blocks and ghosts
///
/// The player stays near the origin; jumping moves the world instead. The
/// accumulated shift is itself an animatable node ([`NodeId::World`]) so that
/// every block and the ghost group move in lockstep.
#[derive(Debug, Clone)]
pub struct World {
    pub hero: Hero,
    pub chain: BlockChain,
    ghosts: Vec<Ghost>,
    /// Origin of the ghost group, follows the world shift
    group_origin: DVec3,
    offset: DVec3,
}

impl World {
    pub fn new(chain: BlockChain) -> Self {
        Self {
            hero: Hero::player(),
            chain,
            ghosts: Vec::new(),
            group_origin: GHOST_GROUP_ORIGIN,
            offset: DVec3::ZERO,
        }
    }

    /// Total world shift applied so far
    pub fn offset(&self) -> DVec3 {
        self.offset
    }

    pub fn group_origin(&self) -> DVec3 {
        self.group_origin
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghost(&self, name: &str) -> Option<&Hero> {
        self.ghosts.iter().find(|g| g.name == name).map(|g| &g.hero)
    }

    /// The named ghost, created on first use
    pub fn ghost_or_spawn(&mut self, name: &str) -> &mut Hero {
        let index = match self.ghosts.iter().position(|g| g.name == name) {
            Some(index) => index,
            None => {
                let slot = self.ghosts.len() as u32;
                log::debug!("spawning ghost {slot} for {name}");
                self.ghosts.push(Ghost {
                    name: name.to_string(),
                    hero: Hero::ghost(slot),
                });
                self.ghosts.len() - 1
            }
        };
        &mut self.ghosts[index].hero
    }

    pub fn hide_ghost(&mut self, name: &str) {
        if let Some(ghost) = self.ghosts.iter_mut().find(|g| g.name == name) {
            ghost.hero.visible = false;
        }
    }

    /// World position of a ghost (ghosts live in the group frame)
    pub fn ghost_world_position(&self, name: &str) -> Option<DVec3> {
        self.ghost(name).map(|hero| self.group_origin + hero.position)
    }

    /// Every ghost in world coordinates, in spawn order
    pub fn ghost_poses(&self) -> Vec<GhostPose> {
        self.ghosts
            .iter()
            .filter_map(|ghost| {
                Some(GhostPose {
                    name: ghost.name.clone(),
                    position: self.ghost_world_position(&ghost.name)?,
                    rotation: ghost.hero.rotation,
                    opacity: ghost.hero.opacity,
                    visible: ghost.hero.visible,
                })
            })
            .collect()
    }

    fn figure(&self, figure: Figure) -> Option<&Hero> {
        match figure {
            Figure::Player => Some(&self.hero),
            Figure::Ghost(slot) => self.ghosts.get(slot as usize).map(|g| &g.hero),
        }
    }

    fn figure_mut(&mut self, figure: Figure) -> Option<&mut Hero> {
        match figure {
            Figure::Player => Some(&mut self.hero),
            Figure::Ghost(slot) => self.ghosts.get_mut(slot as usize).map(|g| &mut g.hero),
        }
    }
}

impl Stage for World {
    fn read(&self, node: NodeId, track: Track) -> Option<DVec3> {
        match node {
            NodeId::World => (track == Track::Position).then_some(self.offset),
            NodeId::Block(id) => {
                let block = self.chain.get(id)?;
                match track {
                    Track::Position => Some(block.position),
                    Track::Scale => Some(block.scale),
                    Track::Rotation => None,
                }
            }
            NodeId::Hero(figure) | NodeId::Head(figure) | NodeId::Body(figure) => {
                self.figure(figure)?.slot(node, track)
            }
        }
    }

    fn write(&mut self, node: NodeId, track: Track, value: DVec3) {
        match node {
            NodeId::World => {
                let delta = value - self.offset;
                self.offset = value;
                self.chain.shift(delta);
                self.group_origin += delta;
            }
            NodeId::Block(id) => {
                if let Some(block) = self.chain.get_mut(id) {
                    match track {
                        Track::Position => block.position = value,
                        Track::Scale => block.scale = value,
                        Track::Rotation => {}
                    }
                }
            }
            NodeId::Hero(figure) | NodeId::Head(figure) | NodeId::Body(figure) => {
                if let Some(slot) = self.figure_mut(figure).and_then(|hero| hero.slot_mut(node, track)) {
                    *slot = value;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::anim::{AnimationScheduler, Motion, Tween};
    use crate::sim::chain::Axis;
    use crate::sim::seed::SeededSequence;

    fn world() -> World {
        let mut chain = BlockChain::with_sequence(SeededSequence::new(10.0));
        chain.append(Some(1), Some(Axis::X));
        chain.append(Some(20), Some(Axis::X));
        World::new(chain)
    }

    #[test]
    fn test_world_shift_moves_blocks_and_group_together() {
        let mut world = world();
        let mut scheduler = AnimationScheduler::new();
        scheduler.schedule(Tween::by(NodeId::World, Track::Position, DVec3::new(-20.0, 0.0, 0.0)).with(Motion::linear(100.0)));

        scheduler.advance(50.0, &mut world);
        let mid: Vec<f64> = world.chain.iter().map(|b| b.position.x).collect();
        assert!((mid[0] - -9.0).abs() < 1e-9);
        assert!((mid[1] - 11.0).abs() < 1e-9);
        assert!((world.group_origin().x - -10.0).abs() < 1e-9);

        scheduler.advance(50.0, &mut world);
        let last = world.chain.last().unwrap();
        assert!((last.position.x - 1.0).abs() < 1e-9);
        assert_eq!(last.placed_at.x, 21.0);
        assert_eq!(world.offset(), DVec3::new(-20.0, 0.0, 0.0));
        // The hero does not move with the world
        assert_eq!(world.hero.position, crate::consts::HERO_REST);
    }

    #[test]
    fn test_ghost_slots_are_stable() {
        let mut world = world();
        world.ghost_or_spawn("ann").position = DVec3::X;
        world.ghost_or_spawn("bob");
        world.ghost_or_spawn("ann").position += DVec3::X;

        assert_eq!(world.ghosts().len(), 2);
        assert_eq!(world.ghost("ann").map(|h| h.position), Some(DVec3::new(2.0, 0.0, 0.0)));
        assert_eq!(world.ghost_world_position("ann"), Some(GHOST_GROUP_ORIGIN + DVec3::new(2.0, 0.0, 0.0)));

        world.hide_ghost("bob");
        assert_eq!(world.ghost("bob").map(|h| h.visible), Some(false));

        let poses = world.ghost_poses();
        assert_eq!(poses.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["ann", "bob"]);
        assert_eq!(poses[0].position, GHOST_GROUP_ORIGIN + DVec3::new(2.0, 0.0, 0.0));
        assert!(poses[0].visible);
        assert!(!poses[1].visible);
    }

    #[test]
    fn test_evicted_block_reads_none() {
        let world = world();
        assert!(world.read(NodeId::Block(99), Track::Position).is_none());
        assert!(world.read(NodeId::Block(0), Track::Rotation).is_none());
    }
}
