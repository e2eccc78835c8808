//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `GameSession::tick`
//! - Block layout comes from the room seed only
//! - Animation tasks run in insertion order
//! - No rendering or platform dependencies

pub mod actor;
pub mod anim;
pub mod autopilot;
pub mod chain;
pub mod collision;
pub mod events;
pub mod jump;
pub mod seed;
pub mod session;
pub mod world;

pub use actor::{Hero, HeroDims, Movable};
pub use anim::{AnimationScheduler, Easing, Figure, Join, Mask, Motion, NodeId, Stage, TaskId, Track, Tween};
pub use chain::{Axis, Block, BlockChain, Bounds, Placement};
pub use collision::{FallDirection, FallTrajectory, Outcome, ProbeHits, probe, resolve};
pub use events::{EventBus, EventKind, GameEvent, JumpReport};
pub use jump::{JumpParams, ghost_jump, perform_jump};
pub use seed::{Draw, SeededSequence, room_seed};
pub use session::{GamePhase, GameSession};
pub use world::{Ghost, GhostPose, World};
