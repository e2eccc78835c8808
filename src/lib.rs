//! Jump Cube - a multiplayer block-jumping game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (block chain, animation tasks, jumps, landing checks)
//! - `net`: Realtime channel messages exchanged with other players in a room
//! - `scoreboard`: Ranking of the room's best scores
//! - `settings`: Data-driven game tuning
//! - `web`: Browser bindings (wasm32 only)

pub mod color;
pub mod error;
pub mod net;
pub mod scoreboard;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use color::Color;
pub use error::GameError;
pub use scoreboard::Scoreboard;
pub use settings::Settings;

/// Game configuration constants
///
/// Units: world units for lengths, milliseconds for time.
pub mod consts {
    use glam::DVec3;

    /// Nominal frame length for callers driving `tick` at 60 Hz
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Shortest interpolation; zero or negative durations are clamped to this
    pub const MIN_DURATION_MS: f64 = 1.0;

    /// Block box dimensions (width, height, depth)
    pub const BLOCK_SIZE: DVec3 = DVec3::new(10.0, 6.0, 10.0);
    /// Number of blocks kept alive in the chain
    pub const CHAIN_WINDOW: usize = 6;
    /// Drawn block distances lie in [MIN_DISTANCE, MIN_DISTANCE + DISTANCE_SPREAD)
    pub const MIN_DISTANCE: u32 = 12;
    pub const DISTANCE_SPREAD: u32 = 18;
    /// Distances of the two opening blocks
    pub const OPENING_DISTANCES: [u32; 2] = [1, 20];
    /// Block rise (grow from the ground) duration
    pub const BLOCK_RISE_MS: f64 = 750.0;

    /// Hero root position when standing on a block
    pub const HERO_REST: DVec3 = DVec3::new(0.0, 5.0, 0.0);
    /// Head offset from the hero root at rest
    pub const HEAD_REST: DVec3 = DVec3::new(0.0, 2.0, 0.0);
    /// Origin of the group holding other players' ghosts
    pub const GHOST_GROUP_ORIGIN: DVec3 = DVec3::new(0.0, 5.0, 0.0);

    /// Squat charge cap
    pub const SQUAT_MAX_MS: f64 = 1500.0;
    /// Pose restore duration at full charge
    pub const SQUAT_RESTORE_MS: f64 = 200.0;
    /// Jump distance at full charge
    pub const DISTANCE_PER_RATIO: f64 = 30.0;
    /// Jump height at full charge
    pub const HEIGHT_PER_RATIO: f64 = 20.0;
    /// Ballistic time scale: duration = sqrt(2 * height) * TIME_SCALE
    pub const TIME_SCALE: f64 = 60.0;
    /// Charges above this ratio spin the hero
    pub const SPIN_THRESHOLD: f64 = 0.2;

    /// Free-fall speed (units per ms) used by `fall`
    pub const FALL_SPEED: f64 = 0.018;
    /// Drop after a full miss
    pub const MISS_DROP: f64 = 3.0;
    /// Edge topple rotation and the following drop each take this long
    pub const TOPPLE_MS: f64 = 1000.0;

    /// Intro: height the hero drops from onto the first block
    pub const INTRO_DROP: f64 = 19.0;
    pub const INTRO_HERO_DELAY_MS: f64 = 1000.0;
    pub const INTRO_BLOCK_STAGGER_MS: f64 = 600.0;
}
