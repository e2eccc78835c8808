//! Game session: input state machine, scoring and peer ghosts
//!
//! The session owns the world and the scheduler. Callers feed it input edges
//! and frame ticks; it answers through the event bus.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::actor::{Hero, Movable};
use super::anim::{AnimationScheduler, Join};
use super::chain::{Axis, BlockChain, Placement};
use super::collision::{FallTrajectory, Outcome, resolve};
use super::events::{EventBus, EventKind, GameEvent, JumpReport};
use super::jump::{JumpParams, ghost_jump, perform_jump};
use super::seed::{SeededSequence, room_seed};
use super::world::{Ghost, World};
use crate::consts::{BLOCK_RISE_MS, INTRO_BLOCK_STAGGER_MS, INTRO_DROP, INTRO_HERO_DELAY_MS, OPENING_DISTANCES};
use crate::net::{PeerBoard, PeerFall, PeerJump, PeerMessage};
use crate::{Color, GameError, Settings};

/// Current game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Blocks rising and hero dropping in
    Intro,
    /// Waiting for input
    Idle,
    /// Input held, squat running
    Charging,
    /// Jump in flight, or the landed-on block's successor rising
    Resolving,
    /// Run ended
    GameOver,
}

/// What the session waits on before moving on
#[derive(Debug, Clone)]
enum Pending {
    Intro(Join),
    Jump { params: JumpParams, join: Join },
    Settle(Join),
    Fall(Join),
}

pub struct GameSession {
    settings: Settings,
    room: Option<String>,
    initial_seed: f64,
    score: u32,
    phase: GamePhase,
    world: World,
    scheduler: AnimationScheduler,
    events: EventBus,
    pending: Option<Pending>,
    peers: PeerBoard,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("room", &self.room)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .field("tasks", &self.scheduler.task_count())
            .finish()
    }
}

impl GameSession {
    /// Session on `seed`, ready to play without an intro
    pub fn new(settings: Settings, seed: f64) -> Self {
        let world = World::new(opening_chain(seed, settings.chain_window));
        Self {
            settings,
            room: None,
            initial_seed: seed,
            score: 0,
            phase: GamePhase::Idle,
            world,
            scheduler: AnimationScheduler::new(),
            events: EventBus::default(),
            pending: None,
            peers: PeerBoard::default(),
        }
    }

    /// Join `room`: reseed from its name, rebuild, and play the intro if enabled
    pub fn start(&mut self, room: &str) -> Result<(), GameError> {
        let seed = room_seed(room)?;
        log::info!("Starting room {room} (seed {seed})");
        self.room = Some(room.to_string());
        self.initial_seed = seed;
        self.reset();
        if self.settings.intro {
            self.play_intro();
        }
        Ok(())
    }

    /// Back to the first block with a fresh chain
    ///
    /// Every in-flight task is dropped first, so nothing from the previous
    /// run writes into the rebuilt world.
    pub fn reset(&mut self) {
        self.scheduler.clear();
        self.pending = None;

        let removed: Vec<u32> = self.world.chain.iter().map(|b| b.id).collect();
        for id in removed {
            self.events.emit(GameEvent::BlockRemoved(id));
        }

        self.world = World::new(opening_chain(self.initial_seed, self.settings.chain_window));
        for block in self.world.chain.iter() {
            self.events.emit(GameEvent::BlockPlaced(block.id));
        }
        self.score = 0;
        self.peers.clear();
        self.phase = GamePhase::Idle;
        log::debug!("Session reset (seed {})", self.initial_seed);
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: impl FnMut(&GameEvent) + 'static) {
        self.events.subscribe(kind, handler);
    }

    /// Press: start charging
    pub fn on_input_down(&mut self) {
        if self.phase != GamePhase::Idle {
            return;
        }
        self.events.emit(GameEvent::Down);
        self.world
            .hero
            .start_squat(&mut self.scheduler, self.settings.squat_max_ms);
        self.phase = GamePhase::Charging;
    }

    /// Release: turn the charge into a jump
    pub fn on_input_up(&mut self) {
        if self.phase != GamePhase::Charging {
            return;
        }
        self.events.emit(GameEvent::Up);
        let Some(ratio) = self.world.hero.stop_squat(
            &mut self.scheduler,
            self.settings.squat_max_ms,
            self.settings.squat_restore_ms,
        ) else {
            self.phase = GamePhase::Idle;
            return;
        };

        let params = self.settings.jump_params(ratio);
        let axis = self.world.chain.last().map_or(Axis::X, |b| b.axis);
        let relative_position = self
            .world
            .chain
            .recent_pair()
            .get(1)
            .map_or(DVec3::ZERO, |b| b.position);

        self.events.emit(GameEvent::Energy(params.ratio));
        self.events.emit(GameEvent::Jump(JumpReport {
            squat_ratio: params.ratio,
            relative_position,
            axis_is_x: axis.is_x(),
        }));
        log::debug!("Jump {params:?} along {axis:?}");

        let spin = params.spins(self.settings.spin_threshold);
        let join = perform_jump(&self.world, &mut self.scheduler, &params, axis, spin);
        self.pending = Some(Pending::Jump { params, join });
        self.phase = GamePhase::Resolving;
    }

    /// Advance by `dt` ms
    pub fn tick(&mut self, dt: f64) {
        self.scheduler.advance(dt, &mut self.world);

        let Some(pending) = self.pending.take() else {
            return;
        };
        match pending {
            Pending::Intro(join) if join.is_complete(&self.scheduler) => {
                self.phase = GamePhase::Idle;
            }
            Pending::Jump { params, join } if join.is_complete(&self.scheduler) => {
                self.land(&params);
            }
            Pending::Settle(join) if join.is_complete(&self.scheduler) => {
                self.phase = GamePhase::Idle;
            }
            Pending::Fall(join) if join.is_complete(&self.scheduler) => {
                log::debug!("Hero came to rest");
            }
            pending => self.pending = Some(pending),
        }
    }

    /// Another player jumped (or announced a score)
    pub fn on_peer_jump(&mut self, message: &PeerJump) {
        if !self.accepts(&message.room, &message.name) {
            return;
        }
        self.peers.record(&message.name, message.score);
        if !message.is_jump() {
            return;
        }

        let Some(anchor) = self.world.chain.get(message.score).map(|b| b.placed_at) else {
            self.world.hide_ghost(&message.name);
            return;
        };
        let params = self.settings.jump_params(message.squat_ratio);
        let spin = params.spins(self.settings.spin_threshold);
        let ghost = self.world.ghost_or_spawn(&message.name);
        ghost.position = anchor - message.relative_position;
        ghost.visible = true;
        ghost_jump(ghost, &mut self.scheduler, &params, message.axis_is_x, spin);
    }

    /// Another player's run ended
    pub fn on_peer_fall(&mut self, message: &PeerFall) {
        if !self.accepts(&message.room, &message.name) {
            return;
        }
        self.peers.record(&message.name, message.score);
        self.world.hide_ghost(&message.name);
    }

    pub fn on_peer_message(&mut self, message: &PeerMessage) {
        match message {
            PeerMessage::Jump(jump) => self.on_peer_jump(jump),
            PeerMessage::Fall(fall) => self.on_peer_fall(fall),
        }
    }

    /// Channel message for a jump we just reported, if we are in a named room
    pub fn announce_jump(&self, report: &JumpReport) -> Option<PeerMessage> {
        let (room, name) = self.identity()?;
        Some(PeerMessage::Jump(PeerJump::from_report(room, name, self.score, report)))
    }

    /// Channel message for a new score
    pub fn announce_score(&self) -> Option<PeerMessage> {
        let (room, name) = self.identity()?;
        Some(PeerMessage::Jump(PeerJump::score_update(room, name, self.score)))
    }

    /// Channel message for the end of our run
    pub fn announce_fall(&self) -> Option<PeerMessage> {
        let (room, name) = self.identity()?;
        Some(PeerMessage::Fall(PeerFall {
            room: room.to_string(),
            name: name.to_string(),
            score: self.score,
        }))
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn initial_seed(&self) -> f64 {
        self.initial_seed
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn chain(&self) -> &BlockChain {
        &self.world.chain
    }

    pub fn hero(&self) -> &Hero {
        &self.world.hero
    }

    pub fn ghosts(&self) -> &[Ghost] {
        self.world.ghosts()
    }

    pub fn peers(&self) -> &PeerBoard {
        &self.peers
    }

    /// Number of animation tasks in flight
    pub fn task_count(&self) -> usize {
        self.scheduler.task_count()
    }

    /// Scheduler clock in ms
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    fn identity(&self) -> Option<(&str, &str)> {
        Some((self.room.as_deref()?, self.settings.player_name.as_deref()?))
    }

    fn accepts(&self, room: &str, name: &str) -> bool {
        self.room.as_deref() == Some(room) && self.settings.player_name.as_deref() != Some(name)
    }

    fn play_intro(&mut self) {
        let mut join = Join::default();
        for (index, block) in self.world.chain.iter_mut().enumerate() {
            let delay = index as f64 * INTRO_BLOCK_STAGGER_MS;
            join = join.and(block.rise(&mut self.scheduler, delay, BLOCK_RISE_MS));
        }

        let hero = &mut self.world.hero;
        hero.position.y += INTRO_DROP;
        join.push(hero.fall(&mut self.scheduler, INTRO_DROP, INTRO_HERO_DELAY_MS));

        self.pending = Some(Pending::Intro(join));
        self.phase = GamePhase::Intro;
    }

    fn land(&mut self, params: &JumpParams) {
        let outcome = resolve(
            self.world.hero.position,
            &self.world.hero.dims,
            &self.world.chain.recent_pair(),
        );
        log::debug!("Landing outcome: {outcome:?}");

        match outcome {
            Outcome::Landed { block, scored: true } => {
                self.score += 1;
                self.events.emit(GameEvent::Score(self.score));
                let color = self.world.chain.get(block).map_or(Color::GRAY, |b| b.color);
                self.events.emit(GameEvent::Color(color));

                let placement = self.place_block();
                let rise = self
                    .world
                    .chain
                    .get_mut(placement.block.id)
                    .map(|b| b.rise(&mut self.scheduler, 0.0, BLOCK_RISE_MS))
                    .unwrap_or_default();
                self.pending = Some(Pending::Settle(rise));
            }
            Outcome::Landed { scored: false, .. } => {
                self.phase = GamePhase::Idle;
            }
            Outcome::FallEdge { direction, edge, .. } => {
                self.game_over();
                let join = self.world.hero.topple(&mut self.scheduler, direction, edge);
                self.pending = Some(Pending::Fall(join));
            }
            Outcome::Missed => {
                self.game_over();
                let fall = FallTrajectory::missed(params.height, params.duration);
                let task = fall.schedule(&self.world.hero, &mut self.scheduler);
                self.pending = Some(Pending::Fall(Join::single(task)));
            }
        }
    }

    fn place_block(&mut self) -> Placement {
        let placement = self.world.chain.append(None, None);
        self.events.emit(GameEvent::BlockPlaced(placement.block.id));
        if let Some(evicted) = &placement.evicted {
            self.events.emit(GameEvent::BlockRemoved(evicted.id));
        }
        placement
    }

    fn game_over(&mut self) {
        let color = self.world.chain.last().map_or(Color::GRAY, |b| b.color);
        log::info!("Game over with score {}", self.score);
        self.phase = GamePhase::GameOver;
        self.events.emit(GameEvent::GameOver(color));
    }
}

/// Fresh chain holding the two opening blocks
fn opening_chain(seed: f64, window: usize) -> BlockChain {
    let mut chain = BlockChain::new(SeededSequence::new(seed), window);
    for distance in OPENING_DISTANCES {
        chain.append(Some(distance), Some(Axis::X));
    }
    chain
}
