//! Time-stepped interpolation tasks
//!
//! Everything that moves goes through an [`AnimationScheduler`]. The caller
//! advances it once per frame; tasks run in insertion order and write their
//! interpolated values into a [`Stage`]. "Concurrent" motions are just tasks
//! started together, awaited through a [`Join`].

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_DURATION_MS;

/// Handle of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

/// Which figure a hero node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Figure {
    /// The local player
    Player,
    /// Another player's ghost, by slot
    Ghost(u32),
}

/// Addressable animated node of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    /// The accumulated world shift (moves every block and the ghost group together)
    World,
    Block(u32),
    Hero(Figure),
    Head(Figure),
    Body(Figure),
}

/// Animated property of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    Position,
    Scale,
    Rotation,
}

/// Components a task is allowed to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Mask {
    pub const ALL: Mask = Mask { x: true, y: true, z: true };
    pub const Y: Mask = Mask { x: false, y: true, z: false };
    pub const XZ: Mask = Mask { x: true, y: false, z: true };

    /// Take masked components from `value`, the rest from `current`
    pub fn merge(self, current: DVec3, value: DVec3) -> DVec3 {
        DVec3::new(
            if self.x { value.x } else { current.x },
            if self.y { value.y } else { current.y },
            if self.z { value.z } else { current.z },
        )
    }
}

/// Easing curves, `k` in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    QuadraticIn,
    QuadraticOut,
    SinusoidalOut,
    BounceOut,
    ElasticOut,
    /// `quad * k^2 + lin * k`
    Polynomial { quad: f64, lin: f64 },
}

impl Easing {
    pub fn apply(self, k: f64) -> f64 {
        match self {
            Easing::Linear => k,
            Easing::QuadraticIn => k * k,
            Easing::QuadraticOut => k * (2.0 - k),
            Easing::SinusoidalOut => (k * PI / 2.0).sin(),
            Easing::BounceOut => bounce_out(k),
            Easing::ElasticOut => {
                if k <= 0.0 {
                    0.0
                } else if k >= 1.0 {
                    1.0
                } else {
                    2f64.powf(-10.0 * k) * ((k - 0.1) * 5.0 * PI).sin() + 1.0
                }
            }
            Easing::Polynomial { quad, lin } => quad * k * k + lin * k,
        }
    }
}

fn bounce_out(k: f64) -> f64 {
    const N: f64 = 7.5625;
    if k < 1.0 / 2.75 {
        N * k * k
    } else if k < 2.0 / 2.75 {
        let k = k - 1.5 / 2.75;
        N * k * k + 0.75
    } else if k < 2.5 / 2.75 {
        let k = k - 2.25 / 2.75;
        N * k * k + 0.9375
    } else {
        let k = k - 2.625 / 2.75;
        N * k * k + 0.984375
    }
}

/// Timing of one interpolation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Milliseconds; clamped to `MIN_DURATION_MS` when run
    pub duration: f64,
    pub easing: Easing,
    /// Milliseconds before the task starts (its start value is read then)
    pub delay: f64,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            duration: 1000.0,
            easing: Easing::Linear,
            delay: 0.0,
        }
    }
}

impl Motion {
    pub fn new(duration: f64, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            delay: 0.0,
        }
    }

    pub fn linear(duration: f64) -> Self {
        Self::new(duration, Easing::Linear)
    }

    pub fn delayed(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Goal {
    To { from: Option<DVec3>, to: DVec3 },
    By(DVec3),
}

/// Description of a task before it is scheduled
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    node: NodeId,
    track: Track,
    mask: Mask,
    goal: Goal,
    motion: Motion,
    settle: Option<DVec3>,
}

impl Tween {
    /// Interpolate towards an absolute value
    pub fn to(node: NodeId, track: Track, to: DVec3) -> Self {
        Self::with_goal(node, track, Goal::To { from: None, to })
    }

    /// Interpolate by a delta relative to the value at start
    pub fn by(node: NodeId, track: Track, delta: DVec3) -> Self {
        Self::with_goal(node, track, Goal::By(delta))
    }

    fn with_goal(node: NodeId, track: Track, goal: Goal) -> Self {
        Self {
            node,
            track,
            mask: Mask::ALL,
            goal,
            motion: Motion::default(),
            settle: None,
        }
    }

    /// Fixed start value instead of the one read when the task starts
    pub fn from(mut self, from: DVec3) -> Self {
        if let Goal::To { to, .. } = self.goal {
            self.goal = Goal::To { from: Some(from), to };
        }
        self
    }

    pub fn masked(mut self, mask: Mask) -> Self {
        self.mask = mask;
        self
    }

    pub fn with(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    /// Value written on completion instead of the end value
    pub fn settle_at(mut self, value: DVec3) -> Self {
        self.settle = Some(value);
        self
    }

    fn span(&self, current: DVec3) -> (DVec3, DVec3) {
        match self.goal {
            Goal::To { from, to } => (from.unwrap_or(current), to),
            Goal::By(delta) => (current, current + delta),
        }
    }
}

/// Something tasks can read from and write into
pub trait Stage {
    /// Current value, `None` if the node no longer exists
    fn read(&self, node: NodeId, track: Track) -> Option<DVec3>;
    fn write(&mut self, node: NodeId, track: Track, value: DVec3);
}

struct Task {
    id: TaskId,
    tween: Tween,
    start_at: f64,
    span: Option<(DVec3, DVec3)>,
}

type Callback = Box<dyn FnOnce(TaskId)>;

/// Owner of every in-flight interpolation
#[derive(Default)]
pub struct AnimationScheduler {
    clock: f64,
    next_id: u64,
    tasks: Vec<Task>,
    callbacks: HashMap<TaskId, Vec<Callback>>,
}

impl fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("clock", &self.clock)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler time in milliseconds
    pub fn now(&self) -> f64 {
        self.clock
    }

    pub fn schedule(&mut self, tween: Tween) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let start_at = self.clock + tween.motion.delay.max(0.0);
        self.tasks.push(Task {
            id,
            tween,
            start_at,
            span: None,
        });
        id
    }

    /// True once the task finished, was cancelled or never existed
    pub fn is_complete(&self, id: TaskId) -> bool {
        !self.tasks.iter().any(|t| t.id == id)
    }

    /// Stop a task where it is. Its completion callbacks never fire.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.callbacks.remove(&id);
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Run `callback` when the task completes (immediately if it already has)
    pub fn on_complete(&mut self, id: TaskId, callback: impl FnOnce(TaskId) + 'static) {
        if self.is_complete(id) {
            callback(id);
        } else {
            self.callbacks.entry(id).or_default().push(Box::new(callback));
        }
    }

    /// Number of tasks still pending
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Drop every task and callback
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.callbacks.clear();
    }

    /// Advance time by `dt` ms and write every running task into `stage`
    ///
    /// Returns the tasks that completed during this step.
    pub fn advance<S: Stage + ?Sized>(&mut self, dt: f64, stage: &mut S) -> Vec<TaskId> {
        self.clock += dt.max(0.0);
        let now = self.clock;

        let mut finished = Vec::new();
        let mut orphaned = Vec::new();
        for task in &mut self.tasks {
            if now < task.start_at {
                continue;
            }
            let Some(current) = stage.read(task.tween.node, task.tween.track) else {
                orphaned.push(task.id);
                continue;
            };
            let (from, to) = match task.span {
                Some(span) => span,
                None => {
                    let span = task.tween.span(current);
                    task.span = Some(span);
                    span
                }
            };

            let duration = task.tween.motion.duration.max(MIN_DURATION_MS);
            let t = ((now - task.start_at) / duration).min(1.0);
            let value = if t >= 1.0 {
                task.tween.settle.unwrap_or(to)
            } else {
                from + (to - from) * task.tween.motion.easing.apply(t)
            };
            stage.write(task.tween.node, task.tween.track, task.tween.mask.merge(current, value));

            if t >= 1.0 {
                finished.push(task.id);
            }
        }

        if !finished.is_empty() || !orphaned.is_empty() {
            self.tasks
                .retain(|t| !finished.contains(&t.id) && !orphaned.contains(&t.id));
        }
        for id in &orphaned {
            self.callbacks.remove(id);
        }
        for id in &finished {
            if let Some(callbacks) = self.callbacks.remove(id) {
                for callback in callbacks {
                    callback(*id);
                }
            }
        }
        finished
    }
}

/// All-of join over a set of tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Join {
    tasks: Vec<TaskId>,
}

impl Join {
    pub fn all(tasks: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
        }
    }

    pub fn single(task: TaskId) -> Self {
        Self { tasks: vec![task] }
    }

    pub fn and(mut self, other: Join) -> Self {
        self.tasks.extend(other.tasks);
        self
    }

    pub fn push(&mut self, task: TaskId) {
        self.tasks.push(task);
    }

    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    pub fn is_complete(&self, scheduler: &AnimationScheduler) -> bool {
        self.tasks.iter().all(|&id| scheduler.is_complete(id))
    }

    pub fn cancel(&self, scheduler: &mut AnimationScheduler) {
        for &id in &self.tasks {
            scheduler.cancel(id);
        }
    }
}
