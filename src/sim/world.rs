/// WorldState: the complete snapshot of a running level.
///
/// ## Time
///
/// `now_ms` is simulation time, advanced by exactly one tick per `step`.
/// Every delayed effect (invincibility expiry, corpse removal, the death
/// round trip) is a `Task` on `scheduler`, keyed to `now_ms`. A level
/// (re)load tears the scheduler down, so nothing from the previous run
/// can fire into the new one.
///
/// ## Session
///
/// Debug switches travel on `session` rather than living in a global.
/// The session is created once per run of the program and survives
/// level restarts.

use crate::config::{CombatConfig, DebugFlags, GameConfig, PatrolConfig, PhysicsConfig};
use crate::domain::entity::{Enemy, Player, Toast};
use crate::domain::geometry::{Body, Rect};
use crate::domain::ground::TileGround;
use crate::domain::scoring::{LevelResult, LevelStats, RunTimer};
use crate::sim::level::LevelDef;
use crate::sim::schedule::{Scheduler, Token};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Complete,
}

/// Context object shared by the subsystems for one program run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Session {
    pub debug: DebugFlags,
}

pub struct WorldState {
    // ── Level ──
    pub level: LevelDef,
    pub level_name: String,
    pub ground: TileGround,
    pub bounds: Rect,
    pub goal: Option<Rect>,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub toasts: Vec<Toast>,

    // ── Run tracking ──
    pub stats: LevelStats,
    pub timer: RunTimer,
    pub result: Option<LevelResult>,
    pub phase: Phase,

    // ── Time ──
    pub now_ms: u64,
    pub tick: u64,
    pub scheduler: Scheduler,
    /// Pending invincibility expiry, cancelled on respawn.
    pub invincibility: Option<Token>,

    // ── Tuning ──
    pub patrol: PatrolConfig,
    pub combat: CombatConfig,
    pub physics: PhysicsConfig,

    pub session: Session,
}

// ── Construction ──

impl WorldState {
    /// Empty world; call `level::load_level` before stepping.
    pub fn new(config: &GameConfig) -> Self {
        let (pw, ph) = config.physics.player_size;
        WorldState {
            level: LevelDef::default(),
            level_name: String::new(),
            ground: TileGround::new(vec![], config.physics.tile_size),
            bounds: Rect::default(),
            goal: None,
            player: Player::new(Body::new(0.0, 0.0, pw, ph), config.combat.max_health),
            enemies: vec![],
            toasts: vec![],
            stats: LevelStats::default(),
            timer: RunTimer::default(),
            result: None,
            phase: Phase::Playing,
            now_ms: 0,
            tick: 0,
            scheduler: Scheduler::new(),
            invincibility: None,
            patrol: config.patrol.clone(),
            combat: config.combat.clone(),
            physics: config.physics.clone(),
            session: Session { debug: config.debug },
        }
    }

    pub fn enemy_index(&self, id: usize) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }

    pub fn live_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive()).count()
    }

    pub fn toasts_left(&self) -> usize {
        self.toasts.iter().filter(|t| !t.collected).count()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.timer.elapsed_secs(self.now_ms)
    }
}
