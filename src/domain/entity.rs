/// Entities: Player, Enemy (sockroach), Toast.
/// Enemy lifecycle is a small state machine; the patrol mode is chosen
/// once at spawn and only its cursor fields move afterwards.

use super::geometry::{Body, Rect, Vec2};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Facing as a pure function of horizontal velocity: right only while
    /// moving right.
    pub fn from_velocity(vx: f32) -> Facing {
        if vx > 0.0 { Facing::Right } else { Facing::Left }
    }

    /// Sprite flip flag. Enemy art is drawn facing left, so moving right flips.
    pub fn flip_x(self) -> bool {
        self == Facing::Right
    }
}

/// One tick of player intent.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Explicit "finish level" action, only meaningful inside the goal zone.
    pub confirm: bool,
}

impl FrameInput {
    /// Movement or jump. Confirm alone does not count as playing.
    pub fn has_control(&self) -> bool {
        self.left || self.right || self.jump
    }
}

/// How an enemy decides its horizontal velocity.
#[derive(Clone, PartialEq, Debug)]
pub enum PatrolMode {
    /// Oscillate between two world-x bounds.
    FixedRange { left: f32, right: f32 },
    /// Walk until ground runs out ahead, a wall, or a bound.
    GroundProbe { left: f32, right: f32 },
    /// Bounce along waypoint x positions (sorted ascending).
    FixedPath { waypoints: Vec<f32>, index: usize, direction: i32 },
}

impl PatrolMode {
    pub fn name(&self) -> &'static str {
        match self {
            PatrolMode::FixedRange { .. } => "fixed-range",
            PatrolMode::GroundProbe { .. } => "ground-probe",
            PatrolMode::FixedPath { .. } => "fixed-path",
        }
    }
}

/// Enemy lifecycle.
///
/// ```text
/// Patrolling --stomp--> Stomped --anim done--> Puffing --1s--> Removed
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyState {
    Patrolling,
    Stomped,
    Puffing,
    Removed,
}

/// Spawn description read once from level data.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnData {
    pub kind: String,
    /// Spawn x (body centre) and y (feet).
    pub x: f32,
    pub y: f32,
    pub speed: Option<f32>,
    /// Explicit patrol width in px; selects a fixed range.
    pub patrol_width: Option<f32>,
    /// Ground-probe bound range in px.
    pub range: Option<f32>,
    pub path_name: Option<String>,
}

impl SpawnData {
    pub fn at(x: f32, y: f32) -> Self {
        SpawnData {
            kind: String::from("sockroach"),
            x,
            y,
            speed: None,
            patrol_width: None,
            range: None,
            path_name: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: usize,
    pub kind: String,
    pub body: Body,
    pub speed: f32,
    pub mode: PatrolMode,
    pub facing: Facing,
    /// Direction flips are ignored until the clock reaches this value.
    pub reverse_cooldown_until_ms: u64,
    pub state: EnemyState,
}

impl Enemy {
    pub fn new(id: usize, kind: &str, body: Body, speed: f32, mode: PatrolMode) -> Self {
        Enemy {
            id,
            kind: kind.to_string(),
            body,
            speed,
            mode,
            facing: Facing::Left,
            reverse_cooldown_until_ms: 0,
            state: EnemyState::Patrolling,
        }
    }

    /// True until stomped. Only live enemies patrol or hurt the player.
    pub fn alive(&self) -> bool {
        self.state == EnemyState::Patrolling
    }

    /// Still part of the simulation (possibly as a falling corpse).
    pub fn present(&self) -> bool {
        self.state != EnemyState::Removed
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub spawn: Vec2,
    pub facing: Facing,
    pub health: u32,
    pub is_invincible: bool,
    /// Latched for the whole death → respawn round trip.
    pub is_dead: bool,
    pub jump_count: u32,
}

impl Player {
    pub fn new(body: Body, health: u32) -> Self {
        Player {
            spawn: body.position,
            body,
            facing: Facing::Right,
            health,
            is_invincible: false,
            is_dead: false,
            jump_count: 0,
        }
    }

    /// Gameplay control is blocked while the death cutscene runs.
    pub fn accepts_input(&self) -> bool {
        !self.is_dead
    }
}

/// Collectible toast.
#[derive(Clone, Debug)]
pub struct Toast {
    pub rect: Rect,
    pub value: u32,
    pub collected: bool,
}

impl Toast {
    pub fn new(rect: Rect, value: u32) -> Self {
        Toast { rect, value, collected: false }
    }
}
