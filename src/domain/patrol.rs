/// Enemy patrol: one horizontal velocity decision per enemy per tick.
///
/// Three modes, fixed at spawn:
///   1. **FixedRange**: oscillate between two x bounds, clamping on overshoot.
///   2. **GroundProbe**: walk until ground disappears ahead, a wall blocks,
///      or a bound is reached; flips are debounced.
///   3. **FixedPath**: bounce along sorted waypoint x positions, pausing
///      one tick on each arrival. A waypoint within one tick of travel
///      counts as reached and the body snaps onto it, so fast walkers
///      never hop across it.
///
/// Facing is a pure function of velocity, except that a path follower
/// keeps its facing through the arrival pause.
///
/// Position and vertical velocity belong to the physics host. This module
/// writes `velocity.x`, snaps `position.x` onto a FixedRange bound or a
/// reached FixedPath waypoint, and derives facing from the result.

use log::{debug, warn};

use super::entity::{Enemy, Facing, PatrolMode, SpawnData};
use super::geometry::{Body, Vec2};
use super::ground::GroundQuery;
use crate::config::PatrolConfig;

/// Probe distance past the leading body edge.
const PROBE_AHEAD: f32 = 2.0;
/// Probe depth below the feet.
const PROBE_BELOW: f32 = 2.0;
/// Lateral spread of the extra samples, tolerates thin / edge tiles.
const PROBE_SPREAD: f32 = 3.0;
/// Distance from a bound that already counts as "at" it.
const BOUND_MARGIN: f32 = 2.0;
/// Waypoint arrival threshold.
const ARRIVAL_DISTANCE: f32 = 2.0;
/// Below this horizontal speed the enemy is considered wedged.
const NUDGE_THRESHOLD: f32 = 1.0;

/// Per-tick inputs shared by every enemy.
#[derive(Clone, Copy, Debug)]
pub struct PatrolTick {
    pub now_ms: u64,
    /// Seconds the host will integrate before the next decision.
    pub dt: f32,
    /// Slow-motion factor, clamped to `0..=1`.
    pub time_scale: f32,
    pub reverse_cooldown_ms: u64,
}

impl PatrolTick {
    fn effective_speed(&self, speed: f32) -> f32 {
        let scale = if self.time_scale.is_finite() { self.time_scale.clamp(0.0, 1.0) } else { 1.0 };
        speed * scale
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PatrolDecision {
    pub velocity_x: f32,
    pub reversed: bool,
    /// FixedPath: waypoint index reached this tick.
    pub arrived_at: Option<usize>,
}

impl PatrolDecision {
    fn moving(velocity_x: f32, reversed: bool) -> Self {
        PatrolDecision { velocity_x, reversed, arrived_at: None }
    }
}

// ── Per-tick update ──

/// Decide this tick's horizontal velocity. `None` for stomped enemies.
pub fn update_patrol(enemy: &mut Enemy, ground: &dyn GroundQuery, tick: &PatrolTick) -> Option<PatrolDecision> {
    if !enemy.alive() { return None; }

    let speed = tick.effective_speed(enemy.speed);
    let mut decision = match &mut enemy.mode {
        PatrolMode::FixedRange { left, right } => {
            fixed_range(&mut enemy.body, *left, *right, speed)
        }
        PatrolMode::GroundProbe { left, right } => {
            let (left, right) = (*left, *right);
            ground_probe(&mut enemy.body, &mut enemy.reverse_cooldown_until_ms, left, right, ground, tick, speed)
        }
        PatrolMode::FixedPath { waypoints, index, direction } => {
            fixed_path(&mut enemy.body, waypoints, index, direction, speed, tick.dt)
        }
    };

    // Collision impulses must never push an enemy past its own speed.
    enemy.body.velocity.x = enemy.body.velocity.x.clamp(-speed, speed);
    decision.velocity_x = enemy.body.velocity.x;
    let pausing = matches!(enemy.mode, PatrolMode::FixedPath { .. }) && enemy.body.velocity.x == 0.0;
    if !pausing {
        enemy.facing = Facing::from_velocity(enemy.body.velocity.x);
    }

    if decision.reversed {
        debug!(
            "enemy {} ({}) reversed at x={:.1}, vx={:.1}",
            enemy.id, enemy.mode.name(), enemy.body.position.x, decision.velocity_x,
        );
    }
    Some(decision)
}

/// Travel direction from velocity; standing still counts as left.
fn direction_of(vx: f32) -> f32 {
    if vx > 0.0 { 1.0 } else { -1.0 }
}

/// Like `direction_of`, but a body stopped dead by a wall was heading into it.
fn heading_of(body: &Body) -> f32 {
    if body.velocity.x == 0.0 && body.blocked.right && !body.blocked.left {
        1.0
    } else {
        direction_of(body.velocity.x)
    }
}

fn fixed_range(body: &mut Body, left: f32, right: f32, speed: f32) -> PatrolDecision {
    let mut dir = direction_of(body.velocity.x);
    let mut reversed = false;

    if body.position.x <= left {
        body.position.x = left;
        if dir < 0.0 { dir = 1.0; reversed = true; }
    } else if body.position.x >= right {
        body.position.x = right;
        if dir > 0.0 { dir = -1.0; reversed = true; }
    }

    body.velocity.x = dir * speed;
    PatrolDecision::moving(body.velocity.x, reversed)
}

fn ground_probe(
    body: &mut Body,
    cooldown_until_ms: &mut u64,
    left: f32,
    right: f32,
    ground: &dyn GroundQuery,
    tick: &PatrolTick,
    speed: f32,
) -> PatrolDecision {
    let dir = heading_of(body);
    let x = body.position.x;

    let at_bound = (dir < 0.0 && x <= left + BOUND_MARGIN) || (dir > 0.0 && x >= right - BOUND_MARGIN);
    let hit_wall = (dir < 0.0 && body.blocked.left) || (dir > 0.0 && body.blocked.right);
    // Airborne enemies never flip on a missing floor.
    let edge = body.blocked.down && about_to_fall(body, ground, dir);

    let mut reversed = false;
    if (at_bound || hit_wall || edge) && tick.now_ms >= *cooldown_until_ms {
        body.velocity.x = -dir * speed;
        *cooldown_until_ms = tick.now_ms + tick.reverse_cooldown_ms;
        reversed = true;
    }

    if body.velocity.x.abs() < NUDGE_THRESHOLD {
        let nudge = if body.blocked.left {
            1.0
        } else if body.blocked.right {
            -1.0
        } else {
            dir
        };
        body.velocity.x = nudge * speed;
    }

    PatrolDecision::moving(body.velocity.x, reversed)
}

/// No ground under any of the three samples just past the leading edge.
pub fn about_to_fall(body: &Body, ground: &dyn GroundQuery, dir: f32) -> bool {
    let ahead_x = body.position.x + dir * (body.half_width() + PROBE_AHEAD);
    let below_y = body.bottom() + PROBE_BELOW;
    let offsets = [0.0, PROBE_SPREAD * dir, -PROBE_SPREAD * dir];
    !offsets.iter().any(|off| ground.has_ground_at(ahead_x + off, below_y))
}

fn fixed_path(
    body: &mut Body,
    waypoints: &[f32],
    index: &mut usize,
    direction: &mut i32,
    speed: f32,
    dt: f32,
) -> PatrolDecision {
    let len = waypoints.len() as i64;
    if len < 2 {
        body.velocity.x = 0.0;
        return PatrolDecision::moving(0.0, false);
    }

    let mut reversed = false;
    let mut next = *index as i64 + *direction as i64;
    if next < 0 || next >= len {
        *direction = -*direction;
        next = *index as i64 + *direction as i64;
        reversed = true;
    }
    let next = next.clamp(0, len - 1) as usize;

    let target = waypoints[next];
    let dx = target - body.position.x;
    let reach = (speed * dt.max(0.0)).max(ARRIVAL_DISTANCE);
    if dx.abs() <= reach {
        // One-tick pause on every arrival.
        *index = next;
        body.position.x = target;
        body.velocity.x = 0.0;
        PatrolDecision { velocity_x: 0.0, reversed, arrived_at: Some(next) }
    } else {
        body.velocity.x = dx.signum() * speed;
        PatrolDecision::moving(body.velocity.x, reversed)
    }
}

// ── Spawn-time mode selection ──

/// Speed from level data; anything but a positive finite number gets the default.
pub fn sanitize_speed(raw: Option<f32>, default: f32) -> f32 {
    match raw {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => default,
    }
}

fn positive(raw: Option<f32>) -> Option<f32> {
    raw.filter(|v| v.is_finite() && *v > 0.0)
}

fn range_around(x: f32, width: f32) -> (f32, f32) {
    (x - width / 2.0, x + width / 2.0)
}

/// Pick the patrol mode for a spawn. Missing level data degrades to a fixed range.
pub fn resolve_mode(spawn: &SpawnData, path: Option<&[Vec2]>, has_ground: bool, cfg: &PatrolConfig) -> PatrolMode {
    if let Some(name) = &spawn.path_name {
        let mut xs: Vec<f32> = path
            .unwrap_or(&[])
            .iter()
            .map(|p| p.x) // y is dropped so the enemy stays on its baseline
            .filter(|x| x.is_finite())
            .collect();
        if xs.len() >= 2 {
            xs.sort_by(|a, b| a.total_cmp(b));
            return PatrolMode::FixedPath { waypoints: xs, index: 0, direction: 1 };
        }
        warn!("patrol path '{name}' missing or shorter than 2 points; using fixed range");
        let (left, right) = range_around(spawn.x, cfg.fallback_range);
        return PatrolMode::FixedRange { left, right };
    }

    if let Some(width) = positive(spawn.patrol_width) {
        let (left, right) = range_around(spawn.x, width);
        return PatrolMode::FixedRange { left, right };
    }

    if has_ground {
        let range = positive(spawn.range).unwrap_or(cfg.default_range);
        let (left, right) = range_around(spawn.x, range);
        return PatrolMode::GroundProbe { left, right };
    }

    warn!("no ground layer for enemy at x={:.0}; using fixed range", spawn.x);
    let (left, right) = range_around(spawn.x, cfg.fallback_range);
    PatrolMode::FixedRange { left, right }
}

/// Build a live enemy from spawn data. Path followers start still,
/// everything else starts walking left.
pub fn spawn_enemy(
    id: usize,
    spawn: &SpawnData,
    path: Option<&[Vec2]>,
    has_ground: bool,
    size: Vec2,
    cfg: &PatrolConfig,
) -> Enemy {
    let speed = sanitize_speed(spawn.speed, cfg.default_speed);
    let mode = resolve_mode(spawn, path, has_ground, cfg);
    let mut body = Body::new(spawn.x, spawn.y, size.x, size.y);
    body.velocity.x = match mode {
        PatrolMode::FixedPath { .. } => 0.0,
        _ => -speed,
    };
    let kind = if spawn.kind.is_empty() { "sockroach" } else { spawn.kind.as_str() };
    debug!("spawned enemy {id} ({kind}) at x={:.0} mode={} speed={speed}", spawn.x, mode.name());
    Enemy::new(id, kind, body, speed, mode)
}
