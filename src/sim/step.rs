/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Clock advance + due scheduled tasks
///   2. Run timer gating (first control input starts it)
///   3. Player control (locked while dead)
///   4. Physics integration (player → enemies)
///   5. Patrol decisions (read this tick's blocked flags)
///   6. Player ↔ enemy contacts
///   7. Toast pickup
///   8. Goal + confirm → level completion
///   9. Timer tick
///
/// Patrol reads the blocked flags integration just produced; the velocity
/// it picks only moves the body on the next tick.

use log::{debug, info};

use crate::domain::entity::{EnemyState, Facing, FrameInput};
use crate::domain::ground::{GroundQuery, NoGround};
use crate::domain::patrol::{self, PatrolTick};
use super::combat;
use super::event::GameEvent;
use super::level;
use super::physics::{self, Integration};
use super::schedule::Task;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;
    world.now_ms += world.physics.tick_rate_ms;

    resolve_scheduled(world, &mut events);
    resolve_timer_start(world, input, &mut events);
    resolve_player_control(world, input);
    resolve_physics(world);
    resolve_patrol(world);
    resolve_contacts(world, &mut events);
    resolve_toast_pickup(world, &mut events);
    resolve_goal(world, input, &mut events);

    if world.timer.is_running() {
        events.push(GameEvent::TimerTick { elapsed_secs: world.elapsed_secs() });
    }
    if world.session.debug.enabled && world.session.debug.show_state {
        log_state(world);
    }

    events
}

/// Reload the current level from its definition. Everything pending from
/// the previous attempt is torn down with the scheduler.
pub fn restart_level(world: &mut WorldState) {
    let def = world.level.clone();
    level::load_level(world, &def);
    info!("restarted level '{}'", world.level_name);
}

// ══════════════════════════════════════════════════════════════
// Scheduled tasks
// ══════════════════════════════════════════════════════════════

fn resolve_scheduled(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for task in world.scheduler.drain_due(world.now_ms) {
        match task {
            Task::EndInvincibility => combat::end_invincibility(world),
            Task::StompAnimationFinished { id } => combat::on_stomp_animation_finished(world, id),
            Task::RemoveEnemy { id } => combat::remove_enemy(world, id, events),
            Task::Respawn => combat::respawn(world, events),
            Task::ResumeControl => combat::resume_control(world),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Timer + player control
// ══════════════════════════════════════════════════════════════

fn resolve_timer_start(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    if !input.has_control() || !world.player.accepts_input() { return; }
    if world.timer.start(world.now_ms) {
        events.push(GameEvent::TimerStarted);
        debug!("run timer started at tick {}", world.tick);
    }
}

/// `jump` is a press, not a hold: every tick it is set spends a jump.
fn resolve_player_control(world: &mut WorldState, input: FrameInput) {
    if !world.player.accepts_input() { return; }
    let cfg = &world.physics;
    let p = &mut world.player;

    p.body.velocity.x = match (input.left, input.right) {
        (true, false) => -cfg.player_speed,
        (false, true) => cfg.player_speed,
        _ => 0.0,
    };
    // The player keeps the last facing while idle.
    if p.body.velocity.x != 0.0 {
        p.facing = Facing::from_velocity(p.body.velocity.x);
    }

    if p.body.blocked.down {
        p.jump_count = 0;
    }
    if input.jump && p.jump_count < cfg.max_jumps {
        p.body.velocity.y = -cfg.jump_speed;
        p.jump_count += 1;
    }
}

// ══════════════════════════════════════════════════════════════
// Physics + patrol
// ══════════════════════════════════════════════════════════════

fn resolve_physics(world: &mut WorldState) {
    let params = Integration {
        gravity: world.physics.gravity,
        max_fall_speed: world.physics.max_fall_speed,
        dt: world.physics.tick_rate_ms as f32 / 1000.0,
    };
    physics::integrate(&mut world.player.body, &world.ground, world.bounds, &params);

    for enemy in world.enemies.iter_mut() {
        // Stomped enemies hold still for their animation.
        if matches!(enemy.state, EnemyState::Patrolling | EnemyState::Puffing) {
            physics::integrate(&mut enemy.body, &world.ground, world.bounds, &params);
        }
    }
}

fn resolve_patrol(world: &mut WorldState) {
    let tick = PatrolTick {
        now_ms: world.now_ms,
        dt: world.physics.tick_rate_ms as f32 / 1000.0,
        time_scale: world.patrol.time_scale,
        reverse_cooldown_ms: world.patrol.reverse_cooldown_ms,
    };
    let ground: &dyn GroundQuery = if world.ground.has_any_solid() { &world.ground } else { &NoGround };

    for enemy in world.enemies.iter_mut() {
        patrol::update_patrol(enemy, ground, &tick);
    }
}

// ══════════════════════════════════════════════════════════════
// Contacts
// ══════════════════════════════════════════════════════════════

/// Each live enemy overlapping the player is resolved at most once per tick.
fn resolve_contacts(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for i in 0..world.enemies.len() {
        if world.player.is_dead { return; }
        let enemy = &world.enemies[i];
        if !enemy.alive() { continue; }
        if !enemy.body.rect().intersects(&world.player.body.rect()) { continue; }
        combat::resolve_contact(world, i, events);
    }
}

fn resolve_toast_pickup(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player.is_dead { return; }
    let player_rect = world.player.body.rect();

    for toast in world.toasts.iter_mut() {
        if toast.collected || !toast.rect.intersects(&player_rect) { continue; }
        toast.collected = true;
        world.stats.add_toast(f64::from(toast.value));
        events.push(GameEvent::ToastCollected { value: toast.value, total: world.stats.toast_count });
    }
}

// ══════════════════════════════════════════════════════════════
// Level completion
// ══════════════════════════════════════════════════════════════

/// Standing in the goal is not enough; completion needs an explicit confirm.
fn resolve_goal(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    if !input.confirm || world.player.is_dead { return; }
    let Some(goal) = world.goal else { return };
    if !goal.intersects(&world.player.body.rect()) { return; }

    world.timer.stop(world.now_ms);
    let result = world.stats.finish(world.elapsed_secs());
    world.result = Some(result);
    world.phase = Phase::Complete;
    events.push(GameEvent::LevelCompleted(result));
    info!(
        "level '{}' complete: raw {:.2}s, final {:.2}s ({} toasts, {} kills, {} lives lost)",
        world.level_name, result.raw_time, result.final_time,
        result.toast_count, result.sockroach_kills, result.lives_lost,
    );
}

fn log_state(world: &WorldState) {
    let p = &world.player;
    debug!(
        "tick {} player ({:.1},{:.1}) v=({:.1},{:.1}) hp={} inv={} dead={}",
        world.tick, p.body.position.x, p.body.position.y,
        p.body.velocity.x, p.body.velocity.y, p.health, p.is_invincible, p.is_dead,
    );
    for e in world.enemies.iter().filter(|e| e.present()) {
        debug!(
            "  enemy {} {:?} {} x={:.1} vx={:.1} blocked={:?}",
            e.id, e.state, e.mode.name(), e.body.position.x, e.body.velocity.x, e.body.blocked,
        );
    }
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════
