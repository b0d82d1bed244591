/// Player ↔ enemy combat and the death round trip.
///
/// Called from `step` once per overlapping live enemy per tick, and from
/// the scheduler when a delayed task comes due. Every entry point is
/// guarded by a latch, so a repeated call is a no-op, never a second
/// decrement:
///
/// ┌────────────────────────────┬──────────────────────────┐
/// │ Latch                       │ Blocks                    │
/// ├────────────────────────────┼──────────────────────────┤
/// │ enemy not Patrolling        │ second stomp / hurt       │
/// │ player.is_invincible        │ hurt within the window    │
/// │ player.is_dead              │ all contacts, second death│
/// └────────────────────────────┴──────────────────────────┘
///
/// ## Death round trip
/// ```text
/// die ──death_duration──> Respawn ──respawn_fade──> ResumeControl
///  is_dead=true            back at spawn, full health   is_dead=false
/// ```

use log::{debug, info};

use super::event::GameEvent;
use super::schedule::Task;
use super::world::WorldState;
use crate::domain::entity::EnemyState;
use crate::domain::geometry::Vec2;
use crate::domain::rules::{classify_contact, Contact};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContactOutcome {
    /// Enemy already stomped or player dead.
    Ignored,
    Stomped,
    /// Hurt contact absorbed by invincibility.
    Blocked,
    Hurt { health_left: u32 },
    Killed,
}

/// Resolve one player–enemy overlap.
pub fn resolve_contact(world: &mut WorldState, enemy_idx: usize, events: &mut Vec<GameEvent>) -> ContactOutcome {
    let Some(enemy) = world.enemies.get(enemy_idx) else { return ContactOutcome::Ignored };
    if world.player.is_dead || !enemy.alive() {
        return ContactOutcome::Ignored;
    }

    match classify_contact(&world.player.body, &enemy.body) {
        Contact::Stomp => {
            stomp_enemy(world, enemy_idx, events);
            ContactOutcome::Stomped
        }
        Contact::Hurt => hurt_player(world, events),
    }
}

fn stomp_enemy(world: &mut WorldState, idx: usize, events: &mut Vec<GameEvent>) {
    let enemy = &mut world.enemies[idx];
    enemy.state = EnemyState::Stomped;
    enemy.body.velocity = Vec2::ZERO;
    enemy.body.collides = false;
    let id = enemy.id;

    world.player.body.velocity.y = -world.combat.stomp_bounce_speed;
    world.stats.add_kill();
    events.push(GameEvent::EnemyStomped { id });
    info!("enemy {id} stomped (kills: {})", world.stats.sockroach_kills);

    if world.combat.stomp_animation_ms > 0 {
        world.scheduler.after(world.now_ms, world.combat.stomp_animation_ms, Task::StompAnimationFinished { id });
    }
}

/// Stomp animation done: puff the corpse upward and schedule its removal.
/// Only acts on an enemy that is still in the Stomped state.
pub fn on_stomp_animation_finished(world: &mut WorldState, id: usize) {
    let Some(idx) = world.enemy_index(id) else { return };
    let enemy = &mut world.enemies[idx];
    if enemy.state != EnemyState::Stomped { return; }

    enemy.state = EnemyState::Puffing;
    enemy.body.velocity.y = -world.combat.corpse_puff_speed;
    world.scheduler.after(world.now_ms, world.combat.corpse_linger_ms, Task::RemoveEnemy { id });
}

pub fn remove_enemy(world: &mut WorldState, id: usize, events: &mut Vec<GameEvent>) {
    let Some(idx) = world.enemy_index(id) else { return };
    let enemy = &mut world.enemies[idx];
    if !enemy.present() { return; }
    enemy.state = EnemyState::Removed;
    events.push(GameEvent::EnemyRemoved { id });
    debug!("enemy {id} removed");
}

/// Take one hit. Invincibility swallows the contact entirely.
pub fn hurt_player(world: &mut WorldState, events: &mut Vec<GameEvent>) -> ContactOutcome {
    if world.player.is_dead {
        return ContactOutcome::Ignored;
    }
    if world.player.is_invincible {
        return ContactOutcome::Blocked;
    }

    let health = world.player.health.saturating_sub(1);
    world.player.health = health;
    world.stats.add_life_lost();
    events.push(GameEvent::PlayerHurt { health });
    info!("player hurt, health {health}");

    world.player.is_invincible = true;
    if let Some(old) = world.invincibility.take() {
        world.scheduler.cancel(old);
    }
    world.invincibility = Some(world.scheduler.after(world.now_ms, world.combat.invincibility_ms, Task::EndInvincibility));

    if health == 0 {
        player_die(world, events);
        ContactOutcome::Killed
    } else {
        ContactOutcome::Hurt { health_left: health }
    }
}

pub fn end_invincibility(world: &mut WorldState) {
    world.player.is_invincible = false;
    world.invincibility = None;
}

/// Start the death round trip. Returns false if already dead.
pub fn player_die(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if world.player.is_dead {
        return false;
    }
    world.player.is_dead = true;
    world.player.body.velocity = Vec2::ZERO;
    world.timer.stop(world.now_ms);
    events.push(GameEvent::PlayerDied);
    info!("player died at {:.2}s", world.elapsed_secs());

    world.scheduler.after(world.now_ms, world.combat.death_duration_ms, Task::Respawn);
    true
}

/// Back at spawn with full health. Control stays locked until `resume_control`.
pub fn respawn(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.player.is_dead { return; }

    let spawn = world.player.spawn;
    world.player.body.place(spawn.x, spawn.y);
    world.player.health = world.combat.max_health;
    world.player.is_invincible = false;
    world.player.jump_count = 0;
    if let Some(token) = world.invincibility.take() {
        world.scheduler.cancel(token);
    }
    events.push(GameEvent::PlayerRespawned);
    info!("player respawned");

    world.scheduler.after(world.now_ms, world.combat.respawn_fade_ms, Task::ResumeControl);
}

pub fn resume_control(world: &mut WorldState) {
    world.player.is_dead = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::level::{load_level, parse_level};

    /// Player and one enemy side by side on flat ground.
    fn arena() -> WorldState {
        let def = parse_level("# Arena\n          \n P  E    \n##########\n").unwrap();
        let mut world = WorldState::new(&GameConfig::default());
        load_level(&mut world, &def);
        world
    }

    /// Put the player's feet just above the enemy's head, falling.
    fn line_up_stomp(world: &mut WorldState) {
        let top = world.enemies[0].body.top();
        let x = world.enemies[0].body.position.x;
        world.player.body.place(x, top + 2.0);
        world.player.body.velocity.y = 150.0;
    }

    fn hurt_at(world: &mut WorldState, now_ms: u64, events: &mut Vec<GameEvent>) -> ContactOutcome {
        world.now_ms = now_ms;
        hurt_player(world, events)
    }

    #[test]
    fn stomp_kills_enemy_and_bounces_player() {
        let mut w = arena();
        line_up_stomp(&mut w);
        let mut ev = vec![];
        assert_eq!(resolve_contact(&mut w, 0, &mut ev), ContactOutcome::Stomped);
        assert_eq!(ev, vec![GameEvent::EnemyStomped { id: 0 }]);
        let e = &w.enemies[0];
        assert_eq!(e.state, EnemyState::Stomped);
        assert_eq!(e.body.velocity, Vec2::ZERO);
        assert!(!e.body.collides);
        assert_eq!(w.player.body.velocity.y, -300.0);
        assert_eq!(w.stats.sockroach_kills, 1);
        assert_eq!(w.player.health, 3);
    }

    #[test]
    fn second_contact_with_stomped_enemy_is_ignored() {
        let mut w = arena();
        line_up_stomp(&mut w);
        let mut ev = vec![];
        resolve_contact(&mut w, 0, &mut ev);
        line_up_stomp(&mut w);
        assert_eq!(resolve_contact(&mut w, 0, &mut ev), ContactOutcome::Ignored);
        assert_eq!(w.stats.sockroach_kills, 1);
        assert_eq!(ev.len(), 1);
    }

    #[test]
    fn side_contact_hurts() {
        let mut w = arena();
        let mut ev = vec![];
        assert_eq!(resolve_contact(&mut w, 0, &mut ev), ContactOutcome::Hurt { health_left: 2 });
        assert_eq!(ev, vec![GameEvent::PlayerHurt { health: 2 }]);
        assert!(w.player.is_invincible);
        assert_eq!(w.stats.lives_lost, 1);
    }

    #[test]
    fn invincibility_swallows_hits_inside_the_window() {
        let mut w = arena();
        let mut ev = vec![];
        assert_eq!(hurt_at(&mut w, 100, &mut ev), ContactOutcome::Hurt { health_left: 2 });
        assert_eq!(hurt_at(&mut w, 900, &mut ev), ContactOutcome::Blocked);
        assert_eq!(w.player.health, 2);
        assert_eq!(w.stats.lives_lost, 1);

        // Expiry fires 1000ms after the hit.
        assert!(w.scheduler.drain_due(1099).is_empty());
        assert_eq!(w.scheduler.drain_due(1100), vec![Task::EndInvincibility]);
    }

    #[test]
    fn three_hits_die_exactly_once() {
        let mut w = arena();
        let mut ev = vec![];
        for now in [0, 2_000, 4_000] {
            hurt_at(&mut w, now, &mut ev);
            end_invincibility(&mut w);
        }
        assert_eq!(w.player.health, 0);
        assert!(w.player.is_dead);
        assert_eq!(hurt_at(&mut w, 6_000, &mut ev), ContactOutcome::Ignored);
        assert!(!player_die(&mut w, &mut ev));
        let deaths = ev.iter().filter(|e| **e == GameEvent::PlayerDied).count();
        assert_eq!(deaths, 1);
        assert_eq!(w.stats.lives_lost, 3);
    }

    #[test]
    fn death_stops_the_timer() {
        let mut w = arena();
        w.timer.start(0);
        w.now_ms = 3_000;
        player_die(&mut w, &mut vec![]);
        assert_eq!(w.timer.elapsed_ms(10_000), 3_000);
    }

    #[test]
    fn respawn_restores_player_but_keeps_control_locked() {
        let mut w = arena();
        let spawn = w.player.spawn;
        let mut ev = vec![];
        w.player.body.place(100.0, 20.0);
        w.player.health = 0;
        player_die(&mut w, &mut ev);

        respawn(&mut w, &mut ev);
        assert_eq!(w.player.body.position, spawn);
        assert_eq!(w.player.health, 3);
        assert!(!w.player.is_invincible);
        assert!(w.player.is_dead);
        assert!(ev.contains(&GameEvent::PlayerRespawned));

        resume_control(&mut w);
        assert!(w.player.accepts_input());
    }

    #[test]
    fn respawn_cancels_pending_invincibility_expiry() {
        let mut w = arena();
        let mut ev = vec![];
        w.player.health = 1;
        hurt_player(&mut w, &mut ev);
        let token = w.invincibility.unwrap();
        respawn(&mut w, &mut ev);
        assert!(!w.scheduler.is_pending(token));
        assert!(w.invincibility.is_none());
    }

    #[test]
    fn corpse_puffs_then_is_removed() {
        let mut w = arena();
        line_up_stomp(&mut w);
        let mut ev = vec![];
        resolve_contact(&mut w, 0, &mut ev);

        on_stomp_animation_finished(&mut w, 0);
        assert_eq!(w.enemies[0].state, EnemyState::Puffing);
        assert_eq!(w.enemies[0].body.velocity.y, -200.0);

        // A late duplicate signal does nothing.
        on_stomp_animation_finished(&mut w, 0);
        assert_eq!(w.enemies[0].state, EnemyState::Puffing);

        remove_enemy(&mut w, 0, &mut ev);
        remove_enemy(&mut w, 0, &mut ev);
        assert_eq!(w.enemies[0].state, EnemyState::Removed);
        assert_eq!(ev.iter().filter(|e| **e == GameEvent::EnemyRemoved { id: 0 }).count(), 1);
    }

    #[test]
    fn dead_player_ignores_contacts() {
        let mut w = arena();
        w.player.is_dead = true;
        assert_eq!(resolve_contact(&mut w, 0, &mut vec![]), ContactOutcome::Ignored);
        assert_eq!(w.player.health, 3);
    }
}
