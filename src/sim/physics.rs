/// Arcade integrator standing in for the host engine's physics.
///
/// The patrol and combat code only read what this produces: positions,
/// velocities, and the per-side `blocked` flags. Axis-separated moves
/// (x first, then y) against the solid tiles, then a clamp to the world
/// bounds. Flags are cleared at the start of every integration, so they
/// always describe the most recent move.
///
/// Bodies with `collides == false` (stomped corpses) ignore tiles and
/// world bounds entirely.

use crate::domain::geometry::{Blocked, Body, Rect};
use crate::domain::ground::TileGround;

/// Shrinks every overlap test so touching edges don't count as contact.
const SKIN: f32 = 0.01;

#[derive(Clone, Copy, Debug)]
pub struct Integration {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub dt: f32,
}

pub fn integrate(body: &mut Body, ground: &TileGround, bounds: Rect, params: &Integration) {
    body.prev_position = body.position;
    body.blocked = Blocked::NONE;
    body.velocity.y = (body.velocity.y + params.gravity * params.dt).min(params.max_fall_speed);

    if !body.collides {
        body.position.x += body.velocity.x * params.dt;
        body.position.y += body.velocity.y * params.dt;
        return;
    }

    move_x(body, ground, body.velocity.x * params.dt);
    move_y(body, ground, body.velocity.y * params.dt);
    clamp_to_bounds(body, bounds);
}

/// Does the box (minus skin) touch any solid tile?
fn overlaps_solid(ground: &TileGround, left: f32, top: f32, right: f32, bottom: f32) -> bool {
    let ts = ground.tile_size;
    let c0 = ((left + SKIN) / ts).floor() as i64;
    let c1 = ((right - SKIN) / ts).floor() as i64;
    let r0 = ((top + SKIN) / ts).floor() as i64;
    let r1 = ((bottom - SKIN) / ts).floor() as i64;

    for r in r0.max(0)..=r1 {
        for c in c0.max(0)..=c1 {
            if ground.tile_at(c as usize, r as usize).is_solid() {
                return true;
            }
        }
    }
    false
}

fn move_x(body: &mut Body, ground: &TileGround, dx: f32) {
    if dx == 0.0 { return; }
    let hw = body.half_width();
    let ts = ground.tile_size;
    let new_x = body.position.x + dx;

    if !overlaps_solid(ground, new_x - hw, body.top(), new_x + hw, body.bottom()) {
        body.position.x = new_x;
        return;
    }

    if dx > 0.0 {
        let col = ((new_x + hw - SKIN) / ts).floor();
        body.position.x = col * ts - hw;
        body.blocked.right = true;
    } else {
        let col = ((new_x - hw + SKIN) / ts).floor();
        body.position.x = (col + 1.0) * ts + hw;
        body.blocked.left = true;
    }
    body.velocity.x = 0.0;
}

fn move_y(body: &mut Body, ground: &TileGround, dy: f32) {
    if dy == 0.0 { return; }
    let h = body.size.y;
    let ts = ground.tile_size;
    let new_y = body.position.y + dy;

    if !overlaps_solid(ground, body.left(), new_y - h, body.right(), new_y) {
        body.position.y = new_y;
        return;
    }

    if dy > 0.0 {
        // Land on top of the row the feet entered.
        let row = ((new_y - SKIN) / ts).floor();
        body.position.y = row * ts;
        body.blocked.down = true;
    } else {
        let row = ((new_y - h + SKIN) / ts).floor();
        body.position.y = (row + 1.0) * ts + h;
        body.blocked.up = true;
    }
    body.velocity.y = 0.0;
}

fn clamp_to_bounds(body: &mut Body, bounds: Rect) {
    let hw = body.half_width();
    if body.left() < bounds.x {
        body.position.x = bounds.x + hw;
        body.velocity.x = body.velocity.x.max(0.0);
        body.blocked.left = true;
    } else if body.right() > bounds.x + bounds.w {
        body.position.x = bounds.x + bounds.w - hw;
        body.velocity.x = body.velocity.x.min(0.0);
        body.blocked.right = true;
    }
    if body.bottom() > bounds.y + bounds.h {
        body.position.y = bounds.y + bounds.h;
        body.velocity.y = body.velocity.y.min(0.0);
        body.blocked.down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ground::ground_from_rows;

    const PARAMS: Integration = Integration { gravity: 1000.0, max_fall_speed: 900.0, dt: 0.016 };

    fn room() -> TileGround {
        ground_from_rows(&[
            "          ",
            "          ",
            "#        #",
            "##########",
        ], 16.0)
    }

    fn bounds(g: &TileGround) -> Rect {
        Rect::new(0.0, 0.0, g.width_px(), g.height_px())
    }

    #[test]
    fn falling_body_lands_on_floor() {
        let g = room();
        let mut b = Body::new(80.0, 10.0, 12.0, 12.0);
        for _ in 0..120 {
            integrate(&mut b, &g, bounds(&g), &PARAMS);
        }
        assert_eq!(b.bottom(), 48.0);
        assert!(b.blocked.down);
        assert_eq!(b.velocity.y, 0.0);
    }

    #[test]
    fn walking_into_wall_sets_side_flag() {
        let g = room();
        let mut b = Body::new(130.0, 48.0, 12.0, 12.0);
        b.velocity.x = 160.0;
        for _ in 0..30 {
            b.velocity.x = 160.0;
            integrate(&mut b, &g, bounds(&g), &PARAMS);
        }
        assert!(b.blocked.right);
        assert_eq!(b.right(), 144.0);
        assert!(b.blocked.down);
    }

    #[test]
    fn prev_position_is_start_of_step() {
        let g = room();
        let mut b = Body::new(80.0, 10.0, 12.0, 12.0);
        b.velocity.y = 100.0;
        integrate(&mut b, &g, bounds(&g), &PARAMS);
        assert_eq!(b.prev_position.y, 10.0);
        assert!(b.position.y > 10.0);
    }

    #[test]
    fn non_colliding_body_falls_through() {
        let g = room();
        let mut b = Body::new(80.0, 48.0, 12.0, 12.0);
        b.collides = false;
        for _ in 0..10 {
            integrate(&mut b, &g, bounds(&g), &PARAMS);
        }
        assert!(b.bottom() > 48.0);
        assert_eq!(b.blocked, Blocked::NONE);
    }

    #[test]
    fn world_edge_blocks() {
        let g = ground_from_rows(&["    ", "####"], 16.0);
        let mut b = Body::new(8.0, 16.0, 12.0, 12.0);
        b.velocity.x = -160.0;
        integrate(&mut b, &g, bounds(&g), &PARAMS);
        assert!(b.blocked.left);
        assert_eq!(b.left(), 0.0);
    }
}
