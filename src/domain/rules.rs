/// Contact rules, truth-table driven.
///
/// Pure functions operating on body snapshots. No side effects.
/// These decide "what kind of contact this is" without applying it.
///
/// ## Falling
/// ┌────────────────────────────────┬──────────┐
/// │ Condition                       │ Falling? │
/// ├────────────────────────────────┼──────────┤
/// │ vertical velocity > 0           │ YES      │
/// │ prev y < current y (moved down) │ YES      │
/// │ otherwise                       │ NO       │
/// └────────────────────────────────┴──────────┘
///
/// Both signals are checked: after an impact the velocity can read zero
/// for a frame even though the body moved down across the tick.
///
/// ## Player vs live enemy
/// ┌──────────────────────────────────────────────┬─────────┐
/// │ Condition                                     │ Contact │
/// ├──────────────────────────────────────────────┼─────────┤
/// │ falling AND player bottom <= enemy top + 5    │ Stomp   │
/// │ otherwise                                     │ Hurt    │
/// └──────────────────────────────────────────────┴─────────┘

use super::geometry::Body;

/// Vertical slack for counting a landing as "on top".
pub const STOMP_TOLERANCE: f32 = 5.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Stomp,
    Hurt,
}

pub fn is_falling(body: &Body) -> bool {
    body.velocity.y > 0.0 || body.prev_position.y < body.position.y
}

pub fn classify_contact(player: &Body, enemy: &Body) -> Contact {
    if is_falling(player) && player.bottom() <= enemy.top() + STOMP_TOLERANCE {
        Contact::Stomp
    } else {
        Contact::Hurt
    }
}
