/// Plain 2D geometry shared by the domain layer.
///
/// Screen-space convention: `+x` is right, `+y` is DOWN. A body's
/// `position` is its centre on x and its bottom edge on y (feet anchored),
/// matching how sprites are placed on the ground in level data.

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
}

/// Axis-aligned rectangle (top-left + size).
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// Which sides of a body were blocked during the last physics integration.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Blocked {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Blocked {
    pub const NONE: Blocked = Blocked { left: false, right: false, up: false, down: false };
}

/// Arcade body snapshot: the capability surface the physics host exposes
/// to the behaviour code (position, velocity, collision flags).
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub position: Vec2,
    /// Position at the start of the last integration step.
    pub prev_position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub blocked: Blocked,
    /// When false the body passes through world geometry (stomped corpse).
    pub collides: bool,
}

impl Body {
    pub fn new(x: f32, bottom: f32, width: f32, height: f32) -> Self {
        let position = Vec2::new(x, bottom);
        Body {
            position,
            prev_position: position,
            velocity: Vec2::ZERO,
            size: Vec2::new(width, height),
            blocked: Blocked::NONE,
            collides: true,
        }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.size.x / 2.0
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.position.x - self.half_width()
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.position.x + self.half_width()
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position.y
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y - self.size.y
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left(), self.top(), self.size.x, self.size.y)
    }

    /// Teleport without leaving a motion trail in `prev_position`.
    pub fn place(&mut self, x: f32, bottom: f32) {
        self.position = Vec2::new(x, bottom);
        self.prev_position = self.position;
        self.velocity = Vec2::ZERO;
        self.blocked = Blocked::NONE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_edges_follow_feet_anchor() {
        let b = Body::new(100.0, 200.0, 20.0, 10.0);
        assert_eq!(b.left(), 90.0);
        assert_eq!(b.right(), 110.0);
        assert_eq!(b.bottom(), 200.0);
        assert_eq!(b.top(), 190.0);
        assert_eq!(b.rect(), Rect::new(90.0, 190.0, 20.0, 10.0));
    }

    #[test]
    fn rect_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(a.intersects(&Rect::new(9.0, 9.0, 5.0, 5.0)));
    }

    #[test]
    fn place_clears_motion() {
        let mut b = Body::new(0.0, 0.0, 4.0, 4.0);
        b.velocity = Vec2::new(5.0, -3.0);
        b.blocked.down = true;
        b.place(40.0, 16.0);
        assert_eq!(b.position, b.prev_position);
        assert_eq!(b.velocity, Vec2::ZERO);
        assert_eq!(b.blocked, Blocked::NONE);
    }
}
