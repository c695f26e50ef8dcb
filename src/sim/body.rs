//! Physics body shared by every moving entity
//!
//! Semi-implicit Euler with a damping term folded into acceleration. The
//! order (gravity, input, friction, integrate, wrap) fixes the terminal
//! velocity of the player and must not be rearranged.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Position / velocity / acceleration with floor contact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Mid-bottom anchor of the entity
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub on_floor: bool,
}

impl Body {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            on_floor: false,
        }
    }

    /// Start a tick: gravity first, before any horizontal term
    #[inline]
    pub fn begin_tick(&mut self) {
        self.acc = Vec2::new(0.0, GRAVITY);
    }

    /// Friction-damped integration (player and chasers)
    pub fn integrate(&mut self) {
        self.acc.x += self.vel.x * FRICTION;
        self.vel += self.acc;
        self.pos += self.vel + PLAYER_ACC * self.acc;
        self.wrap();
    }

    /// Undamped integration used by the simpler enemy variants
    pub fn integrate_frictionless(&mut self) {
        self.vel += self.acc;
        self.pos += self.vel;
        self.wrap();
    }

    /// Horizontal screen wrap; vertical bounds come from platforms only
    #[inline]
    pub fn wrap(&mut self) {
        if self.pos.x > WIDTH {
            self.pos.x = 0.0;
        }
        if self.pos.x < 0.0 {
            self.pos.x = WIDTH;
        }
    }

    /// Rest the body on a surface at `top`
    pub fn land_on(&mut self, top: f32) {
        self.pos.y = top - 1.0;
        self.vel.y = 0.0;
        self.on_floor = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_integration() {
        let mut body = Body::new(Vec2::new(100.0, 100.0));
        body.begin_tick();
        body.integrate();
        assert_eq!(body.vel.y, GRAVITY);
        // pos += vel + ACC * acc
        assert!((body.pos.y - (100.0 + GRAVITY + PLAYER_ACC * GRAVITY)).abs() < 1e-5);
    }

    #[test]
    fn test_friction_terminal_velocity() {
        // Constant input converges to acc / -FRICTION
        let mut body = Body::new(Vec2::new(100.0, 100.0));
        for _ in 0..500 {
            body.begin_tick();
            body.acc.x = PLAYER_ACC;
            body.integrate();
            body.land_on(300.0);
        }
        let terminal = PLAYER_ACC / -FRICTION;
        assert!((body.vel.x - terminal).abs() < 0.01);
    }

    #[test]
    fn test_horizontal_wrap() {
        let mut body = Body::new(Vec2::new(WIDTH - 0.1, 100.0));
        body.vel.x = 2.0;
        body.integrate_frictionless();
        assert_eq!(body.pos.x, 0.0);

        let mut body = Body::new(Vec2::new(0.1, 100.0));
        body.vel.x = -2.0;
        body.integrate_frictionless();
        assert_eq!(body.pos.x, WIDTH);
    }

    #[test]
    fn test_no_vertical_clamp() {
        let mut body = Body::new(Vec2::new(100.0, HEIGHT));
        for _ in 0..10 {
            body.begin_tick();
            body.integrate();
        }
        assert!(body.pos.y > HEIGHT);
    }
}
