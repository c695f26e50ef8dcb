//! Enemy variants and shooter projectiles
//!
//! Every variant shares a [`Body`]; behavior differs by a closed tag. The
//! physics `update` and the player-reactive `chase` hook are separate calls
//! so the resolver can run them in a fixed order.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::rect::Rect;
use crate::consts::*;

pub const CHASE_SPEED: f32 = 1.4;
pub const CHASER_JUMP_STRENGTH: f32 = 10.0;
/// Player must be this much higher before a chaser jumps
pub const CHASER_JUMP_TRIGGER: f32 = 40.0;

pub const PATROL_SPEED: f32 = 0.8;
pub const PATROL_RANGE: f32 = 150.0;

pub const JUMPER_IMPULSE: f32 = -8.0;
pub const JUMPER_MIN_INTERVAL: u32 = ticks_from_millis(600);
pub const JUMPER_MAX_INTERVAL: u32 = ticks_from_millis(1200);
/// Per-tick chance of a random horizontal nudge
pub const JUMPER_NUDGE_CHANCE: f64 = 0.01;

pub const SHOOT_INTERVAL: u32 = ticks_from_millis(1200);
pub const SHOOT_RANGE: f32 = 200.0;
pub const PROJECTILE_SPEED: f32 = 3.0;
pub const PROJECTILE_LIFETIME: u32 = ticks_from_millis(1800);
pub const PROJECTILE_SIZE: f32 = 8.0;

/// Enemy variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Chaser,
    Patrol,
    Jumper,
    Shooter,
}

impl EnemyKind {
    /// Square sprite edge length
    pub fn size(&self) -> f32 {
        match self {
            EnemyKind::Chaser => 32.0,
            EnemyKind::Patrol => 40.0,
            EnemyKind::Jumper => 35.0,
            EnemyKind::Shooter => 45.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Chaser => "chaser",
            EnemyKind::Patrol => "patrol",
            EnemyKind::Jumper => "jumper",
            EnemyKind::Shooter => "shooter",
        }
    }

    /// Variants eligible at a level; the set only widens as level grows
    pub fn eligible(level: u32) -> &'static [EnemyKind] {
        const ALL: [EnemyKind; 4] = [
            EnemyKind::Chaser,
            EnemyKind::Patrol,
            EnemyKind::Jumper,
            EnemyKind::Shooter,
        ];
        match level {
            0..=1 => &ALL[..1],
            2..=3 => &ALL[..2],
            4..=5 => &ALL[..3],
            _ => &ALL,
        }
    }
}

/// Difficulty-gated random variant choice
pub fn select_variant(level: u32, rng: &mut Pcg32) -> EnemyKind {
    EnemyKind::eligible(level)
        .choose(rng)
        .copied()
        .unwrap_or(EnemyKind::Chaser)
}

/// A straight-line shot fired by a shooter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    pub lifetime: u32,
}

impl Projectile {
    pub fn new(origin: Vec2, direction: Vec2) -> Self {
        Self {
            pos: origin,
            vel: direction * PROJECTILE_SPEED,
            lifetime: PROJECTILE_LIFETIME,
        }
    }

    pub fn update(&mut self) {
        self.pos += self.vel;
        self.lifetime = self.lifetime.saturating_sub(1);
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, PROJECTILE_SIZE, PROJECTILE_SIZE)
    }

    pub fn in_bounds(&self) -> bool {
        (0.0..=WIDTH).contains(&self.pos.x) && (0.0..=HEIGHT).contains(&self.pos.y)
    }

    pub fn is_alive(&self) -> bool {
        self.lifetime > 0 && self.in_bounds()
    }
}

/// Variant-specific state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Chaser {
        speed: f32,
    },
    Patrol {
        origin_x: f32,
        range: f32,
        speed: f32,
        /// +1.0 right, -1.0 left
        direction: f32,
    },
    Jumper {
        interval: u32,
        timer: u32,
    },
    Shooter {
        interval: u32,
        timer: u32,
        range: f32,
        /// Last known player center
        target: Vec2,
        projectiles: Vec<Projectile>,
    },
}

/// An enemy in the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub behavior: Behavior,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, rng: &mut Pcg32) -> Self {
        let behavior = match kind {
            EnemyKind::Chaser => Behavior::Chaser { speed: CHASE_SPEED },
            EnemyKind::Patrol => Behavior::Patrol {
                origin_x: pos.x,
                range: PATROL_RANGE,
                speed: PATROL_SPEED,
                direction: 1.0,
            },
            EnemyKind::Jumper => Behavior::Jumper {
                interval: roll_jump_interval(rng),
                timer: 0,
            },
            EnemyKind::Shooter => Behavior::Shooter {
                interval: SHOOT_INTERVAL,
                timer: 0,
                range: SHOOT_RANGE,
                target: Vec2::ZERO,
                projectiles: Vec::new(),
            },
        };
        Self {
            id,
            kind,
            body: Body::new(pos),
            behavior,
        }
    }

    pub fn rect(&self) -> Rect {
        let size = self.kind.size();
        Rect::from_midbottom(self.body.pos, size, size)
    }

    /// Projectiles owned by this enemy (empty for non-shooters)
    pub fn projectiles(&self) -> &[Projectile] {
        match &self.behavior {
            Behavior::Shooter { projectiles, .. } => projectiles,
            _ => &[],
        }
    }

    pub fn projectiles_mut(&mut self) -> Option<&mut Vec<Projectile>> {
        match &mut self.behavior {
            Behavior::Shooter { projectiles, .. } => Some(projectiles),
            _ => None,
        }
    }

    /// Physics and self-driven behavior for one tick
    pub fn update(&mut self, rng: &mut Pcg32) {
        self.body.begin_tick();

        match &mut self.behavior {
            Behavior::Chaser { .. } => {
                self.body.integrate();
            }
            Behavior::Patrol {
                origin_x,
                range,
                speed,
                direction,
            } => {
                if (self.body.pos.x - *origin_x).abs() > *range {
                    *direction = -*direction;
                }
                self.body.vel.x = *speed * *direction;
                self.body.integrate_frictionless();
            }
            Behavior::Jumper { interval, timer } => {
                *timer += 1;
                if *timer >= *interval && self.body.on_floor {
                    self.body.vel.y = JUMPER_IMPULSE;
                    self.body.on_floor = false;
                    *timer = 0;
                    *interval = roll_jump_interval(rng);
                }
                if rng.random_bool(JUMPER_NUDGE_CHANCE) {
                    self.body.vel.x = rng.random_range(-1.0..=1.0);
                }
                self.body.integrate_frictionless();
            }
            Behavior::Shooter {
                timer, projectiles, ..
            } => {
                *timer += 1;
                for projectile in projectiles.iter_mut() {
                    projectile.update();
                }
                projectiles.retain(Projectile::is_alive);
                self.body.integrate_frictionless();
            }
        }
    }

    /// React to the player; returns true when a projectile was fired
    pub fn chase(&mut self, player: Rect) -> bool {
        let origin = self.rect().center();
        match &mut self.behavior {
            Behavior::Chaser { speed } => {
                let target_x = player.center_x();
                if target_x < self.body.pos.x {
                    self.body.vel.x = -*speed;
                } else if target_x > self.body.pos.x {
                    self.body.vel.x = *speed;
                }
                if player.bottom() < self.body.pos.y - CHASER_JUMP_TRIGGER && self.body.on_floor {
                    self.body.vel.y = -CHASER_JUMP_STRENGTH;
                    self.body.on_floor = false;
                }
                false
            }
            Behavior::Shooter {
                interval,
                timer,
                range,
                target,
                projectiles,
            } => {
                *target = player.center();
                if *timer >= *interval && (target.x - self.body.pos.x).abs() < *range {
                    if let Some(direction) = (*target - origin).try_normalize() {
                        projectiles.push(Projectile::new(origin, direction));
                        *timer = 0;
                        return true;
                    }
                }
                false
            }
            Behavior::Patrol { .. } | Behavior::Jumper { .. } => false,
        }
    }

    /// Whether this variant has a chase hook at all
    pub fn reacts_to_player(&self) -> bool {
        matches!(self.kind, EnemyKind::Chaser | EnemyKind::Shooter)
    }
}

fn roll_jump_interval(rng: &mut Pcg32) -> u32 {
    rng.random_range(JUMPER_MIN_INTERVAL..=JUMPER_MAX_INTERVAL)
}
