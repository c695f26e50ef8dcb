//! Visual feedback: particles, screen shake and floating text
//!
//! Pure presentation. The layer reads simulation events after each tick and
//! never writes back into the simulation. It has its own RNG so enabling or
//! disabling effects cannot change gameplay.

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::ticks_from_millis;
use crate::settings::Settings;
use crate::sim::{DamageSource, GameEvent, PowerUpKind};

pub type Color = [u8; 3];

pub const PARTICLE_GRAVITY: f32 = 0.1;
pub const FLOATING_TEXT_TICKS: u32 = ticks_from_millis(2000);
pub const FLOATING_TEXT_RISE: f32 = 1.0;
/// Shake applied with every explosion
pub const EXPLOSION_SHAKE: (i32, u32) = (5, 10);

pub const RED: Color = [255, 0, 0];
pub const ORANGE: Color = [255, 100, 0];
pub const GREEN: Color = [0, 255, 0];
pub const GOLD: Color = [255, 215, 0];
pub const WHITE: Color = [255, 255, 255];
const DUST: [Color; 4] = [
    [222, 184, 135],
    [210, 180, 140],
    [245, 245, 220],
    [255, 228, 196],
];

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub size: f32,
    pub life: u32,
    pub max_life: u32,
}

impl Particle {
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += PARTICLE_GRAVITY;
        self.life = self.life.saturating_sub(1);
    }

    /// 1.0 at birth, 0.0 at death
    pub fn fade(&self) -> f32 {
        if self.max_life == 0 {
            return 0.0;
        }
        self.life as f32 / self.max_life as f32
    }

    /// Size shrinks with remaining life, never below one pixel
    pub fn current_size(&self) -> f32 {
        (self.size * self.fade()).max(1.0)
    }
}

/// Bounded particle pool
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    pub particles: Vec<Particle>,
    pub capacity: usize,
}

impl ParticleSystem {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::new(),
            capacity,
        }
    }

    fn push(&mut self, particle: Particle) {
        if self.particles.len() < self.capacity {
            self.particles.push(particle);
        }
    }

    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.update();
        }
        self.particles.retain(|p| p.life > 0);
    }

    pub fn explosion(&mut self, rng: &mut Pcg32, at: Vec2, color: Color, count: usize) {
        for _ in 0..count {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(2.0..=8.0);
            let life = rng.random_range(30..=60);
            self.push(Particle {
                pos: at,
                vel: Vec2::from_angle(angle) * speed,
                color,
                size: rng.random_range(2..=5) as f32,
                life,
                max_life: life,
            });
        }
    }

    /// Small burst biased upward
    pub fn collectible(&mut self, rng: &mut Pcg32, at: Vec2, color: Color) {
        for _ in 0..5 {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(1.0..=4.0);
            let life = rng.random_range(20..=40);
            self.push(Particle {
                pos: at,
                vel: Vec2::new(angle.cos() * speed, angle.sin() * speed - 2.0),
                color,
                size: rng.random_range(1..=3) as f32,
                life,
                max_life: life,
            });
        }
    }

    /// Dust puff plus a few white sparkles
    pub fn landing_dust(&mut self, rng: &mut Pcg32, at: Vec2, direction: f32) {
        for _ in 0..8 {
            let life = rng.random_range(25..=40);
            self.push(Particle {
                pos: at,
                vel: Vec2::new(
                    rng.random_range(-3.0..=3.0) + direction,
                    rng.random_range(-2.0..=0.5),
                ),
                color: DUST.choose(rng).copied().unwrap_or(WHITE),
                size: rng.random_range(2..=4) as f32,
                life,
                max_life: life,
            });
        }
        for _ in 0..3 {
            let life = rng.random_range(20..=30);
            self.push(Particle {
                pos: at,
                vel: Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-3.0..=-1.0)),
                color: WHITE,
                size: rng.random_range(1..=2) as f32,
                life,
                max_life: life,
            });
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenShake {
    pub intensity: i32,
    pub duration: u32,
    pub offset: Vec2,
}

impl ScreenShake {
    pub fn start(&mut self, intensity: i32, duration: u32) {
        self.intensity = intensity;
        self.duration = duration;
    }

    pub fn update(&mut self, rng: &mut Pcg32) {
        if self.duration > 0 {
            self.duration -= 1;
            let i = self.intensity;
            self.offset = Vec2::new(
                rng.random_range(-i..=i) as f32,
                rng.random_range(-i..=i) as f32,
            );
            self.intensity = (self.intensity - 1).max(0);
        } else {
            self.offset = Vec2::ZERO;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub color: Color,
    pub life: u32,
}

impl FloatingText {
    pub fn alpha(&self) -> f32 {
        self.life as f32 / FLOATING_TEXT_TICKS as f32
    }
}

/// Everything the renderer overlays on top of the world
#[derive(Debug, Clone)]
pub struct EffectsLayer {
    pub particles: ParticleSystem,
    pub shake: ScreenShake,
    pub texts: Vec<FloatingText>,
    shake_enabled: bool,
    rng: Pcg32,
}

impl EffectsLayer {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self {
            particles: ParticleSystem::new(settings.particle_budget()),
            shake: ScreenShake::default(),
            texts: Vec::new(),
            shake_enabled: settings.shake_enabled(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.particles.capacity = settings.particle_budget();
        self.particles.particles.truncate(self.particles.capacity);
        self.shake_enabled = settings.shake_enabled();
    }

    pub fn add_text(&mut self, pos: Vec2, text: impl Into<String>, color: Color) {
        self.texts.push(FloatingText {
            pos,
            text: text.into(),
            color,
            life: FLOATING_TEXT_TICKS,
        });
    }

    pub fn explosion(&mut self, at: Vec2, color: Color) {
        self.particles.explosion(&mut self.rng, at, color, 10);
        if self.shake_enabled {
            self.shake.start(EXPLOSION_SHAKE.0, EXPLOSION_SHAKE.1);
        }
    }

    /// Translate one tick's events into effects
    pub fn consume(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::Landed { pos, vel_x } => {
                    self.particles.landing_dust(&mut self.rng, pos, vel_x * 0.5);
                }
                GameEvent::Damaged { pos, source, .. } => match source {
                    DamageSource::Enemy => {
                        self.explosion(pos, RED);
                        self.add_text(pos - Vec2::new(0.0, 20.0), "OUCH!", RED);
                    }
                    DamageSource::Projectile => self.explosion(pos, ORANGE),
                },
                GameEvent::Collected { kind, pos } => {
                    let color = match kind {
                        PowerUpKind::Coin { .. } => GOLD,
                        _ => WHITE,
                    };
                    self.particles.collectible(&mut self.rng, pos, color);
                    self.add_text(pos - Vec2::new(0.0, 20.0), kind.pickup_text(), color);
                }
                GameEvent::GoalReached { pos } => self.explosion(pos, GREEN),
                GameEvent::Jumped { .. }
                | GameEvent::EncounterSurvived { .. }
                | GameEvent::ShotFired { .. }
                | GameEvent::PlayerDied { .. }
                | GameEvent::PauseRequested => {}
            }
        }
    }

    /// Advance one tick
    pub fn update(&mut self) {
        self.particles.update();
        self.shake.update(&mut self.rng);
        for text in &mut self.texts {
            text.pos.y -= FLOATING_TEXT_RISE;
            text.life = text.life.saturating_sub(1);
        }
        self.texts.retain(|t| t.life > 0);
    }

    pub fn shake_offset(&self) -> Vec2 {
        self.shake.offset
    }
}
