//! The player entity
//!
//! Input-driven acceleration, edge-latched jumping with an optional double
//! jump, damage gated by shield and invincibility, and a set of independent
//! timed effects that refresh by max-merge rather than stacking.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::rect::Rect;
use crate::consts::*;

/// Player sprite size
pub const PLAYER_WIDTH: f32 = 46.0;
pub const PLAYER_HEIGHT: f32 = 50.0;

/// Spawn point (mid-bottom anchor)
pub const PLAYER_SPAWN: Vec2 = Vec2::new(30.0, HEIGHT * 3.0 / 4.0);

pub const STARTING_HEALTH: u32 = 3;
pub const STARTING_MAX_HEALTH: u32 = 5;
/// Highest max_health reachable through potions
pub const MAX_HEALTH_CAP: u32 = 8;

pub const JUMP_STRENGTH: f32 = -12.0;
pub const BOOSTED_JUMP_STRENGTH: f32 = -16.0;
/// A double jump is refused while rising faster than this
pub const DOUBLE_JUMP_MIN_VEL: f32 = -8.0;
/// Vertical speed above which the player reads as falling
pub const FALLING_THRESHOLD: f32 = 0.5;
pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
pub const KNOCKBACK_FORCE: f32 = 8.0;

pub const INVINCIBLE_TICKS: u32 = ticks_from_millis(1200);
pub const SPEED_BOOST_TICKS: u32 = ticks_from_millis(3000);
pub const JUMP_BOOST_TICKS: u32 = ticks_from_millis(3000);
pub const SHIELD_TICKS: u32 = ticks_from_millis(18_000);
pub const DOUBLE_JUMP_TICKS: u32 = ticks_from_millis(2400);

/// Movement / animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveState {
    #[default]
    Idle,
    Moving,
    Jumping,
    Falling,
}

/// Which animation set to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

/// Timed abilities granted by power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Speed,
    JumpBoost,
    Shield,
    DoubleJump,
}

impl EffectKind {
    pub fn label(&self) -> &'static str {
        match self {
            EffectKind::Speed => "Speed",
            EffectKind::JumpBoost => "Jump",
            EffectKind::Shield => "Shield",
            EffectKind::DoubleJump => "Double Jump",
        }
    }
}

/// Remaining ticks per timed effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEffects {
    pub speed_ticks: u32,
    pub jump_boost_ticks: u32,
    pub shield_ticks: u32,
    pub double_jump_ticks: u32,
}

impl TimedEffects {
    fn slot(&mut self, kind: EffectKind) -> &mut u32 {
        match kind {
            EffectKind::Speed => &mut self.speed_ticks,
            EffectKind::JumpBoost => &mut self.jump_boost_ticks,
            EffectKind::Shield => &mut self.shield_ticks,
            EffectKind::DoubleJump => &mut self.double_jump_ticks,
        }
    }

    pub fn remaining(&self, kind: EffectKind) -> u32 {
        match kind {
            EffectKind::Speed => self.speed_ticks,
            EffectKind::JumpBoost => self.jump_boost_ticks,
            EffectKind::Shield => self.shield_ticks,
            EffectKind::DoubleJump => self.double_jump_ticks,
        }
    }
}

/// Kind of jump performed this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Primary,
    Double,
}

/// Held controls relevant to the player for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Persisted stat block carried between levels and sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub health: u32,
    pub max_health: u32,
    pub coins: u64,
    pub effects: TimedEffects,
    pub has_double_jump: bool,
    pub shield_active: bool,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            health: STARTING_HEALTH,
            max_health: STARTING_MAX_HEALTH,
            coins: 0,
            effects: TimedEffects::default(),
            has_double_jump: false,
            shield_active: false,
        }
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub health: u32,
    pub max_health: u32,
    pub coins: u64,
    pub effects: TimedEffects,
    pub shield_active: bool,
    pub has_double_jump: bool,
    pub double_jump_used: bool,
    pub invincible_timer: u32,
    pub invincible_duration: u32,
    pub state: MoveState,
    pub facing: Facing,
    /// Set by a successful jump, cleared when the key is released
    pub jump_latched: bool,
    /// Ticks spent in the current animation state
    pub animation_timer: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self::from_stats(&PlayerStats::default())
    }

    /// Build a player at the spawn point from a saved stat block
    pub fn from_stats(stats: &PlayerStats) -> Self {
        let max_health = stats.max_health.clamp(1, MAX_HEALTH_CAP);
        Self {
            body: Body::new(PLAYER_SPAWN),
            health: stats.health.min(max_health),
            max_health,
            coins: stats.coins,
            effects: stats.effects,
            shield_active: stats.shield_active && stats.effects.shield_ticks > 0,
            has_double_jump: stats.has_double_jump && stats.effects.double_jump_ticks > 0,
            double_jump_used: false,
            invincible_timer: 0,
            invincible_duration: INVINCIBLE_TICKS,
            state: MoveState::Idle,
            facing: Facing::Left,
            jump_latched: false,
            animation_timer: 0,
        }
    }

    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            health: self.health,
            max_health: self.max_health,
            coins: self.coins,
            effects: self.effects,
            has_double_jump: self.has_double_jump,
            shield_active: self.shield_active,
        }
    }

    /// Put the player back on the spawn point for a fresh level
    pub fn reset_position(&mut self) {
        self.body = Body::new(PLAYER_SPAWN);
        self.double_jump_used = false;
        self.jump_latched = false;
        self.state = MoveState::Idle;
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    /// Rendering rectangle
    pub fn rect(&self) -> Rect {
        Rect::from_midbottom(self.body.pos, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    /// Collision rectangle, inset from the sprite
    pub fn hitbox(&self) -> Rect {
        let r = self.rect();
        Rect::new(r.left() + 10.0, r.top() + 7.0, r.w - 26.0, r.h - 7.0)
    }

    /// Advance one tick: effects, input, state, then physics
    pub fn update(&mut self, controls: Controls) -> Option<JumpKind> {
        self.body.begin_tick();
        self.animation_timer = self.animation_timer.wrapping_add(1);

        self.tick_effects();

        let previous = self.state;

        if !controls.left && !controls.right && self.body.on_floor {
            self.state = MoveState::Idle;
        }

        let multiplier = if self.effects.speed_ticks > 0 {
            SPEED_BOOST_MULTIPLIER
        } else {
            1.0
        };
        let base_acc = PLAYER_ACC * multiplier;

        if controls.left {
            self.body.acc.x = -base_acc;
            self.state = MoveState::Moving;
            self.facing = Facing::Left;
        }
        if controls.right {
            self.body.acc.x = base_acc;
            self.state = MoveState::Moving;
            self.facing = Facing::Right;
        }

        let jump = self.handle_jump(controls.jump);

        if self.body.vel.y < 0.0 {
            self.state = MoveState::Jumping;
        }
        if self.body.vel.y > FALLING_THRESHOLD {
            self.state = MoveState::Falling;
        }

        if self.state != previous {
            self.animation_timer = 0;
        }

        self.body.integrate();
        jump
    }

    /// Apply the jump button for this tick
    ///
    /// The latch is only set by a jump that actually fires, so holding the
    /// key never repeat-fires but a press made a tick too early still lands.
    pub fn handle_jump(&mut self, pressed: bool) -> Option<JumpKind> {
        if !pressed {
            self.jump_latched = false;
            return None;
        }
        if self.jump_latched {
            return None;
        }

        let strength = if self.effects.jump_boost_ticks > 0 {
            BOOSTED_JUMP_STRENGTH
        } else {
            JUMP_STRENGTH
        };

        if self.body.on_floor && self.body.vel.y == 0.0 {
            self.body.vel.y = strength;
            self.body.on_floor = false;
            self.jump_latched = true;
            Some(JumpKind::Primary)
        } else if self.has_double_jump
            && !self.double_jump_used
            && !self.body.on_floor
            && self.body.vel.y > DOUBLE_JUMP_MIN_VEL
        {
            self.body.vel.y = strength;
            self.double_jump_used = true;
            self.jump_latched = true;
            Some(JumpKind::Double)
        } else {
            None
        }
    }

    /// Floor contact regained after being airborne
    pub fn on_landed(&mut self) {
        self.double_jump_used = false;
    }

    /// Decrement every timer once; flags drop on the tick a counter hits zero
    pub fn tick_effects(&mut self) {
        self.effects.speed_ticks = self.effects.speed_ticks.saturating_sub(1);
        self.effects.jump_boost_ticks = self.effects.jump_boost_ticks.saturating_sub(1);

        if self.effects.shield_ticks > 0 {
            self.effects.shield_ticks -= 1;
            if self.effects.shield_ticks == 0 {
                self.shield_active = false;
            }
        }

        if self.effects.double_jump_ticks > 0 {
            self.effects.double_jump_ticks -= 1;
            if self.effects.double_jump_ticks == 0 {
                self.has_double_jump = false;
            }
        }

        self.invincible_timer = self.invincible_timer.saturating_sub(1);
    }

    /// Grant or refresh a timed effect (max-merge, never additive)
    pub fn apply_effect(&mut self, kind: EffectKind, duration: u32) {
        let slot = self.effects.slot(kind);
        *slot = (*slot).max(duration);
        match kind {
            EffectKind::Shield => self.shield_active = true,
            EffectKind::DoubleJump => self.has_double_jump = true,
            EffectKind::Speed | EffectKind::JumpBoost => {}
        }
    }

    /// Heal one point; at full health raise the ceiling instead
    pub fn add_health(&mut self) {
        if self.health >= self.max_health && self.max_health < MAX_HEALTH_CAP {
            self.max_health += 1;
        }
        self.health = (self.health + 1).min(self.max_health);
    }

    pub fn add_coins(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Accept a hit unless shielded or still invincible
    pub fn take_damage(&mut self) -> bool {
        if !self.shield_active && self.invincible_timer == 0 {
            self.health = self.health.saturating_sub(1);
            self.invincible_timer = self.invincible_duration;
            return true;
        }
        false
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0
    }

    /// Blink phase while invincible
    pub fn should_flash(&self) -> bool {
        self.invincible_timer > 0 && (self.invincible_timer / 5) % 2 == 0
    }

    /// Shove the player away from a hit
    pub fn apply_knockback(&mut self, direction_x: f32) {
        self.body.vel.x = direction_x.signum() * KNOCKBACK_FORCE;
        self.body.vel.y = -3.0;
        self.body.on_floor = false;
    }

    /// Effects with time remaining, for the HUD
    pub fn active_effects(&self) -> Vec<(EffectKind, u32)> {
        [
            EffectKind::Speed,
            EffectKind::JumpBoost,
            EffectKind::Shield,
            EffectKind::DoubleJump,
        ]
        .into_iter()
        .map(|kind| (kind, self.effects.remaining(kind)))
        .filter(|&(_, ticks)| ticks > 0)
        .collect()
    }
}
