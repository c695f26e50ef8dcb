//! Power-ups and their spawn schedule

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::player::{
    DOUBLE_JUMP_TICKS, EffectKind, JUMP_BOOST_TICKS, Player, SHIELD_TICKS, SPEED_BOOST_TICKS,
};
use super::rect::Rect;
use crate::consts::*;

pub const SPAWN_INTERVAL: u32 = ticks_from_millis(2000);
/// Horizontal inset from platform edges when picking a spawn x
pub const SPAWN_MARGIN: f32 = 20.0;
/// Spawn height above the platform top
pub const SPAWN_LIFT: f32 = 25.0;
/// Upper bound on uncollected power-ups in one level
pub const MAX_ACTIVE: usize = 16;

pub const BOB_AMPLITUDE: f32 = 3.0;
pub const BOB_FREQUENCY: f32 = 0.1;

/// What a power-up grants on pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    JumpBoost,
    HealthPotion,
    Coin { value: u8 },
    Shield,
    DoubleJump,
}

/// Spawn weights; coins dominate
const WEIGHTS: [(PowerUpKind, u32); 6] = [
    (PowerUpKind::SpeedBoost, 15),
    (PowerUpKind::JumpBoost, 15),
    (PowerUpKind::HealthPotion, 10),
    (PowerUpKind::Coin { value: 1 }, 30),
    (PowerUpKind::Shield, 8),
    (PowerUpKind::DoubleJump, 12),
];

impl PowerUpKind {
    pub fn name(&self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "speed_boost",
            PowerUpKind::JumpBoost => "jump_boost",
            PowerUpKind::HealthPotion => "health_potion",
            PowerUpKind::Coin { .. } => "coin",
            PowerUpKind::Shield => "shield",
            PowerUpKind::DoubleJump => "double_jump",
        }
    }

    /// Label shown as floating text on pickup
    pub fn pickup_text(&self) -> String {
        match self {
            PowerUpKind::SpeedBoost => "Speed!".to_string(),
            PowerUpKind::JumpBoost => "Jump!".to_string(),
            PowerUpKind::HealthPotion => "+1 HP".to_string(),
            PowerUpKind::Coin { value } => format!("+{value}"),
            PowerUpKind::Shield => "Shield!".to_string(),
            PowerUpKind::DoubleJump => "Double Jump!".to_string(),
        }
    }

    pub fn is_coin(&self) -> bool {
        matches!(self, PowerUpKind::Coin { .. })
    }

    /// Square collision size
    pub fn size(&self) -> f32 {
        match self {
            PowerUpKind::Coin { value } => 12.0 + 2.0 * f32::from(*value),
            _ => 20.0,
        }
    }

    /// Weighted category draw, then a secondary coin-value draw
    pub fn roll(rng: &mut Pcg32) -> Self {
        let kind = match WeightedIndex::new(WEIGHTS.iter().map(|(_, w)| *w)) {
            Ok(dist) => WEIGHTS[dist.sample(rng)].0,
            Err(_) => PowerUpKind::Coin { value: 1 },
        };
        match kind {
            PowerUpKind::Coin { .. } => PowerUpKind::Coin {
                value: roll_coin_value(rng),
            },
            other => other,
        }
    }

    /// Apply the pickup to the player
    pub fn apply(&self, player: &mut Player) {
        match *self {
            PowerUpKind::SpeedBoost => player.apply_effect(EffectKind::Speed, SPEED_BOOST_TICKS),
            PowerUpKind::JumpBoost => player.apply_effect(EffectKind::JumpBoost, JUMP_BOOST_TICKS),
            PowerUpKind::HealthPotion => player.add_health(),
            PowerUpKind::Coin { value } => player.add_coins(u64::from(value)),
            PowerUpKind::Shield => player.apply_effect(EffectKind::Shield, SHIELD_TICKS),
            PowerUpKind::DoubleJump => player.apply_effect(EffectKind::DoubleJump, DOUBLE_JUMP_TICKS),
        }
    }
}

/// Silver one time in five, otherwise gold one time in twenty
fn roll_coin_value(rng: &mut Pcg32) -> u8 {
    if rng.random_range(0..5) == 0 {
        2
    } else if rng.random_range(0..20) == 0 {
        3
    } else {
        1
    }
}

/// A collectible floating above a platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    /// Resting center
    pub origin: Vec2,
    /// Current center, bobbing around `origin`
    pub pos: Vec2,
    pub bob_ticks: u32,
    pub collected: bool,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, center: Vec2) -> Self {
        Self {
            id,
            kind,
            origin: center,
            pos: center,
            bob_ticks: 0,
            collected: false,
        }
    }

    /// Advance the bob; collision rectangle moves with it
    pub fn update(&mut self) {
        self.bob_ticks = self.bob_ticks.wrapping_add(1);
        let phase = self.bob_ticks as f32 * BOB_FREQUENCY;
        self.pos.y = self.origin.y + BOB_AMPLITUDE * phase.sin();
    }

    pub fn rect(&self) -> Rect {
        let size = self.kind.size();
        Rect::from_center(self.pos, size, size)
    }

    /// Grant the effect once; later calls are no-ops
    pub fn collect(&mut self, player: &mut Player) -> Option<PowerUpKind> {
        if self.collected {
            return None;
        }
        self.collected = true;
        self.kind.apply(player);
        Some(self.kind)
    }
}

/// Interval-driven power-up spawner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUpSpawner {
    pub timer: u32,
}

impl PowerUpSpawner {
    /// Count one tick; yields a spawn position and kind when the interval elapses
    pub fn tick(
        &mut self,
        platforms: &[Rect],
        active: usize,
        rng: &mut Pcg32,
    ) -> Option<(PowerUpKind, Vec2)> {
        self.timer += 1;
        if self.timer < SPAWN_INTERVAL {
            return None;
        }
        self.timer = 0;
        if active >= MAX_ACTIVE {
            return None;
        }
        let pos = spawn_point(platforms, rng)?;
        Some((PowerUpKind::roll(rng), pos))
    }
}

/// Random point above a random platform, centered on narrow ones
pub fn spawn_point(platforms: &[Rect], rng: &mut Pcg32) -> Option<Vec2> {
    if platforms.is_empty() {
        return None;
    }
    let platform = platforms[rng.random_range(0..platforms.len())];
    let min_x = platform.left() + SPAWN_MARGIN;
    let max_x = platform.right() - SPAWN_MARGIN;
    let x = if min_x >= max_x {
        platform.center_x()
    } else {
        rng.random_range(min_x..=max_x)
    };
    Some(Vec2::new(x, platform.top() - SPAWN_LIFT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_collect_once() {
        let mut player = Player::new();
        let mut coin = PowerUp::new(1, PowerUpKind::Coin { value: 3 }, Vec2::new(100.0, 100.0));
        assert_eq!(coin.collect(&mut player), Some(PowerUpKind::Coin { value: 3 }));
        assert_eq!(coin.collect(&mut player), None);
        assert_eq!(player.coins, 3);
    }

    #[test]
    fn test_effect_refresh_not_additive() {
        let mut player = Player::new();
        PowerUpKind::Shield.apply(&mut player);
        for _ in 0..100 {
            player.tick_effects();
        }
        PowerUpKind::Shield.apply(&mut player);
        assert_eq!(player.effects.shield_ticks, SHIELD_TICKS);
        assert!(player.shield_active);
    }

    #[test]
    fn test_spawn_interval() {
        let mut rng = Pcg32::seed_from_u64(3);
        let platforms = [Rect::new(0.0, 560.0, WIDTH, 40.0)];
        let mut spawner = PowerUpSpawner::default();
        let mut spawned = 0;
        for _ in 0..SPAWN_INTERVAL * 4 {
            if spawner.tick(&platforms, 0, &mut rng).is_some() {
                spawned += 1;
            }
        }
        assert_eq!(spawned, 4);
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut rng = Pcg32::seed_from_u64(3);
        let platforms = [Rect::new(0.0, 560.0, WIDTH, 40.0)];
        let mut spawner = PowerUpSpawner::default();
        for _ in 0..SPAWN_INTERVAL * 2 {
            assert!(spawner.tick(&platforms, MAX_ACTIVE, &mut rng).is_none());
        }
    }

    #[test]
    fn test_spawn_point_on_platform() {
        let mut rng = Pcg32::seed_from_u64(11);
        let wide = Rect::new(100.0, 300.0, 100.0, 20.0);
        for _ in 0..50 {
            let p = spawn_point(&[wide], &mut rng).unwrap();
            assert!(p.x >= 120.0 && p.x <= 180.0);
            assert_eq!(p.y, 275.0);
        }
        let narrow = Rect::new(100.0, 300.0, 30.0, 20.0);
        let p = spawn_point(&[narrow], &mut rng).unwrap();
        assert_eq!(p.x, 115.0);
        assert!(spawn_point(&[], &mut rng).is_none());
    }

    #[test]
    fn test_roll_covers_every_kind() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2000 {
            let kind = PowerUpKind::roll(&mut rng);
            if let PowerUpKind::Coin { value } = kind {
                assert!((1..=3).contains(&value));
            }
            seen.insert(kind.name());
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_bob_moves_rect() {
        let mut item = PowerUp::new(1, PowerUpKind::Shield, Vec2::new(50.0, 50.0));
        let before = item.rect();
        for _ in 0..10 {
            item.update();
        }
        let after = item.rect();
        assert_eq!(before.x, after.x);
        assert!((after.center().y - (50.0 + 3.0 * 1.0f32.sin())).abs() < 1e-4);
    }
}
