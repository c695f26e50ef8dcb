//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or file I/O

pub mod body;
pub mod collision;
pub mod enemy;
pub mod level;
pub mod player;
pub mod powerup;
pub mod rect;
pub mod state;
pub mod tick;

pub use body::Body;
pub use collision::{PAUSE_BUTTON, resolve, resolve_platforms};
pub use enemy::{Enemy, EnemyKind, Projectile, select_variant};
pub use level::{LevelLayout, generate_level, is_traversable, static_level_one};
pub use player::{EffectKind, JumpKind, Player, PlayerStats};
pub use powerup::{PowerUp, PowerUpKind};
pub use rect::Rect;
pub use state::{DamageSource, GameEvent, GameState, LevelOutcome, Renderable, Visual};
pub use tick::{TickInput, tick};
