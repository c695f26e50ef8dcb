//! Skybound - a fixed-timestep sky platformer
//!
//! Core modules:
//! - `sim`: Deterministic gameplay runtime (physics, collisions, AI, level generation)
//! - `achievements`: Progress tracking and one-way unlocks
//! - `effects`: Particles, screen shake and floating text (presentation only)
//! - `persistence`: File-backed save store with write-through
//! - `session`: Screen state machine tying a level to saves and feedback

pub mod achievements;
pub mod audio;
pub mod clock;
pub mod effects;
pub mod input;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;

pub use achievements::{Achievement, AchievementEngine};
pub use persistence::SaveStore;
pub use session::{Screen, Session};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 100;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field dimensions
    pub const WIDTH: f32 = 480.0;
    pub const HEIGHT: f32 = 600.0;

    /// Horizontal input acceleration, also the position blend factor
    pub const PLAYER_ACC: f32 = 0.5;
    /// Velocity damping multiplier (negative)
    pub const FRICTION: f32 = -0.12;
    /// Downward acceleration applied every tick
    pub const GRAVITY: f32 = 0.5;

    /// Convert a wall-clock duration to whole ticks at `TICK_RATE`
    #[inline]
    pub const fn ticks_from_millis(ms: u32) -> u32 {
        ms * TICK_RATE / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::consts::*;

    #[test]
    fn test_ticks_from_millis() {
        assert_eq!(ticks_from_millis(1000), TICK_RATE);
        assert_eq!(ticks_from_millis(1200), 120);
        assert_eq!(ticks_from_millis(0), 0);
    }
}
