//! Fixed timestep simulation tick
//!
//! Advances one level deterministically: entity updates run to completion,
//! then collision resolution, then the enemy chase hooks.

use glam::Vec2;

use super::collision::{self, pause_button_hit};
use super::player::Controls;
use super::state::{GameEvent, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump key held
    pub jump: bool,
    /// Pointer position in screen space
    pub pointer: Option<Vec2>,
    /// Primary pointer button pressed this tick
    pub pointer_pressed: bool,
    /// Idle/demo mode - AI plays the game
    pub autopilot: bool,
}

impl TickInput {
    pub fn controls(&self) -> Controls {
        Controls {
            left: self.left,
            right: self.right,
            jump: self.jump,
        }
    }
}

/// Advance the level by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.is_over() {
        return;
    }

    let mut input = input.clone();
    if input.autopilot {
        steer(state, &mut input);
    }

    state.tick_count += 1;

    // Entities first
    if let Some(kind) = state.player.update(input.controls()) {
        let pos = state.player.pos();
        state.push_event(GameEvent::Jumped { kind, pos });
    }

    for enemy in &mut state.enemies {
        enemy.update(&mut state.rng);
    }

    for powerup in &mut state.powerups {
        powerup.update();
    }
    if let Some((kind, pos)) =
        state
            .spawner
            .tick(&state.platforms, state.powerups.len(), &mut state.rng)
    {
        state.spawn_powerup(kind, pos);
    }

    collision::resolve(state);

    // Chase hooks see post-collision positions and drive next tick's motion
    if !state.is_over() {
        let target = state.player.hitbox();
        let mut shots = Vec::new();
        for enemy in &mut state.enemies {
            if enemy.reacts_to_player() && enemy.chase(target) {
                shots.push(enemy.rect().center());
            }
        }
        for pos in shots {
            state.push_event(GameEvent::ShotFired { pos });
        }
    }

    if pause_button_hit(input.pointer, input.pointer_pressed) {
        state.push_event(GameEvent::PauseRequested);
    }
}

/// Demo input: climb toward the goal one platform at a time
fn steer(state: &GameState, input: &mut TickInput) {
    let feet = state.player.pos();

    // Closest platform above the player's feet, or the goal when none remain
    let target = state
        .platforms
        .iter()
        .filter(|p| p.top() < feet.y - 5.0)
        .max_by(|a, b| a.top().total_cmp(&b.top()))
        .copied()
        .unwrap_or(state.goal);

    let dx = target.center_x() - feet.x;
    input.left = dx < -4.0;
    input.right = dx > 4.0;

    // Pulse the key so the jump latch can reset between attempts
    let near = dx.abs() < target.w / 2.0 + 40.0;
    input.jump = near && state.tick_count % 2 == 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::static_level_one;
    use crate::sim::player::{JumpKind, PlayerStats};
    use crate::sim::state::LevelOutcome;

    fn level_one() -> GameState {
        GameState::from_layout(9, &static_level_one(), &PlayerStats::default())
    }

    fn run(state: &mut GameState, input: &TickInput, ticks: u32) {
        for _ in 0..ticks {
            tick(state, input);
        }
    }

    #[test]
    fn test_player_settles_on_floor() {
        let mut state = level_one();
        run(&mut state, &TickInput::default(), 60);
        assert!(state.player.body.on_floor);
        assert!((state.player.pos().y - 559.0).abs() < 2.0);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::Landed { .. }))
        );
    }

    #[test]
    fn test_jump_from_rest() {
        let mut state = level_one();
        run(&mut state, &TickInput::default(), 60);
        state.drain_events();

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        // A held key fires at most once even across several ticks
        run(&mut state, &jump, 10);
        let jumps = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Jumped { kind: JumpKind::Primary, .. }))
            .count();
        assert_eq!(jumps, 1);
        assert!(state.player.body.vel.y < 0.0);
    }

    #[test]
    fn test_powerups_spawn_on_schedule() {
        let mut state = level_one();
        state.enemies.clear();
        run(
            &mut state,
            &TickInput::default(),
            crate::sim::powerup::SPAWN_INTERVAL * 3,
        );
        let collected = state
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Collected { .. }))
            .count();
        assert_eq!(state.powerups.len() + collected, 3);
    }

    #[test]
    fn test_ticks_stop_after_outcome() {
        let mut state = level_one();
        state.fail_level();
        let before = state.tick_count;
        run(&mut state, &TickInput::default(), 10);
        assert_eq!(state.tick_count, before);
        assert_eq!(state.outcome, LevelOutcome::Failed);
    }

    #[test]
    fn test_deterministic_replay() {
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut a = GameState::new(77, 6, &PlayerStats::default());
        let mut b = GameState::new(77, 6, &PlayerStats::default());
        run(&mut a, &input, 500);
        run(&mut b, &input, 500);
        assert_eq!(a.player.pos(), b.player.pos());
        assert_eq!(a.powerups.len(), b.powerups.len());
        assert_eq!(a.outcome, b.outcome);
    }

    #[test]
    fn test_pause_request_event() {
        let mut state = level_one();
        let input = TickInput {
            pointer: Some(Vec2::new(20.0, 20.0)),
            pointer_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert!(state.events().contains(&GameEvent::PauseRequested));
    }
}
