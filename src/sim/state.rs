//! Level context and simulation events
//!
//! A `GameState` owns every entity of the level being played. It is built
//! from a [`LevelLayout`] and dropped on level transition.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::enemy::{Enemy, EnemyKind};
use super::level::{LevelLayout, generate_level, level_rng};
use super::player::{Facing, JumpKind, MoveState, Player, PlayerStats};
use super::powerup::{PowerUp, PowerUpKind, PowerUpSpawner};
use super::rect::Rect;
use crate::consts::*;

/// Keeps runtime draws independent of layout draws for the same level
const RUNTIME_STREAM: u64 = 0x5EED_0F5C_A1AB_1E00;

/// Whether the level is still being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelOutcome {
    #[default]
    InProgress,
    Completed,
    Failed,
}

/// What hurt the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Enemy,
    Projectile,
}

/// Discrete notifications emitted during a tick
///
/// Consumers (achievements, effects, audio) read these after the tick; they
/// never feed back into the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Jumped { kind: JumpKind, pos: Vec2 },
    Landed { pos: Vec2, vel_x: f32 },
    Damaged { pos: Vec2, health: u32, source: DamageSource },
    /// Enemy contact blocked by shield or invincibility
    EncounterSurvived { pos: Vec2 },
    Collected { kind: PowerUpKind, pos: Vec2 },
    ShotFired { pos: Vec2 },
    GoalReached { pos: Vec2 },
    PlayerDied { pos: Vec2 },
    PauseRequested,
}

/// Visual reference for one renderable entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visual {
    Player {
        state: MoveState,
        facing: Facing,
        flash: bool,
    },
    Platform,
    Goal,
    Enemy(EnemyKind),
    Projectile,
    PowerUp(PowerUpKind),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    pub rect: Rect,
    pub visual: Visual,
}

/// All state for the level currently being played
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub level: u32,
    /// Runtime RNG (power-up spawns, jumper timing)
    pub rng: Pcg32,
    /// Ticks since the level started
    pub tick_count: u64,
    pub player: Player,
    /// Floor, climbable stack, then decorations
    pub platforms: Vec<Rect>,
    pub goal: Rect,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    /// Sorted by id
    pub powerups: Vec<PowerUp>,
    pub spawner: PowerUpSpawner,
    pub outcome: LevelOutcome,
    /// Any accepted damage this level
    pub damage_taken: bool,
    /// Player overlapped an enemy last tick
    pub in_enemy_contact: bool,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Generate and load `level` for a run
    pub fn new(seed: u64, level: u32, stats: &PlayerStats) -> Self {
        let layout = generate_level(level, seed);
        Self::from_layout(seed, &layout, stats)
    }

    pub fn from_layout(seed: u64, layout: &LevelLayout, stats: &PlayerStats) -> Self {
        let mut rng = level_rng(seed ^ RUNTIME_STREAM, layout.level);
        let enemies = (1u32..)
            .zip(&layout.enemies)
            .map(|(id, spawn)| Enemy::new(id, spawn.kind, spawn.pos, &mut rng))
            .collect::<Vec<_>>();
        let next_id = enemies.len() as u32 + 1;

        Self {
            seed,
            level: layout.level,
            rng,
            tick_count: 0,
            player: Player::from_stats(stats),
            platforms: layout.all_platforms(),
            goal: layout.goal,
            enemies,
            powerups: Vec::new(),
            spawner: PowerUpSpawner::default(),
            outcome: LevelOutcome::InProgress,
            damage_taken: false,
            in_enemy_contact: false,
            events: Vec::new(),
            next_id,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_powerup(&mut self, kind: PowerUpKind, center: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.powerups.push(PowerUp::new(id, kind, center));
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events since the last drain, in emission order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn is_over(&self) -> bool {
        self.outcome != LevelOutcome::InProgress
    }

    /// Seconds of play at the fixed rate
    pub fn elapsed_secs(&self) -> f32 {
        self.tick_count as f32 / TICK_RATE as f32
    }

    /// End the level in failure; repeated calls are no-ops
    pub fn fail_level(&mut self) {
        if self.outcome == LevelOutcome::InProgress {
            self.outcome = LevelOutcome::Failed;
            let pos = self.player.pos();
            self.push_event(GameEvent::PlayerDied { pos });
        }
    }

    pub fn complete_level(&mut self) {
        if self.outcome == LevelOutcome::InProgress {
            self.outcome = LevelOutcome::Completed;
            let pos = self.player.pos();
            self.push_event(GameEvent::GoalReached { pos });
        }
    }

    /// Everything to draw this frame, back to front
    pub fn renderables(&self) -> Vec<Renderable> {
        let mut list = Vec::with_capacity(
            self.platforms.len() + self.enemies.len() + self.powerups.len() + 2,
        );
        list.extend(self.platforms.iter().map(|&rect| Renderable {
            rect,
            visual: Visual::Platform,
        }));
        list.push(Renderable {
            rect: self.goal,
            visual: Visual::Goal,
        });
        list.extend(self.powerups.iter().map(|p| Renderable {
            rect: p.rect(),
            visual: Visual::PowerUp(p.kind),
        }));
        for enemy in &self.enemies {
            list.push(Renderable {
                rect: enemy.rect(),
                visual: Visual::Enemy(enemy.kind),
            });
            list.extend(enemy.projectiles().iter().map(|p| Renderable {
                rect: p.rect(),
                visual: Visual::Projectile,
            }));
        }
        list.push(Renderable {
            rect: self.player.rect(),
            visual: Visual::Player {
                state: self.player.state,
                facing: self.player.facing,
                flash: self.player.should_flash(),
            },
        });
        list
    }
}
