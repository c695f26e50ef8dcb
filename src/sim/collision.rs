//! Collision resolution
//!
//! Runs once per tick in a fixed order: platforms, goal, enemy bodies,
//! power-ups, projectiles. Later steps see the effects of earlier ones, so
//! reaching the goal on the same tick as a lethal hit completes the level.

use glam::Vec2;

use super::body::Body;
use super::rect::Rect;
use super::state::{DamageSource, GameEvent, GameState};

/// Pause button in screen space
pub const PAUSE_BUTTON: Rect = Rect::new(10.0, 10.0, 50.0, 50.0);

/// Downward speed past which an unsupported body loses floor contact
///
/// A resting body dips below the surface every other tick and picks up half
/// a unit of fall speed in between; only a real fall clears the flag.
pub const AIRBORNE_FALL_SPEED: f32 = 1.0;

/// Result of resolving one body against the platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorContact {
    /// Snapped onto a platform this tick
    pub snapped: bool,
    /// on_floor went from false to true
    pub landed: bool,
}

impl FloorContact {
    pub fn none() -> Self {
        Self {
            snapped: false,
            landed: false,
        }
    }
}

/// Landing-only platform collision for a single body
///
/// The first overlapping platform wins. Platforms are not walls: there is no
/// horizontal response and a rising body passes through from below.
pub fn resolve_platforms(body: &mut Body, hitbox: Rect, platforms: &[Rect]) -> FloorContact {
    let was_on_floor = body.on_floor;
    let hit = platforms.iter().find(|p| hitbox.overlaps(p));

    match hit {
        Some(platform) if body.vel.y >= 0.0 => {
            body.land_on(platform.top());
            FloorContact {
                snapped: true,
                landed: !was_on_floor,
            }
        }
        Some(_) => FloorContact::none(),
        None => {
            if body.vel.y > AIRBORNE_FALL_SPEED {
                body.on_floor = false;
            }
            FloorContact::none()
        }
    }
}

/// Run every collision step for the tick
pub fn resolve(state: &mut GameState) {
    resolve_world(state);

    if resolve_goal(state) {
        return;
    }

    resolve_enemy_contact(state);
    // A dead player picks nothing up
    if !state.is_over() {
        resolve_powerups(state);
    }
    resolve_projectiles(state);
}

/// Step 1: player, then each enemy independently
fn resolve_world(state: &mut GameState) {
    let hitbox = state.player.hitbox();
    let contact = resolve_platforms(&mut state.player.body, hitbox, &state.platforms);
    if contact.landed {
        state.player.on_landed();
        let pos = state.player.pos();
        let vel_x = state.player.body.vel.x;
        state.push_event(GameEvent::Landed { pos, vel_x });
    }

    for enemy in &mut state.enemies {
        let rect = enemy.rect();
        resolve_platforms(&mut enemy.body, rect, &state.platforms);
    }
}

/// Step 2: goal overlap ends the level
fn resolve_goal(state: &mut GameState) -> bool {
    if state.player.hitbox().overlaps(&state.goal) {
        state.complete_level();
        return true;
    }
    false
}

/// Step 3: enemy bodies
fn resolve_enemy_contact(state: &mut GameState) {
    let hitbox = state.player.hitbox();
    let touching = state
        .enemies
        .iter()
        .map(|e| e.rect())
        .find(|r| hitbox.overlaps(r));

    let was_in_contact = state.in_enemy_contact;
    state.in_enemy_contact = touching.is_some();

    let Some(enemy_rect) = touching else {
        return;
    };

    if state.player.take_damage() {
        state.damage_taken = true;
        let away = hitbox.center_x() - enemy_rect.center_x();
        state
            .player
            .apply_knockback(if away == 0.0 { 1.0 } else { away });
        damaged(state, DamageSource::Enemy);
    } else if !was_in_contact {
        let pos = state.player.pos();
        state.push_event(GameEvent::EncounterSurvived { pos });
    }
}

/// Step 4: power-ups, each at most once
fn resolve_powerups(state: &mut GameState) {
    let hitbox = state.player.hitbox();
    let mut collected = Vec::new();
    for powerup in &mut state.powerups {
        if hitbox.overlaps(&powerup.rect()) {
            if let Some(kind) = powerup.collect(&mut state.player) {
                collected.push(GameEvent::Collected {
                    kind,
                    pos: powerup.pos,
                });
            }
        }
    }
    state.powerups.retain(|p| !p.collected);
    for event in collected {
        state.push_event(event);
    }
}

/// Step 5: shooter projectiles are consumed on impact
fn resolve_projectiles(state: &mut GameState) {
    let hitbox = state.player.hitbox();
    let mut hits = 0;
    for enemy in &mut state.enemies {
        if let Some(projectiles) = enemy.projectiles_mut() {
            let before = projectiles.len();
            projectiles.retain(|p| !hitbox.overlaps(&p.rect()));
            hits += before - projectiles.len();
        }
    }

    for _ in 0..hits {
        if state.player.take_damage() {
            state.damage_taken = true;
            damaged(state, DamageSource::Projectile);
        }
    }
}

fn damaged(state: &mut GameState, source: DamageSource) {
    let pos = state.player.pos();
    let health = state.player.health;
    state.push_event(GameEvent::Damaged {
        pos,
        health,
        source,
    });
    if state.player.is_dead() {
        state.fail_level();
    }
}

/// Step 6: pointer press inside the pause button
pub fn pause_button_hit(pointer: Option<Vec2>, pressed: bool) -> bool {
    pressed && pointer.is_some_and(|p| PAUSE_BUTTON.contains_point(p))
}
