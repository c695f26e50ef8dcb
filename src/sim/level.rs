//! Level layouts: the hand-authored first level and the procedural generator
//!
//! Generation runs a fixed sequence of passes over the randomly scattered
//! platforms: sort by height, clamp vertical gaps, pull platforms within
//! horizontal jump distance, anchor the lowest platform above the floor, and
//! clamp each platform inside the field. The result is verified afterwards;
//! a layout that fails is rebuilt a few times and finally repaired in place,
//! never rejected.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{EnemyKind, select_variant};
use super::player::PLAYER_SPAWN;
use super::rect::Rect;
use crate::consts::*;

/// Full-width floor present in every level
pub const FLOOR: Rect = Rect::new(0.0, HEIGHT - 40.0, WIDTH, 40.0);
pub const PLATFORM_HEIGHT: f32 = 20.0;
pub const GOAL_SIZE: f32 = 20.0;

pub const BASE_PLATFORMS: u32 = 4;
pub const MAX_EXTRA_PLATFORMS: u32 = 4;
/// Largest center-to-center horizontal distance between consecutive platforms
pub const MAX_HORIZONTAL_DISTANCE: f32 = 150.0;
/// Vertical gap a primary jump clears with margin to land
pub const MAX_JUMP_RISE: f32 = 120.0;
/// Highest allowed platform top
pub const BAND_TOP: f32 = 40.0;
/// Lowest allowed platform top (one jump above the floor)
pub const BAND_BOTTOM: f32 = HEIGHT - 160.0;
/// Rightmost allowed platform x
pub const MAX_PLATFORM_X: f32 = WIDTH - 80.0;

pub const MAX_ENEMIES: u32 = 3;
pub const ENEMY_SAFE_DISTANCE: f32 = 100.0;
pub const ENEMY_SPAWN_ATTEMPTS: u32 = 20;
/// First enemy tries this spot before anything random
pub const FIRST_ENEMY_SPOT: Vec2 = Vec2::new(440.0, HEIGHT * 3.0 / 4.0 + 10.0);
pub const ENEMY_FALLBACK: Vec2 = Vec2::new(WIDTH - 60.0, HEIGHT - 100.0);

/// Levels above this get decorative platforms
pub const DECORATION_LEVEL: u32 = 8;
pub const DECORATION_COUNT: u32 = 2;

/// Share of the level's nominal minimum gap actually enforced
const MIN_GAP_SCALE: f32 = 1.0 / 3.0;
/// The minimum gap never exceeds this fraction of the maximum
const MIN_GAP_CEILING: f32 = 0.75;

/// Full rebuilds before falling back to in-place repair
const REBUILD_ATTEMPTS: u32 = 3;
const EPSILON: f32 = 1e-3;

/// Where and what to spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    /// Mid-bottom anchor
    pub pos: Vec2,
}

/// Static description of one level, consumed by `GameState::from_layout`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub level: u32,
    /// Floor first, then the climbable platforms sorted top to bottom
    pub platforms: Vec<Rect>,
    /// Extra platforms with no traversal guarantee
    pub decorations: Vec<Rect>,
    pub goal: Rect,
    pub enemies: Vec<EnemySpawn>,
}

impl LevelLayout {
    /// Climbable platforms without the floor
    pub fn stack(&self) -> &[Rect] {
        self.platforms.get(1..).unwrap_or(&[])
    }

    /// Every collidable platform, decorations included
    pub fn all_platforms(&self) -> Vec<Rect> {
        self.platforms
            .iter()
            .chain(self.decorations.iter())
            .copied()
            .collect()
    }
}

/// Vertical gap limits for consecutive platforms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingBounds {
    pub min: f32,
    pub max: f32,
}

/// Gap limits for a level with `count` stacked platforms
///
/// Both bounds tighten with level. The upper bound is capped so the stack
/// fits between `BAND_TOP` and `BAND_BOTTOM` and every gap stays within one
/// primary jump; the lower bound stays strictly below it so rolled heights
/// keep their spread.
pub fn spacing_bounds(level: u32, count: usize) -> SpacingBounds {
    let level = level as f32;
    let raw_min = (180.0 - 5.0 * level).max(120.0);
    let raw_max = (160.0 + 5.0 * level).min(220.0).max(raw_min);
    let fit = if count > 1 {
        (BAND_BOTTOM - BAND_TOP) / (count - 1) as f32
    } else {
        raw_max
    };
    let max = raw_max.min(fit).min(MAX_JUMP_RISE);
    SpacingBounds {
        min: (raw_min * MIN_GAP_SCALE).min(max * MIN_GAP_CEILING),
        max,
    }
}

pub fn platform_count(level: u32) -> usize {
    (BASE_PLATFORMS + (level / 3).min(MAX_EXTRA_PLATFORMS)) as usize
}

pub fn enemy_count(level: u32) -> usize {
    (1 + level / 4).min(MAX_ENEMIES) as usize
}

/// Per-level RNG derived from the run seed
pub fn level_rng(seed: u64, level: u32) -> Pcg32 {
    Pcg32::seed_from_u64(seed ^ u64::from(level).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// The hand-authored first level
pub fn static_level_one() -> LevelLayout {
    LevelLayout {
        level: 1,
        platforms: vec![
            FLOOR,
            Rect::new(WIDTH / 2.0 - 50.0, HEIGHT * 3.0 / 4.0, 100.0, PLATFORM_HEIGHT),
            Rect::new(WIDTH / 2.0 - 150.0, HEIGHT * 3.0 / 6.0, 100.0, PLATFORM_HEIGHT),
            Rect::new(WIDTH / 2.0 + 100.0, HEIGHT * 3.0 / 9.0, 100.0, PLATFORM_HEIGHT),
            Rect::new(WIDTH / 2.0 - 100.0, 100.0, 100.0, PLATFORM_HEIGHT),
        ],
        decorations: Vec::new(),
        goal: Rect::new(WIDTH / 2.0 - 100.0, 60.0, GOAL_SIZE, GOAL_SIZE),
        enemies: vec![EnemySpawn {
            kind: EnemyKind::Chaser,
            pos: Vec2::new(WIDTH - 80.0, HEIGHT * 3.0 / 4.0 + 10.0),
        }],
    }
}

/// Layout for any level; deterministic for a given `(seed, level)`
pub fn generate_level(level: u32, seed: u64) -> LevelLayout {
    if level <= 1 {
        return static_level_one();
    }

    let mut rng = level_rng(seed, level);
    let count = platform_count(level);
    let bounds = spacing_bounds(level, count);

    let mut stack = Vec::new();
    let mut verified = false;
    for attempt in 0..REBUILD_ATTEMPTS {
        stack = build_stack(level, count, bounds, &mut rng);
        match first_violation(&stack, bounds) {
            None => {
                verified = true;
                break;
            }
            Some(index) => {
                log::debug!("Level {level} attempt {attempt}: platform {index} unreachable, rebuilding");
            }
        }
    }
    if !verified {
        log::warn!("Level {level}: repairing layout after {REBUILD_ATTEMPTS} rebuilds");
        repair(&mut stack, bounds);
    }

    let goal = place_goal(&stack);
    let enemies = place_enemies(level, &stack, goal, &mut rng);

    let decorations = if level > DECORATION_LEVEL {
        (0..DECORATION_COUNT)
            .map(|_| {
                let w = rng.random_range(30..=50) as f32;
                let x = rng.random_range(0..=(WIDTH - w) as u32) as f32;
                let y = rng.random_range(60..=(HEIGHT - 200.0) as u32) as f32;
                Rect::new(x, y, w, PLATFORM_HEIGHT)
            })
            .collect()
    } else {
        Vec::new()
    };

    log::info!(
        "Generated level {}: {} platforms, {} decorations, enemies {:?}",
        level,
        stack.len() + 1,
        decorations.len(),
        enemies.iter().map(|e| e.kind.name()).collect::<Vec<_>>()
    );

    let mut platforms = Vec::with_capacity(stack.len() + 1);
    platforms.push(FLOOR);
    platforms.extend(stack);

    LevelLayout {
        level,
        platforms,
        decorations,
        goal,
        enemies,
    }
}

/// Scatter, then run the passes in order
fn build_stack(level: u32, count: usize, bounds: SpacingBounds, rng: &mut Pcg32) -> Vec<Rect> {
    let min_w = 80u32.saturating_sub(level).max(40);
    let max_w = (80 + level).min(120);

    let mut stack: Vec<Rect> = (0..count)
        .map(|_| {
            let w = rng.random_range(min_w..=max_w) as f32;
            let x = rng.random_range(0..=(WIDTH - w) as u32) as f32;
            let y = rng.random_range(40..=(HEIGHT - PLATFORM_HEIGHT - 300.0) as u32) as f32;
            Rect::new(x, y, w, PLATFORM_HEIGHT)
        })
        .collect();

    stack.sort_by(|a, b| a.y.total_cmp(&b.y));
    apply_spacing(&mut stack, bounds);
    apply_horizontal_reach(&mut stack);
    anchor_to_floor(&mut stack, bounds);
    clamp_to_field(&mut stack);
    stack
}

/// Clamp each gap to the previous platform into `[min, max]`
pub fn apply_spacing(stack: &mut [Rect], bounds: SpacingBounds) {
    for i in 1..stack.len() {
        let prev = stack[i - 1].y;
        let gap = stack[i].y - prev;
        if gap > bounds.max {
            stack[i].y = prev + bounds.max;
        } else if gap < bounds.min {
            stack[i].y = prev + bounds.min;
        }
    }
}

/// Pull each platform to within jump distance of the one above it
pub fn apply_horizontal_reach(stack: &mut [Rect]) {
    for i in 1..stack.len() {
        let prev_cx = stack[i - 1].center_x();
        let rect = &mut stack[i];
        if (rect.center_x() - prev_cx).abs() > MAX_HORIZONTAL_DISTANCE {
            let half = rect.w / 2.0;
            rect.x = if rect.center_x() < prev_cx {
                (prev_cx - MAX_HORIZONTAL_DISTANCE - half).max(0.0)
            } else {
                (prev_cx + MAX_HORIZONTAL_DISTANCE - half).min(WIDTH - rect.w)
            };
        }
    }
}

/// Put the lowest platform one jump above the floor, then walk upward
///
/// A platform keeps its height unless the gap to the one below it leaves
/// `[min, max]`, in which case it moves just far enough to fit.
pub fn anchor_to_floor(stack: &mut [Rect], bounds: SpacingBounds) {
    let Some(last) = stack.len().checked_sub(1) else {
        return;
    };
    stack[last].y = BAND_BOTTOM;
    for i in (0..last).rev() {
        let below = stack[i + 1].y;
        let gap = below - stack[i].y;
        stack[i].y = below - gap.clamp(bounds.min, bounds.max);
    }
}

/// Force each platform inside the field
pub fn clamp_to_field(stack: &mut [Rect]) {
    for rect in stack.iter_mut() {
        rect.y = rect.y.clamp(BAND_TOP, BAND_BOTTOM);
        rect.x = rect.x.clamp(0.0, MAX_PLATFORM_X.min(WIDTH - rect.w));
    }
}

/// Index of the first platform breaking the traversal guarantee
///
/// Checks, in order: the lowest platform is one jump above the floor, every
/// consecutive vertical gap is within `bounds`, every consecutive horizontal
/// center distance is within `MAX_HORIZONTAL_DISTANCE`, and every platform
/// lies inside the field.
pub fn first_violation(stack: &[Rect], bounds: SpacingBounds) -> Option<usize> {
    let last = stack.len().checked_sub(1)?;
    if FLOOR.top() - stack[last].top() > MAX_JUMP_RISE + EPSILON {
        return Some(last);
    }
    for (i, rect) in stack.iter().enumerate() {
        if rect.left() < -EPSILON
            || rect.right() > WIDTH + EPSILON
            || rect.top() < BAND_TOP - EPSILON
            || rect.top() > BAND_BOTTOM + EPSILON
        {
            return Some(i);
        }
        if i == 0 {
            continue;
        }
        let prev = stack[i - 1];
        let gap = rect.top() - prev.top();
        if gap < bounds.min - EPSILON || gap > bounds.max + EPSILON {
            return Some(i);
        }
        if (rect.center_x() - prev.center_x()).abs() > MAX_HORIZONTAL_DISTANCE + EPSILON {
            return Some(i);
        }
    }
    None
}

/// Whether a layout's climbable stack satisfies the traversal guarantee
pub fn is_traversable(layout: &LevelLayout) -> bool {
    let stack = layout.stack();
    first_violation(stack, spacing_bounds(layout.level, stack.len())).is_none()
}

/// Last resort: fix gaps exactly and stack platforms over one another
fn repair(stack: &mut [Rect], bounds: SpacingBounds) {
    for i in 1..stack.len() {
        let prev = stack[i - 1];
        let gap = stack[i].y - prev.y;
        stack[i].y = prev.y + gap.clamp(bounds.min, bounds.max);
        if (stack[i].center_x() - prev.center_x()).abs() > MAX_HORIZONTAL_DISTANCE {
            let w = stack[i].w;
            stack[i].x = (prev.center_x() - w / 2.0).clamp(0.0, MAX_PLATFORM_X.min(WIDTH - w));
        }
    }
    anchor_to_floor(stack, bounds);
    clamp_to_field(stack);
}

/// Goal sits on the topmost platform
fn place_goal(stack: &[Rect]) -> Rect {
    let top = stack.first().copied().unwrap_or(FLOOR);
    let x = (top.center_x() - GOAL_SIZE / 2.0).clamp(0.0, WIDTH - GOAL_SIZE);
    let y = (top.top() - GOAL_SIZE).clamp(0.0, HEIGHT - 60.0);
    Rect::new(x, y, GOAL_SIZE, GOAL_SIZE)
}

/// Far enough from both the player spawn and the goal
pub fn is_safe_spawn(pos: Vec2, goal: Rect) -> bool {
    pos.distance(PLAYER_SPAWN) >= ENEMY_SAFE_DISTANCE
        && pos.distance(Vec2::new(goal.x, goal.y)) >= ENEMY_SAFE_DISTANCE
}

fn place_enemies(level: u32, stack: &[Rect], goal: Rect, rng: &mut Pcg32) -> Vec<EnemySpawn> {
    let mut spawns = Vec::new();
    for index in 0..enemy_count(level) {
        let mut placed = None;
        for attempt in 0..ENEMY_SPAWN_ATTEMPTS {
            let candidate = if index == 0 && attempt == 0 {
                FIRST_ENEMY_SPOT
            } else {
                random_spawn(index, stack, rng)
            };
            if is_safe_spawn(candidate, goal) {
                placed = Some(candidate);
                break;
            }
        }
        let pos = placed.unwrap_or_else(|| {
            log::debug!("Level {level}: enemy {index} using fallback corner");
            ENEMY_FALLBACK
        });
        spawns.push(EnemySpawn {
            kind: select_variant(level, rng),
            pos,
        });
    }
    spawns
}

fn random_spawn(index: usize, stack: &[Rect], rng: &mut Pcg32) -> Vec2 {
    if stack.is_empty() {
        let x = rng.random_range(50..=(WIDTH - 50.0) as u32) as f32;
        return Vec2::new(x, HEIGHT / 2.0);
    }
    let platform = stack[rng.random_range(0..stack.len())];
    let x = if index == 0 {
        platform.center_x()
    } else {
        let jitter = rng.random_range(-30..=30) as f32;
        (platform.center_x() + jitter).clamp(platform.left() + 20.0, platform.right() - 20.0)
    };
    Vec2::new(x, platform.top() - 50.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_level_one_baseline() {
        let layout = static_level_one();
        assert_eq!(layout.all_platforms().len(), 5);
        assert_eq!(layout.platforms[0], Rect::new(0.0, 560.0, 480.0, 40.0));
        assert_eq!(layout.platforms[1], Rect::new(190.0, 450.0, 100.0, 20.0));
        assert_eq!(layout.platforms[2], Rect::new(90.0, 300.0, 100.0, 20.0));
        assert_eq!(layout.platforms[3], Rect::new(340.0, 200.0, 100.0, 20.0));
        assert_eq!(layout.platforms[4], Rect::new(140.0, 100.0, 100.0, 20.0));
        assert_eq!(layout.goal, Rect::new(140.0, 60.0, 20.0, 20.0));
        assert_eq!(layout.enemies.len(), 1);
        assert_eq!(layout.enemies[0].kind, EnemyKind::Chaser);
        assert_eq!(layout.enemies[0].pos, Vec2::new(400.0, 460.0));
    }

    #[test]
    fn test_level_one_ignores_seed() {
        assert_eq!(generate_level(1, 1), generate_level(1, 999));
    }

    #[test]
    fn test_generation_deterministic() {
        for level in 2..15 {
            assert_eq!(generate_level(level, 1234), generate_level(level, 1234));
        }
    }

    #[test]
    fn test_counts_scale_with_level() {
        assert_eq!(platform_count(2), 4);
        assert_eq!(platform_count(3), 5);
        assert_eq!(platform_count(12), 8);
        assert_eq!(platform_count(60), 8);
        assert_eq!(enemy_count(2), 1);
        assert_eq!(enemy_count(4), 2);
        assert_eq!(enemy_count(8), 3);
        assert_eq!(enemy_count(100), 3);

        let layout = generate_level(9, 5);
        assert_eq!(layout.stack().len(), platform_count(9));
        assert_eq!(layout.decorations.len(), 2);
        assert_eq!(layout.enemies.len(), 3);
    }

    #[test]
    fn test_spacing_bounds_ordered() {
        for level in 2..60 {
            let b = spacing_bounds(level, platform_count(level));
            assert!(b.min < b.max);
            assert!(b.max <= MAX_JUMP_RISE);
        }
    }

    #[test]
    fn test_anchor_keeps_reachable_heights() {
        let bounds = SpacingBounds { min: 50.0, max: 100.0 };
        let mut stack = vec![
            Rect::new(0.0, 260.0, 60.0, 20.0),
            Rect::new(0.0, 300.0, 60.0, 20.0),
            Rect::new(0.0, 320.0, 60.0, 20.0),
        ];
        anchor_to_floor(&mut stack, bounds);
        assert_eq!(stack[2].y, BAND_BOTTOM);
        assert_eq!(stack[1].y, BAND_BOTTOM - 100.0);
        // 80 below it is already within reach
        assert_eq!(stack[0].y, 260.0);
        assert_eq!(first_violation(&stack, bounds), None);
    }

    #[test]
    fn test_seeds_vary_heights() {
        for level in [2, 6, 12] {
            let layouts: std::collections::HashSet<Vec<u32>> = (0..50)
                .map(|seed| {
                    generate_level(level, seed)
                        .stack()
                        .iter()
                        .map(|r| r.y.to_bits())
                        .collect()
                })
                .collect();
            assert!(layouts.len() >= 10, "level {level}: {} layouts", layouts.len());
        }
    }

    #[test]
    fn test_goal_on_top_platform() {
        let layout = generate_level(4, 77);
        let top = layout.stack()[0];
        assert_eq!(layout.goal.bottom(), top.top());
        assert!(layout.goal.left() >= top.left() - GOAL_SIZE);
    }

    #[test]
    fn test_enemies_spawn_safely_or_fallback() {
        for seed in 0..30 {
            let layout = generate_level(10, seed);
            for spawn in &layout.enemies {
                assert!(spawn.pos == ENEMY_FALLBACK || is_safe_spawn(spawn.pos, layout.goal));
            }
        }
    }

    #[test]
    fn test_repair_fixes_bad_stack() {
        let bounds = spacing_bounds(5, 3);
        let mut stack = vec![
            Rect::new(0.0, 40.0, 60.0, 20.0),
            Rect::new(400.0, 45.0, 60.0, 20.0),
            Rect::new(10.0, 400.0, 60.0, 20.0),
        ];
        assert!(first_violation(&stack, bounds).is_some());
        repair(&mut stack, bounds);
        assert_eq!(first_violation(&stack, bounds), None);
    }
}
