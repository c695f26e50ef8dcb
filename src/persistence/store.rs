use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::SaveError;
use crate::achievements::AchievementRecord;
use crate::sim::PlayerStats;

const PROGRESS_FILE: &str = "progress.json";
const STATS_FILE: &str = "player_stats.json";
const ACHIEVEMENTS_FILE: &str = "achievements.json";

/// Scalar progress values and lifetime counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    /// Current level number (the run's score)
    pub score: u32,
    /// Best score ever reached, only raised
    pub high_score: u32,
    pub level: u32,
    /// Spendable balance
    pub coins: u64,
    /// Lifetime coins picked up; spending never lowers it
    pub coins_collected: u64,
    pub jumps: u64,
    pub powerups_used: u64,
    pub encounters_survived: u64,
    /// Selected cosmetic
    pub hat: String,
    pub hats_owned: Vec<String>,
    /// Last screen the session was on
    pub game_state: String,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            score: 1,
            high_score: 0,
            level: 1,
            coins: 0,
            coins_collected: 0,
            jumps: 0,
            powerups_used: 0,
            encounters_survived: 0,
            hat: "none".to_string(),
            hats_owned: Vec::new(),
            game_state: "MAIN_MENU".to_string(),
        }
    }
}

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SaveError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Serialize to a temporary file, then rename over the target
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Cached save data with write-through to a directory
///
/// Reads never fail: a missing or corrupt file yields defaults. Writes that
/// fail are logged and dropped; the cache still holds the new value.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: Option<PathBuf>,
    progress: Progress,
    stats: PlayerStats,
    achievements: Vec<AchievementRecord>,
}

impl SaveStore {
    /// Open (or create) a save directory and load everything in it
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(err) = fs::create_dir_all(&dir) {
            log::warn!("Cannot create save dir {}: {err}", dir.display());
        }
        let store = Self {
            progress: load_or_default(&dir, PROGRESS_FILE),
            stats: load_or_default(&dir, STATS_FILE),
            achievements: load_or_default(&dir, ACHIEVEMENTS_FILE),
            dir: Some(dir),
        };
        log::info!(
            "Loaded save data: level {}, high score {}, {} coins",
            store.progress.score,
            store.progress.high_score,
            store.progress.coins
        );
        store
    }

    /// Store with no backing directory
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            progress: Progress::default(),
            stats: PlayerStats::default(),
            achievements: Vec::new(),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    fn persist<T: Serialize>(&self, name: &str, value: &T) {
        let Some(dir) = &self.dir else { return };
        if let Err(err) = write_json(&dir.join(name), value) {
            log::warn!("Failed to write {name}: {err}");
        }
    }

    fn update_progress(&mut self, f: impl FnOnce(&mut Progress)) {
        f(&mut self.progress);
        self.persist(PROGRESS_FILE, &self.progress);
    }

    // === Score / level ===

    pub fn score(&self) -> u32 {
        self.progress.score
    }

    pub fn set_score(&mut self, score: u32) {
        self.update_progress(|p| p.score = score);
    }

    pub fn high_score(&self) -> u32 {
        self.progress.high_score
    }

    /// Max-merge; returns the stored value
    pub fn record_high_score(&mut self, score: u32) -> u32 {
        if score > self.progress.high_score {
            self.update_progress(|p| p.high_score = score);
        }
        self.progress.high_score
    }

    pub fn level(&self) -> u32 {
        self.progress.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.update_progress(|p| p.level = level);
    }

    pub fn game_state(&self) -> &str {
        &self.progress.game_state
    }

    pub fn set_game_state(&mut self, state: &str) {
        if self.progress.game_state != state {
            self.update_progress(|p| p.game_state = state.to_string());
        }
    }

    // === Economy ===

    pub fn coins(&self) -> u64 {
        self.progress.coins
    }

    pub fn set_coins(&mut self, coins: u64) {
        if self.progress.coins != coins {
            self.update_progress(|p| p.coins = coins);
        }
    }

    pub fn add_coins(&mut self, amount: u64) -> u64 {
        self.update_progress(|p| p.coins = p.coins.saturating_add(amount));
        self.progress.coins
    }

    /// Deduct exactly `amount` if the balance allows it
    pub fn spend_coins(&mut self, amount: u64) -> bool {
        if self.progress.coins < amount {
            return false;
        }
        self.update_progress(|p| p.coins -= amount);
        true
    }

    pub fn hat(&self) -> &str {
        &self.progress.hat
    }

    pub fn owns_hat(&self, hat: &str) -> bool {
        self.progress.hats_owned.iter().any(|h| h == hat)
    }

    pub fn hats_owned(&self) -> usize {
        self.progress.hats_owned.len()
    }

    /// Record ownership and select it
    pub fn add_hat(&mut self, hat: &str) {
        self.update_progress(|p| {
            if !p.hats_owned.iter().any(|h| h == hat) {
                p.hats_owned.push(hat.to_string());
            }
            p.hat = hat.to_string();
        });
    }

    // === Lifetime counters (each returns the new total) ===

    pub fn add_coins_collected(&mut self, amount: u64) -> u64 {
        self.update_progress(|p| p.coins_collected = p.coins_collected.saturating_add(amount));
        self.progress.coins_collected
    }

    pub fn add_jumps(&mut self, count: u64) -> u64 {
        self.update_progress(|p| p.jumps = p.jumps.saturating_add(count));
        self.progress.jumps
    }

    pub fn add_powerups_used(&mut self, count: u64) -> u64 {
        self.update_progress(|p| p.powerups_used = p.powerups_used.saturating_add(count));
        self.progress.powerups_used
    }

    pub fn add_encounters_survived(&mut self, count: u64) -> u64 {
        self.update_progress(|p| {
            p.encounters_survived = p.encounters_survived.saturating_add(count)
        });
        self.progress.encounters_survived
    }

    // === Structured records ===

    pub fn player_stats(&self) -> PlayerStats {
        self.stats.clone()
    }

    pub fn set_player_stats(&mut self, stats: &PlayerStats) {
        self.stats = stats.clone();
        self.persist(STATS_FILE, &self.stats);
    }

    pub fn achievement_records(&self) -> &[AchievementRecord] {
        &self.achievements
    }

    pub fn set_achievement_records(&mut self, records: Vec<AchievementRecord>) {
        self.achievements = records;
        self.persist(ACHIEVEMENTS_FILE, &self.achievements);
    }
}

fn load_or_default<T: DeserializeOwned + Default>(dir: &Path, name: &str) -> T {
    match read_json(&dir.join(name)) {
        Ok(value) => value,
        Err(err) if err.is_not_found() => {
            log::debug!("No {name}, using defaults");
            T::default()
        }
        Err(err) => {
            log::warn!("Ignoring {name}: {err}");
            T::default()
        }
    }
}
