//! Achievement tracking
//!
//! A fixed catalog of milestones, each bound to one lifetime metric. Progress
//! only ever rises and an unlock never reverts. Any new unlock is written to
//! the save store immediately and its reward credited to the coin balance.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::persistence::SaveStore;

/// Metric an achievement is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Level number just completed
    LevelReached,
    CoinsCollected,
    NoDamageLevels,
    PowerupsUsed,
    EncountersSurvived,
    SpeedRuns,
    Jumps,
    HatsOwned,
}

/// Catalog entry: (id, name, description, metric, requirement, reward)
type CatalogEntry = (&'static str, &'static str, &'static str, Metric, u64, u64);

const CATALOG: [CatalogEntry; 12] = [
    ("first_level", "First Steps", "Complete your first level", Metric::LevelReached, 1, 5),
    ("level_5", "Getting Started", "Reach level 5", Metric::LevelReached, 5, 10),
    ("level_10", "Skilled Jumper", "Reach level 10", Metric::LevelReached, 10, 20),
    ("level_25", "Sky Master", "Reach level 25", Metric::LevelReached, 25, 50),
    ("collect_100_coins", "Coin Collector", "Collect 100 coins", Metric::CoinsCollected, 100, 15),
    ("collect_500_coins", "Treasure Hunter", "Collect 500 coins", Metric::CoinsCollected, 500, 50),
    (
        "no_damage_level",
        "Untouchable",
        "Complete a level without taking damage",
        Metric::NoDamageLevels,
        1,
        25,
    ),
    ("use_10_powerups", "Power User", "Use 10 power-ups", Metric::PowerupsUsed, 10, 15),
    (
        "defeat_10_enemies",
        "Monster Slayer",
        "Survive 10 enemy encounters",
        Metric::EncountersSurvived,
        10,
        20,
    ),
    (
        "speed_run",
        "Speed Demon",
        "Complete a level in under 30 seconds",
        Metric::SpeedRuns,
        1,
        30,
    ),
    ("jump_master", "Jump Master", "Make 1000 jumps", Metric::Jumps, 1000, 25),
    ("hat_collector", "Fashion Forward", "Buy your first hat", Metric::HatsOwned, 1, 10),
];

/// Persisted form of one achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub id: String,
    pub unlocked: bool,
    pub progress: u64,
    /// Unix seconds
    pub unlocked_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub metric: Metric,
    pub requirement: u64,
    pub reward: u64,
    pub progress: u64,
    pub unlocked: bool,
    pub unlocked_at: Option<u64>,
}

impl Achievement {
    fn from_catalog(entry: &CatalogEntry) -> Self {
        let (id, name, description, metric, requirement, reward) = *entry;
        Self {
            id,
            name,
            description,
            metric,
            requirement,
            reward,
            progress: 0,
            unlocked: false,
            unlocked_at: None,
        }
    }

    /// Update progress; true exactly once, on the unlocking call
    pub fn check_unlock(&mut self, value: u64, now: u64) -> bool {
        if self.unlocked {
            return false;
        }
        self.progress = self.progress.max(value.min(self.requirement));
        if value >= self.requirement {
            self.unlocked = true;
            self.unlocked_at = Some(now);
            return true;
        }
        false
    }

    pub fn progress_percentage(&self) -> u32 {
        if self.requirement == 0 {
            return 100;
        }
        ((self.progress * 100 / self.requirement) as u32).min(100)
    }

    pub fn record(&self) -> AchievementRecord {
        AchievementRecord {
            id: self.id.to_string(),
            unlocked: self.unlocked,
            progress: self.progress,
            unlocked_at: self.unlocked_at,
        }
    }
}

/// Summary of a fresh unlock, for notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unlocked {
    pub id: &'static str,
    pub name: &'static str,
    pub reward: u64,
}

#[derive(Debug, Clone)]
pub struct AchievementEngine {
    achievements: Vec<Achievement>,
}

impl Default for AchievementEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AchievementEngine {
    pub fn new() -> Self {
        Self {
            achievements: CATALOG.iter().map(Achievement::from_catalog).collect(),
        }
    }

    /// Catalog with saved state applied; unknown ids are ignored
    pub fn from_records(records: &[AchievementRecord]) -> Self {
        let mut engine = Self::new();
        for record in records {
            if let Some(a) = engine.achievements.iter_mut().find(|a| a.id == record.id) {
                a.unlocked = record.unlocked;
                a.progress = record.progress.min(a.requirement);
                a.unlocked_at = record.unlocked_at;
            } else {
                log::debug!("Ignoring unknown achievement '{}'", record.id);
            }
        }
        engine
    }

    pub fn records(&self) -> Vec<AchievementRecord> {
        self.achievements.iter().map(Achievement::record).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn all(&self) -> &[Achievement] {
        &self.achievements
    }

    /// Single-achievement check without persistence
    pub fn check_unlock(&mut self, id: &str, value: u64, now: u64) -> Option<Unlocked> {
        let a = self.achievements.iter_mut().find(|a| a.id == id)?;
        a.check_unlock(value, now).then(|| Unlocked {
            id: a.id,
            name: a.name,
            reward: a.reward,
        })
    }

    /// Feed a metric value to every achievement bound to it
    ///
    /// New unlocks credit their reward and are persisted before returning.
    pub fn record(&mut self, store: &mut SaveStore, metric: Metric, value: u64) -> Vec<Unlocked> {
        let now = unix_now();
        let unlocked: Vec<Unlocked> = self
            .achievements
            .iter_mut()
            .filter(|a| a.metric == metric)
            .filter_map(|a| {
                a.check_unlock(value, now).then(|| Unlocked {
                    id: a.id,
                    name: a.name,
                    reward: a.reward,
                })
            })
            .collect();

        if !unlocked.is_empty() {
            for u in &unlocked {
                log::info!("Achievement unlocked: {} (+{} coins)", u.name, u.reward);
                store.add_coins(u.reward);
            }
            store.set_achievement_records(self.records());
        }
        unlocked
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.unlocked)
    }

    pub fn locked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| !a.unlocked)
    }

    pub fn completion_percentage(&self) -> u32 {
        if self.achievements.is_empty() {
            return 0;
        }
        (self.unlocked().count() * 100 / self.achievements.len()) as u32
    }

    pub fn total_rewards_earned(&self) -> u64 {
        self.unlocked().map(|a| a.reward).sum()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        let engine = AchievementEngine::new();
        assert_eq!(engine.all().len(), 12);
        assert_eq!(engine.completion_percentage(), 0);
        let jump = engine.get("jump_master").unwrap();
        assert_eq!((jump.requirement, jump.reward), (1000, 25));
    }

    #[test]
    fn test_coin_threshold() {
        let mut engine = AchievementEngine::new();
        assert!(engine.check_unlock("collect_100_coins", 99, 1).is_none());
        assert_eq!(engine.get("collect_100_coins").unwrap().progress, 99);
        let unlocked = engine.check_unlock("collect_100_coins", 102, 2).unwrap();
        assert_eq!(unlocked.reward, 15);
        let a = engine.get("collect_100_coins").unwrap();
        assert_eq!(a.progress, 100);
        assert_eq!(a.progress_percentage(), 100);
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let mut engine = AchievementEngine::new();
        engine.check_unlock("level_5", 5, 100);
        assert!(engine.check_unlock("level_5", 5, 200).is_none());
        assert!(engine.check_unlock("level_5", 50, 300).is_none());
        let a = engine.get("level_5").unwrap();
        assert_eq!(a.unlocked_at, Some(100));
        assert_eq!(a.progress, 5);
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut engine = AchievementEngine::new();
        engine.check_unlock("jump_master", 400, 1);
        engine.check_unlock("jump_master", 10, 1);
        assert_eq!(engine.get("jump_master").unwrap().progress, 400);
    }

    #[test]
    fn test_record_credits_and_persists() {
        let mut store = SaveStore::in_memory();
        let mut engine = AchievementEngine::new();
        let unlocked = engine.record(&mut store, Metric::LevelReached, 5);
        let ids: Vec<_> = unlocked.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["first_level", "level_5"]);
        assert_eq!(store.coins(), 15);
        assert_eq!(store.achievement_records().len(), 12);

        // Nothing new: no credit
        assert!(engine.record(&mut store, Metric::LevelReached, 5).is_empty());
        assert_eq!(store.coins(), 15);
        assert_eq!(engine.total_rewards_earned(), 15);
    }

    #[test]
    fn test_records_round_trip_ignores_unknown() {
        let mut engine = AchievementEngine::new();
        engine.check_unlock("speed_run", 1, 42);
        let mut records = engine.records();
        records.push(AchievementRecord {
            id: "retired".to_string(),
            unlocked: true,
            progress: 1,
            unlocked_at: None,
        });
        let restored = AchievementEngine::from_records(&records);
        assert!(restored.get("speed_run").unwrap().unlocked);
        assert_eq!(restored.get("speed_run").unwrap().unlocked_at, Some(42));
        assert_eq!(restored.unlocked().count(), 1);
        assert_eq!(restored.locked().count(), 11);
        assert_eq!(restored.completion_percentage(), 8);
    }
}
