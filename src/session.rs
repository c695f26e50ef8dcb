//! Screen flow and run bookkeeping
//!
//! `Session` owns the save store and everything that outlives a single level.
//! While a level is being played it drives the simulation one tick at a time,
//! feeds the tick's events to effects, audio and achievements, and settles
//! the level's outcome into the save data.

use glam::Vec2;

use crate::achievements::{AchievementEngine, Metric, Unlocked};
use crate::audio::AudioManager;
use crate::consts::WIDTH;
use crate::effects::{EffectsLayer, GOLD};
use crate::persistence::SaveStore;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, LevelOutcome, PlayerStats, PowerUpKind, TickInput, tick};

/// Price of any hat, in coins
pub const HAT_PRICE: u64 = 20;
/// Levels finished faster than this count as speed runs
pub const SPEED_RUN_SECS: f32 = 30.0;
/// Scores at or below this never show the high score screen
pub const HIGHSCORE_MIN_SCORE: u32 = 2;

const NOTIFICATION_POS: Vec2 = Vec2::new(WIDTH / 2.0, 100.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    StartScreen,
    Game,
    Paused,
    GameOver,
    NewHighscore,
    Exit,
}

impl Screen {
    /// Name stored in the save data
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::MainMenu => "MAIN_MENU",
            Screen::StartScreen => "START_SCREEN",
            Screen::Game => "GAME",
            Screen::Paused => "PAUSED",
            Screen::GameOver => "GAME_OVER",
            Screen::NewHighscore => "NEW_HIGHSCORE",
            Screen::Exit => "EXIT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "MAIN_MENU" => Screen::MainMenu,
            "START_SCREEN" => Screen::StartScreen,
            "GAME" => Screen::Game,
            "PAUSED" => Screen::Paused,
            "GAME_OVER" => Screen::GameOver,
            "NEW_HIGHSCORE" => Screen::NewHighscore,
            "EXIT" => Screen::Exit,
            _ => return None,
        })
    }
}

/// How the last level ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSummary {
    pub level: u32,
    pub outcome: LevelOutcome,
    pub elapsed_secs: f32,
    pub damage_taken: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    Bought,
    AlreadyOwned,
    InsufficientCoins,
}

pub struct Session {
    screen: Screen,
    store: SaveStore,
    achievements: AchievementEngine,
    effects: EffectsLayer,
    audio: AudioManager,
    settings: Settings,
    seed: u64,
    level: Option<GameState>,
    last_summary: Option<LevelSummary>,
    notifications: Vec<Unlocked>,
}

impl Session {
    pub fn new(store: SaveStore, settings: Settings, mut audio: AudioManager, seed: u64) -> Self {
        audio.apply_settings(&settings);
        let achievements = AchievementEngine::from_records(store.achievement_records());
        log::info!(
            "Session ready: seed {seed:#x}, {}% achievements",
            achievements.completion_percentage()
        );
        Self {
            screen: Screen::MainMenu,
            effects: EffectsLayer::new(&settings, seed),
            store,
            achievements,
            audio,
            settings,
            seed,
            level: None,
            last_summary: None,
            notifications: Vec::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    pub fn achievements(&self) -> &AchievementEngine {
        &self.achievements
    }

    pub fn effects(&self) -> &EffectsLayer {
        &self.effects
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Level being played or paused
    pub fn level(&self) -> Option<&GameState> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut GameState> {
        self.level.as_mut()
    }

    pub fn last_summary(&self) -> Option<LevelSummary> {
        self.last_summary
    }

    /// Unlocks since the last call, oldest first
    pub fn take_notifications(&mut self) -> Vec<Unlocked> {
        std::mem::take(&mut self.notifications)
    }

    /// Swap in new preferences and save them next to the save data
    pub fn apply_settings(&mut self, settings: Settings) {
        self.effects.apply_settings(&settings);
        self.audio.apply_settings(&settings);
        if let Some(dir) = self.store.dir() {
            settings.save(dir);
        }
        self.settings = settings;
    }

    fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            log::info!("Screen {} -> {}", self.screen.as_str(), screen.as_str());
            self.screen = screen;
        }
        self.store.set_game_state(screen.as_str());
    }

    pub fn open_start_screen(&mut self) {
        self.set_screen(Screen::StartScreen);
    }

    /// Load the level the save data points at and enter `Game`
    pub fn start_game(&mut self) {
        let level = self.store.score().max(1);
        let mut stats = self.store.player_stats();
        stats.coins = self.store.coins();

        let state = GameState::new(self.seed, level, &stats);
        log::info!(
            "Starting level {level}: {} platforms, {} enemies",
            state.platforms.len(),
            state.enemies.len()
        );
        self.level = Some(state);
        self.store.set_level(level);
        self.set_screen(Screen::Game);
    }

    /// Advance the current level by one tick
    ///
    /// Does nothing outside `Game`. A finished level is settled before
    /// returning, so the screen may change.
    pub fn step(&mut self, input: &TickInput) {
        if self.screen != Screen::Game {
            return;
        }
        let Some(state) = self.level.as_mut() else {
            return;
        };

        tick(state, input);
        let events = state.drain_events();
        let outcome = state.outcome;

        self.effects.consume(&events);
        self.audio.consume(&events);
        for event in &events {
            self.handle_event(event);
        }
        self.effects.update();

        match outcome {
            LevelOutcome::Completed => self.complete_level(),
            LevelOutcome::Failed => self.end_run(),
            LevelOutcome::InProgress => {}
        }
    }

    fn handle_event(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::Jumped { .. } => {
                let total = self.store.add_jumps(1);
                self.record(Metric::Jumps, total);
            }
            GameEvent::Collected {
                kind: PowerUpKind::Coin { value },
                ..
            } => {
                if let Some(state) = &self.level {
                    self.store.set_coins(state.player.coins);
                }
                let total = self.store.add_coins_collected(u64::from(value));
                self.record(Metric::CoinsCollected, total);
            }
            GameEvent::Collected { .. } => {
                let total = self.store.add_powerups_used(1);
                self.record(Metric::PowerupsUsed, total);
            }
            GameEvent::EncounterSurvived { .. } => {
                let total = self.store.add_encounters_survived(1);
                self.record(Metric::EncountersSurvived, total);
            }
            GameEvent::PauseRequested => self.pause(),
            GameEvent::Landed { .. }
            | GameEvent::Damaged { .. }
            | GameEvent::ShotFired { .. }
            | GameEvent::GoalReached { .. }
            | GameEvent::PlayerDied { .. } => {}
        }
    }

    /// Feed a metric and surface whatever it unlocked
    fn record(&mut self, metric: Metric, value: u64) {
        let unlocked = self.achievements.record(&mut self.store, metric, value);
        if unlocked.is_empty() {
            return;
        }
        for u in &unlocked {
            self.effects
                .add_text(NOTIFICATION_POS, format!("Achievement: {}!", u.name), GOLD);
        }
        // Rewards land in the balance; keep the live player in step
        if let Some(state) = self.level.as_mut() {
            state.player.coins = self.store.coins();
        }
        self.notifications.extend(unlocked);
    }

    fn complete_level(&mut self) {
        let Some(state) = self.level.take() else {
            return;
        };
        let score = self.store.score();
        let elapsed = state.elapsed_secs();

        self.record(Metric::LevelReached, u64::from(score));
        if elapsed < SPEED_RUN_SECS {
            self.record(Metric::SpeedRuns, 1);
        }
        if !state.damage_taken {
            self.record(Metric::NoDamageLevels, 1);
        }

        let high = self.store.record_high_score(score);
        let next = score + 1;
        self.store.set_score(next);
        self.store.set_level(next);

        let mut stats = state.player.stats();
        stats.coins = self.store.coins();
        self.store.set_player_stats(&stats);

        self.last_summary = Some(summary(&state));
        log::info!("Level {score} complete in {elapsed:.1}s");

        if next > high && next > HIGHSCORE_MIN_SCORE {
            self.set_screen(Screen::NewHighscore);
        } else {
            self.set_screen(Screen::GameOver);
        }
    }

    /// Player died: the run starts over from level 1
    fn end_run(&mut self) {
        let Some(state) = self.level.take() else {
            return;
        };
        log::info!("Died on level {}", state.level);

        self.store.set_score(1);
        self.store.set_level(1);
        let stats = PlayerStats {
            coins: self.store.coins(),
            ..PlayerStats::default()
        };
        self.store.set_player_stats(&stats);

        self.last_summary = Some(summary(&state));
        self.set_screen(Screen::GameOver);
    }

    pub fn pause(&mut self) {
        if self.screen == Screen::Game {
            self.set_screen(Screen::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.screen == Screen::Paused && self.level.is_some() {
            self.set_screen(Screen::Game);
        }
    }

    /// Abandon any level in progress
    pub fn quit_to_menu(&mut self) {
        if let Some(state) = self.level.take() {
            log::info!("Abandoned level {}", state.level);
        }
        self.set_screen(Screen::MainMenu);
    }

    /// Leave a result screen for the start screen
    pub fn acknowledge(&mut self) {
        if matches!(self.screen, Screen::GameOver | Screen::NewHighscore) {
            self.set_screen(Screen::StartScreen);
        }
    }

    pub fn exit(&mut self) {
        self.level = None;
        self.set_screen(Screen::Exit);
    }

    /// Buy and wear a hat
    pub fn buy_hat(&mut self, hat: &str) -> Purchase {
        if self.store.owns_hat(hat) {
            return Purchase::AlreadyOwned;
        }
        if !self.store.spend_coins(HAT_PRICE) {
            return Purchase::InsufficientCoins;
        }
        self.store.add_hat(hat);
        log::info!("Bought hat '{hat}' ({} coins left)", self.store.coins());

        if let Some(state) = self.level.as_mut() {
            state.player.coins = self.store.coins();
        }
        let owned = self.store.hats_owned() as u64;
        self.record(Metric::HatsOwned, owned);
        Purchase::Bought
    }
}

fn summary(state: &GameState) -> LevelSummary {
    LevelSummary {
        level: state.level,
        outcome: state.outcome,
        elapsed_secs: state.elapsed_secs(),
        damage_taken: state.damage_taken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PowerUp;

    fn session() -> Session {
        Session::new(
            SaveStore::in_memory(),
            Settings::default(),
            AudioManager::default(),
            3,
        )
    }

    #[test]
    fn test_start_game_enters_level_one() {
        let mut s = session();
        s.open_start_screen();
        s.start_game();
        assert_eq!(s.screen(), Screen::Game);
        assert_eq!(s.level().map(|l| l.level), Some(1));
        assert_eq!(s.store().game_state(), "GAME");
    }

    #[test]
    fn test_step_ignored_outside_game() {
        let mut s = session();
        s.step(&TickInput::default());
        assert!(s.level().is_none());
        assert_eq!(s.screen(), Screen::MainMenu);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut s = session();
        s.start_game();
        s.step(&TickInput {
            pointer: Some(Vec2::new(30.0, 30.0)),
            pointer_pressed: true,
            ..Default::default()
        });
        assert_eq!(s.screen(), Screen::Paused);

        let ticks = s.level().map(|l| l.tick_count);
        s.step(&TickInput::default());
        assert_eq!(s.level().map(|l| l.tick_count), ticks);

        s.resume();
        assert_eq!(s.screen(), Screen::Game);
    }

    #[test]
    fn test_goal_advances_score() {
        let mut s = session();
        s.start_game();
        let state = s.level_mut().unwrap();
        let goal = state.goal;
        state.player.body.pos = Vec2::new(goal.center_x(), goal.bottom());
        s.step(&TickInput::default());

        assert_eq!(s.store().score(), 2);
        assert_eq!(s.store().high_score(), 1);
        // Score 2 is not enough for the high score screen
        assert_eq!(s.screen(), Screen::GameOver);
        assert!(s.level().is_none());

        let ids: Vec<_> = s.take_notifications().iter().map(|u| u.id).collect();
        assert!(ids.contains(&"first_level"));
        assert!(ids.contains(&"speed_run"));
        assert!(ids.contains(&"no_damage_level"));
        // 5 + 30 + 25
        assert_eq!(s.store().coins(), 60);
        assert_eq!(
            s.last_summary().map(|r| r.outcome),
            Some(LevelOutcome::Completed)
        );
    }

    #[test]
    fn test_new_highscore_screen() {
        let mut store = SaveStore::in_memory();
        store.set_score(3);
        store.record_high_score(3);
        let mut s = Session::new(store, Settings::default(), AudioManager::default(), 3);
        s.start_game();
        let state = s.level_mut().unwrap();
        let goal = state.goal;
        state.player.body.pos = Vec2::new(goal.center_x(), goal.bottom());
        s.step(&TickInput::default());
        assert_eq!(s.screen(), Screen::NewHighscore);
        assert_eq!(s.store().score(), 4);
    }

    #[test]
    fn test_death_resets_run_but_keeps_coins() {
        let mut store = SaveStore::in_memory();
        store.set_score(4);
        store.add_coins(12);
        let mut s = Session::new(store, Settings::default(), AudioManager::default(), 3);
        s.start_game();
        assert_eq!(s.level().map(|l| l.player.coins), Some(12));

        let state = s.level_mut().unwrap();
        state.player.health = 1;
        state.player.take_damage();
        state.fail_level();
        s.step(&TickInput::default());

        assert_eq!(s.screen(), Screen::GameOver);
        assert_eq!(s.store().score(), 1);
        assert_eq!(s.store().coins(), 12);
        assert_eq!(s.store().player_stats().health, PlayerStats::default().health);
    }

    #[test]
    fn test_coin_pickup_counts() {
        let mut s = session();
        s.start_game();
        let state = s.level_mut().unwrap();
        let at = state.player.hitbox().center();
        state.powerups.push(PowerUp::new(99, PowerUpKind::Coin { value: 3 }, at));
        s.step(&TickInput::default());

        assert_eq!(s.store().progress().coins_collected, 3);
        assert_eq!(s.store().coins(), 3);
        assert_eq!(s.level().map(|l| l.player.coins), Some(3));
    }

    #[test]
    fn test_jumps_are_counted() {
        let mut s = session();
        s.start_game();
        for _ in 0..60 {
            s.step(&TickInput::default());
        }
        s.step(&TickInput {
            jump: true,
            ..Default::default()
        });
        s.step(&TickInput {
            jump: true,
            ..Default::default()
        });
        assert_eq!(s.store().progress().jumps, 1);
        assert!(s.level().unwrap().player.body.vel.y < 0.0);
    }

    #[test]
    fn test_hat_purchase() {
        let mut store = SaveStore::in_memory();
        store.add_coins(25);
        let mut s = Session::new(store, Settings::default(), AudioManager::default(), 3);

        assert_eq!(s.buy_hat("crown"), Purchase::Bought);
        // 25 - 20 + 10 reward
        assert_eq!(s.store().coins(), 15);
        assert_eq!(s.store().hat(), "crown");
        assert!(s.achievements().get("hat_collector").unwrap().unlocked);

        assert_eq!(s.buy_hat("crown"), Purchase::AlreadyOwned);
        assert_eq!(s.buy_hat("tophat"), Purchase::InsufficientCoins);
        assert_eq!(s.store().coins(), 15);
    }

    #[test]
    fn test_quit_abandons_level() {
        let mut s = session();
        s.start_game();
        s.pause();
        s.quit_to_menu();
        assert_eq!(s.screen(), Screen::MainMenu);
        assert!(s.level().is_none());
        s.resume();
        assert_eq!(s.screen(), Screen::MainMenu);
    }

    #[test]
    fn test_screen_names_round_trip() {
        for screen in [
            Screen::MainMenu,
            Screen::StartScreen,
            Screen::Game,
            Screen::Paused,
            Screen::GameOver,
            Screen::NewHighscore,
            Screen::Exit,
        ] {
            assert_eq!(Screen::parse(screen.as_str()), Some(screen));
        }
    }
}
