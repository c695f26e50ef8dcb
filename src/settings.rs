//! Player preferences
//!
//! Stored as `settings.json` beside the save data. Any field missing from
//! the file takes its default, so older files keep loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::{read_json, write_json};

const SETTINGS_FILE: &str = "settings.json";

/// How many particles the effects layer may keep alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl ParticleQuality {
    pub fn name(&self) -> &'static str {
        match self {
            ParticleQuality::Low => "low",
            ParticleQuality::Medium => "medium",
            ParticleQuality::High => "high",
        }
    }

    /// Case-insensitive; accepts the names above plus "med"
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        [Self::Low, Self::Medium, Self::High]
            .into_iter()
            .find(|q| q.name() == name)
            .or_else(|| (name == "med").then_some(Self::Medium))
    }

    pub fn budget(&self) -> usize {
        match self {
            ParticleQuality::Low => 50,
            ParticleQuality::Medium => 200,
            ParticleQuality::High => 600,
        }
    }
}

/// Mixer levels, each in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSettings {
    pub master: f32,
    pub sfx: f32,
    pub music: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            master: 0.8,
            sfx: 1.0,
            music: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    pub particle_quality: ParticleQuality,
    pub particles: bool,
    pub screen_shake: bool,
    /// Accessibility switch; overrides `screen_shake`
    pub reduced_motion: bool,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            particle_quality: ParticleQuality::Medium,
            particles: true,
            screen_shake: true,
            reduced_motion: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub volume: VolumeSettings,
    pub motion: MotionSettings,
    /// Selected character skin
    pub character: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: VolumeSettings::default(),
            motion: MotionSettings::default(),
            character: "default".to_string(),
        }
    }
}

impl Settings {
    pub fn shake_enabled(&self) -> bool {
        self.motion.screen_shake && !self.motion.reduced_motion
    }

    /// Live particle cap; zero when particles are off
    pub fn particle_budget(&self) -> usize {
        if self.motion.particles {
            self.motion.particle_quality.budget()
        } else {
            0
        }
    }

    /// Read from a save directory; any failure yields defaults
    pub fn load(dir: &Path) -> Self {
        match read_json::<Settings>(&dir.join(SETTINGS_FILE)) {
            Ok(mut settings) => {
                settings.clamp_volumes();
                log::info!("Loaded settings from {}", dir.display());
                settings
            }
            Err(err) if err.is_not_found() => {
                log::info!("No settings file, using defaults");
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring settings file: {err}");
                Self::default()
            }
        }
    }

    pub fn save(&self, dir: &Path) {
        if let Err(err) = write_json(&dir.join(SETTINGS_FILE), self) {
            log::warn!("Failed to save settings: {err}");
        }
    }

    fn clamp_volumes(&mut self) {
        let v = &mut self.volume;
        for level in [&mut v.master, &mut v.sfx, &mut v.music] {
            *level = level.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_shake() {
        let mut settings = Settings::default();
        assert!(settings.shake_enabled());
        settings.motion.reduced_motion = true;
        assert!(!settings.shake_enabled());
    }

    #[test]
    fn test_particle_budget() {
        let mut settings = Settings::default();
        assert_eq!(settings.particle_budget(), 200);
        settings.motion.particle_quality = ParticleQuality::High;
        assert_eq!(settings.particle_budget(), 600);
        settings.motion.particles = false;
        assert_eq!(settings.particle_budget(), 0);
    }

    #[test]
    fn test_quality_names() {
        assert_eq!(ParticleQuality::from_name(" HIGH "), Some(ParticleQuality::High));
        assert_eq!(ParticleQuality::from_name("med"), Some(ParticleQuality::Medium));
        assert_eq!(ParticleQuality::from_name("ultra"), None);
    }

    #[test]
    fn test_load_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());

        let mut settings = Settings::default();
        settings.motion.particle_quality = ParticleQuality::High;
        settings.volume.master = 3.0;
        settings.character = "knight".to_string();
        settings.save(dir.path());

        let loaded = Settings::load(dir.path());
        assert_eq!(loaded.motion.particle_quality, ParticleQuality::High);
        assert_eq!(loaded.character, "knight");
        assert_eq!(loaded.volume.master, 1.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"motion": {"reduced_motion": true}}"#,
        )
        .unwrap();
        let loaded = Settings::load(dir.path());
        assert!(loaded.motion.reduced_motion);
        assert!(loaded.motion.particles);
        assert_eq!(loaded.volume, VolumeSettings::default());
    }
}
