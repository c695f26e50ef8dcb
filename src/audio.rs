//! Sound effects
//!
//! Every effect is a short procedural tone described by [`Tone`]; a
//! [`SoundSink`] turns it into actual audio. The manager maps simulation
//! events to effects and applies volume and mute.

use crate::settings::{Settings, VolumeSettings};
use crate::sim::{GameEvent, PowerUpKind};

/// Cues the gameplay layer can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    Land,
    Damage,
    Coin,
    PowerUp,
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// How notes are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    /// Notes played together
    Chord,
    /// Notes played one after another
    Melody,
}

/// Synthesis recipe for one effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub notes: &'static [f32],
    /// Length of each note
    pub note_ms: u32,
    pub wave: Waveform,
    pub arrangement: Arrangement,
}

const JUMP_NOTES: &[f32] = &[440.0];
const LAND_NOTES: &[f32] = &[150.0];
const DAMAGE_NOTES: &[f32] = &[200.0];
const COIN_NOTES: &[f32] = &[800.0];
/// C-E-G
const POWERUP_NOTES: &[f32] = &[523.0, 659.0, 784.0];
const VICTORY_NOTES: &[f32] = &[523.0, 659.0, 784.0, 1047.0];

impl SoundEffect {
    pub fn tone(&self) -> Tone {
        let (notes, note_ms, wave, arrangement) = match self {
            SoundEffect::Jump => (JUMP_NOTES, 100, Waveform::Sine, Arrangement::Chord),
            SoundEffect::Land => (LAND_NOTES, 50, Waveform::Square, Arrangement::Chord),
            SoundEffect::Damage => (DAMAGE_NOTES, 300, Waveform::Sawtooth, Arrangement::Chord),
            SoundEffect::Coin => (COIN_NOTES, 100, Waveform::Sine, Arrangement::Chord),
            SoundEffect::PowerUp => (POWERUP_NOTES, 200, Waveform::Sine, Arrangement::Chord),
            SoundEffect::Victory => (VICTORY_NOTES, 100, Waveform::Sine, Arrangement::Melody),
        };
        Tone {
            notes,
            note_ms,
            wave,
            arrangement,
        }
    }

    /// Effect for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped { .. } => Some(SoundEffect::Jump),
            GameEvent::Landed { .. } => Some(SoundEffect::Land),
            GameEvent::Damaged { .. } => Some(SoundEffect::Damage),
            GameEvent::Collected {
                kind: PowerUpKind::Coin { .. },
                ..
            } => Some(SoundEffect::Coin),
            GameEvent::Collected { .. } => Some(SoundEffect::PowerUp),
            GameEvent::GoalReached { .. } => Some(SoundEffect::Victory),
            _ => None,
        }
    }
}

/// Audio output backend
pub trait SoundSink {
    fn play(&mut self, effect: SoundEffect, tone: Tone, volume: f32);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullSink;

impl SoundSink for NullSink {
    fn play(&mut self, _effect: SoundEffect, _tone: Tone, _volume: f32) {}
}

/// Headless backend that only logs
#[derive(Debug, Default)]
pub struct LogSink;

impl SoundSink for LogSink {
    fn play(&mut self, effect: SoundEffect, tone: Tone, volume: f32) {
        log::debug!(
            "sfx {:?}: {:?} {:?} {:?} @ {:.2}",
            effect,
            tone.wave,
            tone.arrangement,
            tone.notes,
            volume
        );
    }
}

/// Routes sound effects to a sink at the configured gain
pub struct AudioManager {
    sink: Box<dyn SoundSink>,
    volume: VolumeSettings,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn SoundSink>) -> Self {
        Self {
            sink,
            volume: VolumeSettings::default(),
            muted: false,
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.volume;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn gain(&self) -> f32 {
        if self.muted {
            return 0.0;
        }
        (self.volume.master * self.volume.sfx).clamp(0.0, 1.0)
    }

    /// Fire and forget; silent at zero gain
    pub fn play(&mut self, effect: SoundEffect) {
        let gain = self.gain();
        if gain > 0.0 {
            self.sink.play(effect, effect.tone(), gain);
        }
    }

    /// Play whatever the tick's events call for
    pub fn consume(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }
}
