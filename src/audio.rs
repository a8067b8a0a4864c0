//! Event-driven sound cues
//!
//! `AudioManager` listens on the event bus, maps gameplay events to a closed
//! set of sound effects and hands each one, already mixed to its effective
//! volume, to a pluggable `AudioBackend`. Effects are described procedurally
//! as short tone sequences so a backend can synthesize them without assets.

use crate::config::AudioConfig;
use crate::sim::collectible::CollectibleKind;
use crate::sim::events::{EventListener, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Enemy destroyed
    EnemyDeath,
    /// Spawner destroyed - heavy blast
    SpawnerExplode,
    /// Missile detonation
    MissileExplode,
    /// Projectile bounced off a boss shield
    ShieldBlock,
    /// Player hit
    PlayerHurt,
    /// Crystal picked up
    CrystalCollect,
    /// Health picked up
    HealthCollect,
    /// Boss grew angrier
    BossPhase,
    /// Boss destroyed
    BossDefeat,
    /// Screen cleared
    ScreenClear,
    /// Section cleared, checkpoint reached
    SectionClear,
    /// Player destroyed
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One oscillator note with an exponential decay envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    /// Frequency at the end of the note (sweep)
    pub end_freq: f32,
    pub waveform: Waveform,
    /// Seconds from cue start
    pub delay: f32,
    pub duration: f32,
    /// Peak gain relative to the cue volume
    pub gain: f32,
}

const fn tone(freq: f32, end_freq: f32, waveform: Waveform, delay: f32, duration: f32, gain: f32) -> Tone {
    Tone {
        freq,
        end_freq,
        waveform,
        delay,
        duration,
        gain,
    }
}

/// Ascending or descending arpeggio of equal notes
fn arpeggio(freqs: &[f32], step: f32, duration: f32, waveform: Waveform, gain: f32) -> Vec<Tone> {
    freqs
        .iter()
        .enumerate()
        .map(|(i, &f)| tone(f, f, waveform, i as f32 * step, duration, gain))
        .collect()
}

impl SoundEffect {
    /// Procedural recipe for this effect
    pub fn tones(self) -> Vec<Tone> {
        use Waveform::*;
        match self {
            SoundEffect::EnemyDeath => vec![tone(600.0, 150.0, Square, 0.0, 0.12, 0.25)],
            SoundEffect::SpawnerExplode => vec![
                tone(120.0, 30.0, Sawtooth, 0.0, 0.6, 0.5),
                tone(80.0, 20.0, Sine, 0.05, 0.8, 0.4),
            ],
            SoundEffect::MissileExplode => vec![tone(200.0, 40.0, Sawtooth, 0.0, 0.4, 0.45)],
            SoundEffect::ShieldBlock => vec![tone(1200.0, 900.0, Triangle, 0.0, 0.08, 0.2)],
            SoundEffect::PlayerHurt => vec![tone(180.0, 90.0, Square, 0.0, 0.2, 0.4)],
            SoundEffect::CrystalCollect => vec![tone(900.0, 1400.0, Sine, 0.0, 0.1, 0.2)],
            SoundEffect::HealthCollect => arpeggio(&[500.0, 700.0], 0.06, 0.12, Sine, 0.25),
            SoundEffect::BossPhase => vec![tone(100.0, 300.0, Sawtooth, 0.0, 0.7, 0.4)],
            SoundEffect::BossDefeat => {
                let mut tones = vec![tone(300.0, 20.0, Sawtooth, 0.0, 1.0, 0.5)];
                tones.extend(arpeggio(&[400.0, 500.0, 600.0, 800.0, 1000.0], 0.12, 0.3, Triangle, 0.3));
                tones
            }
            SoundEffect::ScreenClear => arpeggio(&[400.0, 500.0, 600.0, 800.0], 0.1, 0.5, Triangle, 0.3),
            SoundEffect::SectionClear => arpeggio(&[500.0, 600.0, 700.0, 800.0, 1000.0], 0.08, 0.3, Triangle, 0.25),
            SoundEffect::GameOver => arpeggio(&[400.0, 350.0, 300.0, 200.0], 0.2, 0.4, Sine, 0.3),
        }
    }

    /// Cue for a bus event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<SoundEffect> {
        let effect = match event {
            GameEvent::EnemyDied { .. } => SoundEffect::EnemyDeath,
            GameEvent::SpawnerDestroyed { .. } => SoundEffect::SpawnerExplode,
            GameEvent::MissileDetonated { .. } => SoundEffect::MissileExplode,
            GameEvent::ShieldBlocked { .. } => SoundEffect::ShieldBlock,
            GameEvent::PlayerDamaged { hp, .. } if *hp > 0 => SoundEffect::PlayerHurt,
            GameEvent::CollectibleCollected {
                kind: CollectibleKind::Health,
                ..
            } => SoundEffect::HealthCollect,
            GameEvent::CollectibleCollected { .. } => SoundEffect::CrystalCollect,
            GameEvent::BossPhaseChanged { .. } => SoundEffect::BossPhase,
            GameEvent::BossDefeated { .. } => SoundEffect::BossDefeat,
            GameEvent::ScreenCompleted { .. } => SoundEffect::ScreenClear,
            GameEvent::SectionCompleted { .. } => SoundEffect::SectionClear,
            GameEvent::PlayerDied { .. } => SoundEffect::GameOver,
            _ => return None,
        };
        Some(effect)
    }
}

/// Output device. Receives fully mixed cues.
pub trait AudioBackend {
    /// Acquire the device. Returns false if audio is unavailable.
    fn init(&mut self) -> bool {
        true
    }
    fn play(&mut self, effect: SoundEffect, volume: f32, tones: &[Tone]);
    fn shutdown(&mut self) {}
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn play(&mut self, _effect: SoundEffect, _volume: f32, _tones: &[Tone]) {}
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Box<dyn AudioBackend>,
    ready: bool,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("ready", &self.ready)
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("muted", &self.muted)
            .finish()
    }
}

impl AudioManager {
    pub fn new(config: &AudioConfig, backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            ready: false,
            master_volume: config.master_volume.clamp(0.0, 1.0),
            sfx_volume: config.sfx_volume.clamp(0.0, 1.0),
            muted: config.muted,
        }
    }

    /// Open the backend; cues are dropped until this succeeds
    pub fn init(&mut self) -> bool {
        if !self.ready {
            self.ready = self.backend.init();
            if !self.ready {
                log::warn!("Audio backend unavailable - audio disabled");
            }
        }
        self.ready
    }

    pub fn teardown(&mut self) {
        if self.ready {
            self.backend.shutdown();
            self.ready = false;
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if !self.ready || vol <= 0.0 {
            return;
        }
        self.backend.play(effect, vol, &effect.tones());
    }
}

impl EventListener for AudioManager {
    fn on_event(&mut self, event: &GameEvent) {
        if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }
}
