//! Audio cues
//!
//! The simulation emits `GameEvent`s; the manager maps them to `SoundCue`s
//! and forwards them to whatever sink the host provides. With no sink the
//! manager stays silent.

use crate::sim::{GameEvent, WeaponId};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Gunshot, pitched by weapon
    Shot(WeaponId),
    /// Blade swing
    Slash,
    Explosion,
    EnemyDeath,
    BossRoar,
    PlayerHurt,
    /// Damage fully soaked by the shield
    ShieldHit,
    Pickup,
    Dash,
    Teleport,
    LevelUp,
    MissionComplete,
    Thunder,
    GameOver,
    Victory,
}

/// Host-side audio output
pub trait AudioSink {
    /// Fire-and-forget; `volume` is already scaled by master and sfx volume
    fn play(&mut self, cue: SoundCue, volume: f32);
}

/// Writes cues to the log, for headless runs
#[derive(Debug, Default)]
pub struct LogAudioSink;

impl AudioSink for LogAudioSink {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        log::trace!("sfx {cue:?} @ {volume:.2}");
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Option<Box<dyn AudioSink>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AudioManager {
    pub fn new(sink: Option<Box<dyn AudioSink>>) -> Self {
        if sink.is_none() {
            log::warn!("No audio output available - audio disabled");
        }
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(sink) = self.sink.as_mut() else { return };
        sink.play(cue, vol);
    }

    /// Play the cues for one tick's events
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            if let Some(cue) = cue_for(event) {
                self.play(cue);
            }
        }
    }
}

fn cue_for(event: &GameEvent) -> Option<SoundCue> {
    let cue = match event {
        GameEvent::Shot { weapon: WeaponId::Sword | WeaponId::EnergySword } => SoundCue::Slash,
        GameEvent::Shot { weapon } => SoundCue::Shot(*weapon),
        GameEvent::AreaArmed => SoundCue::Explosion,
        GameEvent::Teleported { .. } => SoundCue::Teleport,
        GameEvent::DashStarted => SoundCue::Dash,
        GameEvent::ShieldRaised => SoundCue::Pickup,
        GameEvent::PlayerHurt { damage, .. } if *damage == 0 => SoundCue::ShieldHit,
        GameEvent::PlayerHurt { .. } => SoundCue::PlayerHurt,
        GameEvent::Explosion { .. } => SoundCue::Explosion,
        GameEvent::EnemyKilled { .. } => SoundCue::EnemyDeath,
        GameEvent::PickupCollected(_) => SoundCue::Pickup,
        GameEvent::LevelUp(_) => SoundCue::LevelUp,
        GameEvent::BossSpawned | GameEvent::BossPhaseChanged(_) => SoundCue::BossRoar,
        GameEvent::MissionCompleted { .. } => SoundCue::MissionComplete,
        GameEvent::WeatherChanged { raining: true } => SoundCue::Thunder,
        GameEvent::WeatherChanged { raining: false } => return None,
        GameEvent::GameOver { won: true } => SoundCue::Victory,
        GameEvent::GameOver { won: false } => SoundCue::GameOver,
    };
    Some(cue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct Recorder(Rc<RefCell<Vec<(SoundCue, f32)>>>);

    impl AudioSink for Recorder {
        fn play(&mut self, cue: SoundCue, volume: f32) {
            self.0.borrow_mut().push((cue, volume));
        }
    }

    #[test]
    fn test_missing_sink_is_silent() {
        let mut audio = AudioManager::default();
        assert!(!audio.is_enabled());
        audio.play(SoundCue::Explosion);
    }

    #[test]
    fn test_events_map_to_cues_with_volume() {
        let rec = Recorder::default();
        let mut audio = AudioManager::new(Some(Box::new(rec.clone())));
        audio.set_master_volume(0.5);
        audio.handle_events(&[
            GameEvent::Shot { weapon: WeaponId::Sword },
            GameEvent::WeatherChanged { raining: false },
            GameEvent::GameOver { won: true },
        ]);
        let played = rec.0.borrow();
        assert_eq!(played.len(), 2);
        assert_eq!(played[0].0, SoundCue::Slash);
        assert_eq!(played[1].0, SoundCue::Victory);
        assert!((played[0].1 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let rec = Recorder::default();
        let mut audio = AudioManager::new(Some(Box::new(rec.clone())));
        audio.set_muted(true);
        audio.play(SoundCue::Dash);
        assert!(rec.0.borrow().is_empty());
    }
}
