//! Rendering interface
//!
//! The core never draws. Each tick it captures a `FrameSnapshot` and hands it
//! to the host's `RenderSink`.

pub mod snapshot;

pub use snapshot::{Drawable, FrameSnapshot, Hud, Shape};

/// Host-side presenter
pub trait RenderSink {
    fn present(&mut self, frame: &FrameSnapshot);
}

/// Logs a one-line status every `every` frames, for headless runs
#[derive(Debug)]
pub struct LogRenderSink {
    every: u64,
    frames: u64,
}

impl LogRenderSink {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for LogRenderSink {
    fn default() -> Self {
        Self::new(60)
    }
}

impl RenderSink for LogRenderSink {
    fn present(&mut self, frame: &FrameSnapshot) {
        self.frames += 1;
        if self.frames % self.every != 0 {
            return;
        }
        let hud = &frame.hud;
        log::debug!(
            "t={:.1}s hp={}/{} shield={:.0} score={} kills={} lvl={} weapon={} enemies={} shots={}{}",
            frame.time_ms as f32 / 1000.0,
            hud.hp,
            hud.max_hp,
            hud.shield,
            hud.score,
            hud.kills,
            hud.level,
            hud.weapon.name(),
            frame.enemies.len(),
            frame.projectiles.len(),
            if hud.raining { " (rain)" } else { "" },
        );
    }
}
