//! Game driver
//!
//! Owns the current run and its collaborators and runs the fixed-step loop:
//! poll input, tick, play audio cues, let the session observe the world,
//! present a frame.

use crate::audio::AudioManager;
use crate::platform::{FrameClock, InputSource, InputState};
use crate::renderer::{FrameSnapshot, RenderSink};
use crate::session::{RunSummary, Session};
use crate::settings::Settings;
use crate::sim::{World, tick};

/// What happened during a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    /// The run ended this frame and was flushed
    Finished(RunSummary),
    /// The host asked to quit; the run was aborted
    Quit,
    /// No run in progress
    Idle,
}

pub struct Game {
    pub settings: Settings,
    pub session: Session,
    world: Option<World>,
    input: InputState,
    source: Box<dyn InputSource>,
    renderer: Box<dyn RenderSink>,
    audio: AudioManager,
    clock: FrameClock,
    seed: u64,
    runs: u64,
}

impl Game {
    pub fn new(
        settings: Settings,
        session: Session,
        source: Box<dyn InputSource>,
        renderer: Box<dyn RenderSink>,
        mut audio: AudioManager,
        seed: u64,
    ) -> Self {
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        let clock = FrameClock::new(settings.sim_dt());
        Self {
            settings,
            session,
            world: None,
            input: InputState::new(),
            source,
            renderer,
            audio,
            clock,
            seed,
            runs: 0,
        }
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.input.set_autopilot(on);
    }

    /// Start a new run, discarding any run in progress
    pub fn start_run(&mut self) {
        self.abort_run();
        let seed = self.seed.wrapping_add(self.runs);
        self.runs += 1;
        self.clock.reset();
        let autopilot = self.input.current().idle_mode;
        self.input = InputState::new();
        self.input.set_autopilot(autopilot);
        self.world = Some(self.session.begin_run(self.settings.world_config(), seed));
    }

    /// Quit to menu
    pub fn abort_run(&mut self) {
        if let Some(world) = self.world.take() {
            self.session.abort_run(&world);
        }
    }

    /// Feed one frame's elapsed time (seconds)
    pub fn frame(&mut self, frame_dt: f32) -> FrameStatus {
        let steps = self.clock.advance(frame_dt);
        let mut status = if self.world.is_some() {
            FrameStatus::Running
        } else {
            FrameStatus::Idle
        };
        for _ in 0..steps {
            match self.step() {
                FrameStatus::Running => {}
                other => {
                    status = other;
                    break;
                }
            }
        }
        status
    }

    /// Run exactly one simulation tick
    pub fn step(&mut self) -> FrameStatus {
        let events = self.source.poll();
        self.input.extend(events);
        if self.input.quit_requested() {
            self.abort_run();
            return FrameStatus::Quit;
        }

        let dt = self.clock.step();
        let Some(world) = self.world.as_mut() else {
            return FrameStatus::Idle;
        };
        tick(world, self.input.current(), dt);
        self.input.end_tick();

        let events = world.drain_events();
        self.audio.handle_events(&events);

        let summary = self.session.observe(world);
        self.renderer.present(&FrameSnapshot::capture(world));

        match summary {
            Some(summary) => FrameStatus::Finished(summary),
            None => FrameStatus::Running,
        }
    }
}
