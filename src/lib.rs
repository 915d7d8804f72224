//! War Arena - a top-down arena shooter simulation core
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (entities, weapons, combat, scheduling)
//! - `session`: Run lifecycle, currency, unlocks, daily mission, leaderboard flush
//! - `persistence`: Profile and leaderboard stores (JSON files, in-memory)
//! - `platform`: Input sources and the fixed-step frame clock
//! - `renderer`: Drawable snapshot handed to an external render sink
//! - `audio`: Fire-and-forget sound cues

pub mod audio;
pub mod error;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default playfield dimensions
    pub const ARENA_WIDTH: f32 = 1200.0;
    pub const ARENA_HEIGHT: f32 = 700.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 28.0;
    pub const PLAYER_SPEED: f32 = 350.0;
    pub const PLAYER_BASE_HP: i32 = 100;

    /// Base projectile speed (px/s); weapon templates scale this
    pub const BULLET_SPEED: f32 = 700.0;
    /// Default projectile lifetime
    pub const BULLET_LIFETIME_MS: u64 = 5000;
    /// Projectiles this far outside the playfield are culled
    pub const OFFSCREEN_MARGIN: f32 = 120.0;

    /// Base enemy speed (px/s)
    pub const ENEMY_SPEED: f32 = 100.0;
    pub const ENEMY_SIZE: f32 = 18.0;

    /// Rocket / grenade / boss blast radius
    pub const EXPLOSION_RADIUS: f32 = 80.0;
    /// Rocket blast damage
    pub const EXPLOSION_DAMAGE: i32 = 40;

    /// Speed factor while it is raining
    pub const RAIN_SPEED_DEBUFF: f32 = 0.85;

    /// Combo window
    pub const COMBO_WINDOW_MS: u64 = 3000;

    /// Kill count that ends the run in victory
    pub const WIN_KILLS: u32 = 200;
    /// Currency awarded per kill at run end
    pub const COINS_PER_KILL: u64 = 10;

    /// Default particle burst size
    pub const PARTICLE_COUNT: usize = 16;
}

/// RGB color triple
pub type Rgb = [u8; 3];

/// Shared color palette
pub mod palette {
    use super::Rgb;

    pub const WHITE: Rgb = [245, 245, 245];
    pub const BLACK: Rgb = [10, 10, 10];
    pub const RED: Rgb = [200, 20, 20];
    pub const DARK_RED: Rgb = [120, 0, 0];
    pub const GREEN: Rgb = [60, 180, 75];
    pub const YELLOW: Rgb = [240, 200, 20];
    pub const GRAY: Rgb = [120, 120, 120];
    pub const ORANGE: Rgb = [255, 140, 0];
    pub const PURPLE: Rgb = [170, 0, 170];
    pub const BLUE: Rgb = [50, 150, 250];
    pub const CYAN: Rgb = [80, 200, 220];
    pub const LIGHT_BLUE: Rgb = [100, 100, 255];
    pub const MAGENTA: Rgb = [255, 0, 255];
}
