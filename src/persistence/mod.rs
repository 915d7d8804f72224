//! Profile and leaderboard persistence
//!
//! Two narrow store traits the session talks to:
//! - `ProfileStore`: one record per user
//! - `LeaderboardStore`: the shared top-10 table
//!
//! Backends: JSON files under a data directory, and an in-memory store used
//! for guests, tests and as the fallback when the disk is unavailable.

pub mod json;
pub mod memory;
pub mod profile;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use profile::Profile;

use crate::error::Result;
use crate::highscores::HighScoreEntry;

pub trait ProfileStore {
    /// Load `user`'s profile; an absent record yields `Profile::default()`
    fn load(&self, user: &str) -> Result<Profile>;

    fn save(&mut self, user: &str, profile: &Profile) -> Result<()>;
}

pub trait LeaderboardStore {
    /// Best `n` entries, highest first
    fn top_n(&self, n: usize) -> Result<Vec<HighScoreEntry>>;

    /// Overwrite the whole table
    fn replace_all(&mut self, entries: &[HighScoreEntry]) -> Result<()>;
}
