//! JSON file backend
//!
//! Layout under the data directory:
//! - `profiles/<user>.json`
//! - `leaderboard.json`
//!
//! Writes go to a `.tmp` sibling first and are renamed into place.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use super::{LeaderboardStore, Profile, ProfileStore};
use crate::error::Result;
use crate::highscores::{HighScoreEntry, HighScores};

#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn profile_path(&self, user: &str) -> PathBuf {
        self.root.join("profiles").join(format!("{}.json", file_stem(user)))
    }

    fn leaderboard_path(&self) -> PathBuf {
        self.root.join("leaderboard.json")
    }
}

/// Keep user names inside the profiles directory; `_XX` hex-escapes every
/// other byte so distinct names never share a file
fn file_stem(user: &str) -> String {
    let mut stem = String::with_capacity(user.len());
    for c in user.chars() {
        if c.is_alphanumeric() || c == '-' {
            stem.push(c);
        } else {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                stem.push_str(&format!("_{b:02x}"));
            }
        }
    }
    stem
}

/// `None` when the file does not exist
fn read_json(path: &Path) -> Result<Option<Value>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl ProfileStore for JsonStore {
    fn load(&self, user: &str) -> Result<Profile> {
        let Some(value) = read_json(&self.profile_path(user))? else {
            log::info!("No profile for {user}, starting fresh");
            return Ok(Profile::default());
        };
        let (profile, errors) = Profile::from_value(&value);
        for e in errors {
            log::warn!("Profile {user}: {e}, using default");
        }
        Ok(profile)
    }

    fn save(&mut self, user: &str, profile: &Profile) -> Result<()> {
        write_json(&self.profile_path(user), profile)?;
        log::info!("Profile saved for {user}");
        Ok(())
    }
}

impl LeaderboardStore for JsonStore {
    fn top_n(&self, n: usize) -> Result<Vec<HighScoreEntry>> {
        let Some(value) = read_json(&self.leaderboard_path())? else {
            return Ok(Vec::new());
        };
        let entries: Vec<HighScoreEntry> = serde_json::from_value(value)?;
        let mut entries = HighScores::from_entries(entries).entries;
        entries.truncate(n);
        Ok(entries)
    }

    fn replace_all(&mut self, entries: &[HighScoreEntry]) -> Result<()> {
        write_json(&self.leaderboard_path(), &entries)?;
        log::info!("Leaderboard saved ({} entries)", entries.len());
        Ok(())
    }
}
