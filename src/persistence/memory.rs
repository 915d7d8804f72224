//! In-memory backend

use std::collections::BTreeMap;
use std::io;

use super::{LeaderboardStore, Profile, ProfileStore};
use crate::error::{Error, Result};
use crate::highscores::HighScoreEntry;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub profiles: BTreeMap<String, Profile>,
    pub leaderboard: Vec<HighScoreEntry>,
    /// Every call fails with `StorageUnavailable` while set
    pub offline: bool,
    /// Successful saves, for assertions
    pub saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose backend is unreachable
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.offline {
            return Err(Error::StorageUnavailable(io::Error::new(
                io::ErrorKind::NotConnected,
                "memory store offline",
            )));
        }
        Ok(())
    }
}

impl ProfileStore for MemoryStore {
    fn load(&self, user: &str) -> Result<Profile> {
        self.check()?;
        Ok(self.profiles.get(user).cloned().unwrap_or_default())
    }

    fn save(&mut self, user: &str, profile: &Profile) -> Result<()> {
        self.check()?;
        self.profiles.insert(user.to_string(), profile.clone());
        self.saves += 1;
        Ok(())
    }
}

impl LeaderboardStore for MemoryStore {
    fn top_n(&self, n: usize) -> Result<Vec<HighScoreEntry>> {
        self.check()?;
        Ok(self.leaderboard.iter().take(n).cloned().collect())
    }

    fn replace_all(&mut self, entries: &[HighScoreEntry]) -> Result<()> {
        self.check()?;
        self.leaderboard = entries.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_store_fails() {
        let mut store = MemoryStore::offline();
        assert!(matches!(store.load("x"), Err(Error::StorageUnavailable(_))));
        assert!(store.save("x", &Profile::default()).is_err());
        assert_eq!(store.saves, 0);
    }

    #[test]
    fn test_absent_user_gets_default() {
        let store = MemoryStore::new();
        assert_eq!(store.load("ghost").unwrap(), Profile::default());
    }
}
