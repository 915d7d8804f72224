//! High score leaderboard
//!
//! Top 10 entries ordered by `(score, kills)` descending. Persisted through a
//! `LeaderboardStore` by the session.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest accepted leaderboard name
pub const MAX_NAME_LEN: usize = 12;

/// Name used when a guest submits a blank name
pub const DEFAULT_NAME: &str = "Player";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    pub kills: u32,
}

impl HighScoreEntry {
    fn key(&self) -> (u64, u32) {
        (self.score, self.kills)
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

/// Trim a typed name to the accepted length; blank becomes the default
pub fn sanitize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_NAME.to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from stored entries, normalizing order and length
    pub fn from_entries(mut entries: Vec<HighScoreEntry>) -> Self {
        entries.sort_by(|a, b| b.key().cmp(&a.key()));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Check if a result qualifies for the leaderboard
    pub fn qualifies(&self, score: u64, kills: u32) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|worst| (score, kills) > worst.key())
            .unwrap_or(true)
    }

    /// Get the rank a result would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64, kills: u32) -> Option<usize> {
        if !self.qualifies(score, kills) {
            return None;
        }
        let rank = self.entries.iter().position(|e| (score, kills) > e.key());
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert or update `name`'s entry.
    ///
    /// An existing entry under the same name is replaced only by a strictly
    /// better result. Returns the entry's rank (1-indexed) if the table
    /// changed, None otherwise.
    pub fn submit(&mut self, name: &str, score: u64, kills: u32) -> Option<usize> {
        let new = HighScoreEntry {
            name: name.to_string(),
            score,
            kills,
        };

        if let Some(i) = self.entries.iter().position(|e| e.name == name) {
            if new.key() <= self.entries[i].key() {
                return None;
            }
            self.entries.remove(i);
        } else if !self.qualifies(score, kills) {
            return None;
        }

        // Find insertion point (sorted descending)
        let pos = self.entries.iter().position(|e| new.key() > e.key());
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, new);
                i + 1
            }
            None => {
                self.entries.push(new);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        if rank > MAX_HIGH_SCORES {
            None
        } else {
            Some(rank)
        }
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn full_board() -> HighScores {
        let mut hs = HighScores::new();
        for i in 0..MAX_HIGH_SCORES as u64 {
            hs.submit(&format!("p{i}"), 100 + i * 10, 5);
        }
        hs
    }

    #[test]
    fn test_qualifies_when_not_full() {
        let hs = HighScores::new();
        assert!(hs.qualifies(0, 0));
    }

    #[test]
    fn test_qualifies_compares_pairs() {
        let hs = full_board();
        // Worst entry is (100, 5)
        assert!(!hs.qualifies(100, 5));
        assert!(!hs.qualifies(99, 50));
        assert!(hs.qualifies(100, 6));
        assert!(hs.qualifies(101, 0));
    }

    #[test]
    fn test_submit_orders_descending() {
        let hs = full_board();
        let scores: Vec<u64> = hs.entries.iter().map(|e| e.score).collect();
        let mut sorted = scores.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(scores, sorted);
        assert_eq!(hs.top_score(), Some(190));
    }

    #[test]
    fn test_same_name_only_improves() {
        let mut hs = HighScores::new();
        assert_eq!(hs.submit("ana", 500, 20), Some(1));
        assert_eq!(hs.submit("ana", 400, 90), None);
        assert_eq!(hs.entries.len(), 1);
        assert_eq!(hs.submit("ana", 500, 21), Some(1));
        assert_eq!(hs.entries[0].kills, 21);
        assert_eq!(hs.entries.len(), 1);
    }

    #[test]
    fn test_full_board_evicts_worst() {
        let mut hs = full_board();
        assert_eq!(hs.submit("new", 155, 0), Some(5));
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);
        assert!(hs.entries.iter().all(|e| e.name != "p0"));
        assert_eq!(hs.submit("low", 50, 0), None);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("   "), "Player");
        assert_eq!(sanitize_name("  bob "), "bob");
        assert_eq!(sanitize_name("abcdefghijklmnop"), "abcdefghijkl");
    }

    #[test]
    fn test_from_entries_normalizes() {
        let entries = (0..15)
            .map(|i| HighScoreEntry {
                name: format!("n{i}"),
                score: i,
                kills: 0,
            })
            .collect();
        let hs = HighScores::from_entries(entries);
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(hs.top_score(), Some(14));
    }

    proptest! {
        #[test]
        fn prop_board_stays_sorted_and_bounded(
            results in proptest::collection::vec((0u8..6, 0u64..1000, 0u32..50), 0..40)
        ) {
            let mut hs = HighScores::new();
            for (who, score, kills) in results {
                hs.submit(&format!("p{who}"), score, kills);
                prop_assert!(hs.entries.len() <= MAX_HIGH_SCORES);
                for pair in hs.entries.windows(2) {
                    prop_assert!(pair[0].key() >= pair[1].key());
                }
                let mut names: Vec<_> = hs.entries.iter().map(|e| e.name.clone()).collect();
                names.sort();
                names.dedup();
                prop_assert_eq!(names.len(), hs.entries.len());
            }
        }
    }
}
