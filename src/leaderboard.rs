//! Leaderboard snapshot and ranking
//!
//! This module holds the leaderboard returned by the scoring service after a
//! result submission and on every poll. Entries are ranked by score, highest
//! first, with ties going to the team that spent less time.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::TruncatedVec;
use crate::constants::leaderboard::{DISPLAY_LIMIT, PODIUM_SIZE};

/// A team's final result as stored by the scoring service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Team name
    pub team: String,
    /// Final score
    pub score: i64,
    /// Seconds spent before the game ended
    pub time_spent: u64,
}

/// Serialization helper for Leaderboard struct
#[derive(Deserialize)]
struct LeaderboardSerde {
    entries: Vec<LeaderboardEntry>,
}

/// A ranked list of team results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LeaderboardSerde")]
pub struct Leaderboard {
    /// Entries in rank order
    entries: Vec<LeaderboardEntry>,
}

impl From<LeaderboardSerde> for Leaderboard {
    /// Re-establishes the ranking, whatever order the entries arrived in
    fn from(serde: LeaderboardSerde) -> Self {
        Self::new(serde.entries)
    }
}

/// One place on the podium
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodiumPlace {
    /// Rank, 1-indexed
    pub rank: usize,
    /// The entry holding that rank
    pub entry: LeaderboardEntry,
}

impl Leaderboard {
    /// Builds a leaderboard from entries in any order
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gameshow::leaderboard::{Leaderboard, LeaderboardEntry};
    ///
    /// let entry = |team: &str, score, time_spent| LeaderboardEntry {
    ///     team: team.to_string(),
    ///     score,
    ///     time_spent,
    /// };
    /// let leaderboard = Leaderboard::new(vec![
    ///     entry("Interns", 40, 900),
    ///     entry("Residents", 75, 1200),
    ///     entry("Nurses", 75, 1100),
    /// ]);
    /// assert_eq!(leaderboard.position("Nurses"), Some(0));
    /// ```
    pub fn new(entries: Vec<LeaderboardEntry>) -> Self {
        let entries = entries
            .into_iter()
            .sorted_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then_with(|| a.time_spent.cmp(&b.time_spent))
            })
            .collect_vec();
        Self { entries }
    }

    /// Stores a team's result, replacing any earlier result of the same team
    pub fn record(&mut self, entry: LeaderboardEntry) {
        let mut entries = std::mem::take(&mut self.entries);
        entries.retain(|existing| existing.team != entry.team);
        entries.push(entry);
        *self = Self::new(entries);
    }

    /// Entries in rank order
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Returns the leading entries for display, keeping the exact count
    pub fn top(&self) -> TruncatedVec<LeaderboardEntry> {
        TruncatedVec::new(self.entries.iter().cloned(), DISPLAY_LIMIT, self.entries.len())
    }

    /// The top three in podium display order: second, first, third
    ///
    /// Missing places are left out.
    pub fn podium(&self) -> Vec<PodiumPlace> {
        let places = self
            .entries
            .iter()
            .take(PODIUM_SIZE)
            .enumerate()
            .map(|(position, entry)| PodiumPlace {
                rank: position + 1,
                entry: entry.clone(),
            })
            .collect_vec();
        [1, 0, 2]
            .into_iter()
            .filter_map(|position| places.get(position).cloned())
            .collect()
    }

    /// Rank of a team, 0-indexed
    pub fn position(&self, team: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.team == team)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
