//! Room scoreboard
//!
//! Built from the scoreboard service response (`[{name, score}, ...]`), which
//! may list a player once per run. Only the best run per name is kept.

use serde::{Deserialize, Serialize};

use crate::GameError;

/// Number of entries shown on the billboard
pub const BILLBOARD_SIZE: usize = 10;

/// A single scoreboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

/// Best score per player, highest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    entries: Vec<ScoreEntry>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a service response
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let runs: Vec<ScoreEntry> = serde_json::from_str(json)?;
        let mut board = Self::new();
        for run in runs {
            board.record(&run.name, run.score);
        }
        Ok(board)
    }

    /// Record a run; returns true if it improved the player's best
    pub fn record(&mut self, name: &str, score: u32) -> bool {
        if let Some(index) = self.entries.iter().position(|e| e.name == name) {
            if self.entries[index].score >= score {
                return false;
            }
            self.entries.remove(index);
        }

        // Insert after every entry with an equal or higher score, so ties
        // keep arrival order
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            pos,
            ScoreEntry {
                name: name.to_string(),
                score,
            },
        );
        true
    }

    /// 1-indexed rank of a player
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name).map(|i| i + 1)
    }

    /// Rank a score would achieve if recorded now (1-indexed)
    pub fn potential_rank(&self, score: u32) -> usize {
        self.entries.iter().filter(|e| e.score >= score).count() + 1
    }

    pub fn best_of(&self, name: &str) -> Option<u32> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.score)
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Leading entries for display
    pub fn billboard(&self) -> &[ScoreEntry] {
        &self.entries[..self.entries.len().min(BILLBOARD_SIZE)]
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_run_per_name() {
        let json = r#"[
            {"name": "ann", "score": 3},
            {"name": "bob", "score": 7},
            {"name": "ann", "score": 9},
            {"name": "bob", "score": 2}
        ]"#;
        let board = Scoreboard::from_json(json).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board.best_of("ann"), Some(9));
        assert_eq!(board.best_of("bob"), Some(7));
        assert_eq!(board.rank_of("ann"), Some(1));
        assert_eq!(board.top_score(), Some(9));
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut board = Scoreboard::new();
        board.record("ann", 5);
        board.record("bob", 5);
        board.record("cat", 6);
        let names: Vec<&str> = board.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["cat", "ann", "bob"]);
        assert_eq!(board.potential_rank(5), 4);
        assert_eq!(board.potential_rank(7), 1);
    }

    #[test]
    fn test_lower_run_does_not_replace() {
        let mut board = Scoreboard::new();
        assert!(board.record("ann", 4));
        assert!(!board.record("ann", 4));
        assert!(!board.record("ann", 1));
        assert!(board.record("ann", 6));
        assert_eq!(board.best_of("ann"), Some(6));
    }

    #[test]
    fn test_billboard_is_capped() {
        let mut board = Scoreboard::new();
        for i in 0..15 {
            board.record(&format!("p{i}"), i);
        }
        assert_eq!(board.billboard().len(), BILLBOARD_SIZE);
        assert_eq!(board.billboard()[0].score, 14);
        assert_eq!(board.rank_of("p0"), Some(15));
    }

    #[test]
    fn test_bad_response() {
        assert!(matches!(Scoreboard::from_json(r#"{"name": 1}"#), Err(GameError::Json(_))));
        assert!(Scoreboard::from_json("[]").unwrap().is_empty());
    }
}
