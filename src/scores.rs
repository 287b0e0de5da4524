//! High-score table persisted as JSON.
//!
//! The file is an ordered list of `{ "name", "score", "date" }` records.  A
//! missing or unreadable file is treated as an empty table so a bad score
//! file never blocks play.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GameResult;

pub const MAX_ENTRIES: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    pub date: String,
}

impl ScoreEntry {
    /// Entry stamped with today's date.
    pub fn today(name: impl Into<String>, score: u32) -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            name: name.into(),
            score,
            date: format_date(secs),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
}

impl HighScores {
    /// Load `path`; any failure yields an empty table.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(scores) => scores,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable score file, starting empty");
                Self::default()
            }
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> GameResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut entries: Vec<ScoreEntry> = serde_json::from_str(&contents)?;
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_ENTRIES);
        Ok(Self { entries })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> GameResult<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Insert `entry` unless an identical record exists, keep the table
    /// sorted by descending score and trimmed to [`MAX_ENTRIES`].
    /// Returns `true` if the entry made the table.
    pub fn submit(&mut self, entry: ScoreEntry) -> bool {
        if self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry.clone());
        // Stable sort: on equal scores the earlier record stays ahead.
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
        self.entries.contains(&entry)
    }

    pub fn best(&self) -> u32 {
        self.entries.first().map(|e| e.score).unwrap_or(0)
    }
}

/// `YYYY-MM-DD` for a Unix timestamp (UTC).
pub fn format_date(unix_secs: u64) -> String {
    let days = (unix_secs / 86_400) as i64;
    // Civil-from-days, proleptic Gregorian calendar.
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    format!("{:04}-{:02}-{:02}", year, month, day)
}
