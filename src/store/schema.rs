use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::judge::Verdict;
use crate::engine::score::{AttemptRecord, HistoryEntry};
use crate::session::result::SessionSummary;
use crate::store::StatsSink;

pub const SCHEMA_VERSION: u32 = 1;

const RESPONSE_TIME_LIMIT: usize = 50;
const CHARACTER_HISTORY_LIMIT: usize = 5_000;
const SESSION_HISTORY_LIMIT: usize = 500;

/// Lifetime per-prompt statistics, accumulated across sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsData {
    pub schema_version: u32,
    pub items: BTreeMap<String, HistoryEntry>,
    pub total_correct: u64,
    pub total_wrong: u64,
    #[serde(default)]
    pub character_history: Vec<String>,
}

impl Default for StatsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            items: BTreeMap::new(),
            total_correct: 0,
            total_wrong: 0,
            character_history: Vec::new(),
        }
    }
}

impl StatsData {
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    pub fn apply(&mut self, record: &AttemptRecord) {
        let entry = self.items.entry(record.key.clone()).or_default();
        entry.apply(record.verdict, record.response_time_secs);
        if entry.response_times_secs.len() > RESPONSE_TIME_LIMIT {
            let excess = entry.response_times_secs.len() - RESPONSE_TIME_LIMIT;
            entry.response_times_secs.drain(..excess);
        }

        match record.verdict {
            Verdict::Correct => self.total_correct += 1,
            Verdict::Incorrect => self.total_wrong += 1,
        }

        self.character_history.push(record.key.clone());
        if self.character_history.len() > CHARACTER_HISTORY_LIMIT {
            let excess = self.character_history.len() - CHARACTER_HISTORY_LIMIT;
            self.character_history.drain(..excess);
        }
    }

    /// Items ordered worst accuracy first, then most attempts.
    pub fn weakest(&self, limit: usize) -> Vec<(&str, &HistoryEntry)> {
        let mut entries: Vec<(&str, &HistoryEntry)> =
            self.items.iter().map(|(k, e)| (k.as_str(), e)).collect();
        entries.sort_by(|a, b| {
            a.1.accuracy()
                .total_cmp(&b.1.accuracy())
                .then_with(|| b.1.attempts.cmp(&a.1.attempts))
        });
        entries.truncate(limit);
        entries
    }
}

impl StatsSink for StatsData {
    fn record_attempt(&mut self, record: &AttemptRecord) {
        self.apply(record);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionHistoryData {
    pub schema_version: u32,
    pub sessions: Vec<SessionSummary>,
}

impl Default for SessionHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl SessionHistoryData {
    pub fn push(&mut self, summary: SessionSummary) {
        self.sessions.push(summary);
        if self.sessions.len() > SESSION_HISTORY_LIMIT {
            self.sessions.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correct(key: &str, secs: f64) -> AttemptRecord {
        AttemptRecord {
            key: key.to_string(),
            verdict: Verdict::Correct,
            response_time_secs: Some(secs),
        }
    }

    fn wrong(key: &str) -> AttemptRecord {
        AttemptRecord {
            key: key.to_string(),
            verdict: Verdict::Incorrect,
            response_time_secs: None,
        }
    }

    #[test]
    fn test_apply_accumulates_totals() {
        let mut stats = StatsData::default();
        stats.apply(&correct("あ", 1.0));
        stats.apply(&wrong("あ"));
        stats.apply(&correct("い", 0.5));

        assert_eq!(stats.total_correct, 2);
        assert_eq!(stats.total_wrong, 1);
        let entry = &stats.items["あ"];
        assert_eq!(entry.attempts, 2);
        assert_eq!(entry.correct, 1);
        assert_eq!(entry.wrong, 1);
        assert_eq!(stats.character_history, vec!["あ", "あ", "い"]);
    }

    #[test]
    fn test_response_times_are_capped() {
        let mut stats = StatsData::default();
        for i in 0..(RESPONSE_TIME_LIMIT + 10) {
            stats.apply(&correct("か", i as f64));
        }
        let times = &stats.items["か"].response_times_secs;
        assert_eq!(times.len(), RESPONSE_TIME_LIMIT);
        assert_eq!(times[0], 10.0);
        assert_eq!(stats.items["か"].correct as usize, RESPONSE_TIME_LIMIT + 10);
    }

    #[test]
    fn test_weakest_orders_by_accuracy() {
        let mut stats = StatsData::default();
        stats.apply(&correct("あ", 1.0));
        stats.apply(&wrong("い"));
        stats.apply(&wrong("う"));
        stats.apply(&wrong("う"));
        stats.apply(&correct("う", 1.0));

        let weakest: Vec<&str> = stats.weakest(2).into_iter().map(|(k, _)| k).collect();
        assert_eq!(weakest, vec!["い", "う"]);
    }

    #[test]
    fn test_stale_schema_detected() {
        let json = r#"{"schema_version": 0, "items": {}, "total_correct": 3, "total_wrong": 1}"#;
        let stats: StatsData = serde_json::from_str(json).unwrap();
        assert!(stats.needs_reset());
        assert!(!StatsData::default().needs_reset());
    }
}
