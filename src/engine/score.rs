use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::judge::Verdict;

/// Per-prompt performance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub attempts: u32,
    pub correct: u32,
    pub wrong: u32,
    #[serde(default)]
    pub response_times_secs: Vec<f64>,
}

impl HistoryEntry {
    /// Fold one attempt in. Only correct answers carry a response time.
    pub fn apply(&mut self, verdict: Verdict, response_time_secs: Option<f64>) {
        self.attempts += 1;
        match verdict {
            Verdict::Correct => {
                self.correct += 1;
                if let Some(secs) = response_time_secs {
                    self.response_times_secs.push(secs);
                }
            }
            Verdict::Incorrect => self.wrong += 1,
        }
    }

    pub fn average_response_secs(&self) -> Option<f64> {
        if self.response_times_secs.is_empty() {
            return None;
        }
        let total: f64 = self.response_times_secs.iter().sum();
        Some(total / self.response_times_secs.len() as f64)
    }

    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.correct as f64 / self.attempts as f64 * 100.0
    }
}

/// One judged attempt, as forwarded to the stats sink.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub key: String,
    pub verdict: Verdict,
    pub response_time_secs: Option<f64>,
}

/// Running tallies for one session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScoreTracker {
    score: u32,
    correct_count: u32,
    wrong_count: u32,
    streak: u32,
    best_streak: u32,
    history: HashMap<String, HistoryEntry>,
    character_history: Vec<String>,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_correct(&mut self, key: &str, response_time_secs: f64) -> AttemptRecord {
        self.correct_count += 1;
        self.score += 1;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.record(key, Verdict::Correct, Some(response_time_secs))
    }

    pub fn record_incorrect(&mut self, key: &str) -> AttemptRecord {
        self.wrong_count += 1;
        self.score = self.score.saturating_sub(1);
        self.streak = 0;
        self.record(key, Verdict::Incorrect, None)
    }

    fn record(&mut self, key: &str, verdict: Verdict, time: Option<f64>) -> AttemptRecord {
        self.history
            .entry(key.to_string())
            .or_default()
            .apply(verdict, time);
        self.character_history.push(key.to_string());
        AttemptRecord {
            key: key.to_string(),
            verdict,
            response_time_secs: time,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn entry(&self, key: &str) -> Option<&HistoryEntry> {
        self.history.get(key)
    }

    /// Every judged key in order, repeats included.
    pub fn character_history(&self) -> &[String] {
        &self.character_history
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.correct_count + self.wrong_count;
        if total == 0 {
            return 100.0;
        }
        self.correct_count as f64 / total as f64 * 100.0
    }

    pub fn average_response_secs(&self) -> Option<f64> {
        let times: Vec<f64> = self
            .history
            .values()
            .flat_map(|e| e.response_times_secs.iter().copied())
            .collect();
        if times.is_empty() {
            return None;
        }
        Some(times.iter().sum::<f64>() / times.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_increments_by_one() {
        let mut tracker = ScoreTracker::new();
        let record = tracker.record_correct("あ", 1.5);
        assert_eq!(tracker.score(), 1);
        assert_eq!(tracker.correct_count(), 1);
        assert_eq!(tracker.wrong_count(), 0);
        assert_eq!(record.verdict, Verdict::Correct);
        assert_eq!(record.response_time_secs, Some(1.5));

        let entry = tracker.entry("あ").unwrap();
        assert_eq!(entry.attempts, 1);
        assert_eq!(entry.correct, 1);
        assert_eq!(entry.response_times_secs, vec![1.5]);
    }

    #[test]
    fn test_score_never_below_zero() {
        let mut tracker = ScoreTracker::new();
        for _ in 0..10 {
            tracker.record_incorrect("あ");
            assert_eq!(tracker.score(), 0);
        }
        assert_eq!(tracker.wrong_count(), 10);
        assert_eq!(tracker.correct_count(), 0);
    }

    #[test]
    fn test_incorrect_decrements_and_records_no_time() {
        let mut tracker = ScoreTracker::new();
        tracker.record_correct("あ", 0.8);
        tracker.record_correct("い", 0.9);
        let record = tracker.record_incorrect("あ");
        assert_eq!(tracker.score(), 1);
        assert_eq!(record.response_time_secs, None);

        let entry = tracker.entry("あ").unwrap();
        assert_eq!(entry.attempts, 2);
        assert_eq!(entry.wrong, 1);
        assert_eq!(entry.response_times_secs, vec![0.8]);
    }

    #[test]
    fn test_streak_resets_on_miss() {
        let mut tracker = ScoreTracker::new();
        tracker.record_correct("あ", 1.0);
        tracker.record_correct("い", 1.0);
        tracker.record_correct("う", 1.0);
        tracker.record_incorrect("え");
        tracker.record_correct("お", 1.0);
        assert_eq!(tracker.streak(), 1);
        assert_eq!(tracker.best_streak(), 3);
    }

    #[test]
    fn test_character_history_is_append_only() {
        let mut tracker = ScoreTracker::new();
        tracker.record_incorrect("か");
        tracker.record_correct("か", 2.0);
        tracker.record_correct("き", 1.0);
        assert_eq!(tracker.character_history(), &["か", "か", "き"]);
    }

    #[test]
    fn test_derived_analytics() {
        let mut tracker = ScoreTracker::new();
        assert_eq!(tracker.accuracy(), 100.0);
        assert_eq!(tracker.average_response_secs(), None);

        tracker.record_correct("あ", 1.0);
        tracker.record_correct("い", 3.0);
        tracker.record_incorrect("う");
        tracker.record_incorrect("う");
        assert!((tracker.accuracy() - 50.0).abs() < 1e-9);
        assert_eq!(tracker.average_response_secs(), Some(2.0));
        assert_eq!(tracker.entry("う").unwrap().accuracy(), 0.0);
        assert_eq!(tracker.entry("い").unwrap().average_response_secs(), Some(3.0));
    }
}
