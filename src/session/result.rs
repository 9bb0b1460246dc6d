use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::session::controller::SessionController;

/// Snapshot of a finished (or abandoned) quiz session for the history log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub mode: String,
    pub groups: Vec<String>,
    pub correct: u32,
    pub wrong: u32,
    pub score: u32,
    #[serde(default)]
    pub best_streak: u32,
    pub accuracy: f64,
    #[serde(default)]
    pub avg_response_secs: Option<f64>,
    pub elapsed_secs: f64,
    pub timestamp: DateTime<Utc>,
}

impl SessionSummary {
    pub fn from_session<R: Rng>(
        session: &SessionController<R>,
        groups: &[String],
        elapsed_secs: f64,
    ) -> Self {
        let tracker = session.tracker();
        let mut groups = groups.to_vec();
        groups.sort();

        Self {
            mode: session.mode().as_str().to_string(),
            groups,
            correct: tracker.correct_count(),
            wrong: tracker.wrong_count(),
            score: tracker.score(),
            best_streak: tracker.best_streak(),
            accuracy: tracker.accuracy(),
            avg_response_secs: tracker.average_response_secs(),
            elapsed_secs,
            timestamp: Utc::now(),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.correct + self.wrong
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::engine::pool::Pool;
    use crate::session::controller::{QuizMode, SessionBuilder, SessionConfig};

    #[test]
    fn summary_reflects_tracker() {
        let pool = Pool::from_pairs(&[("あ", &["a"]), ("い", &["i"]), ("う", &["u"])]).unwrap();
        let mut session = SessionBuilder::new(QuizMode::Input, SessionConfig::default())
            .rng(SmallRng::seed_from_u64(1))
            .start(pool);
        let answer = session.current_prompt().primary_answer().to_string();
        session.submit_text(&answer);
        session.submit_text("nope");

        let groups = vec!["hiragana-k".to_string(), "hiragana-a".to_string()];
        let summary = SessionSummary::from_session(&session, &groups, 12.5);
        assert_eq!(summary.mode, "input");
        assert_eq!(summary.groups, vec!["hiragana-a", "hiragana-k"]);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.wrong, 1);
        assert_eq!(summary.attempts(), 2);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.best_streak, 1);
        assert!((summary.accuracy - 50.0).abs() < 1e-9);
        assert_eq!(summary.elapsed_secs, 12.5);
    }
}
