use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::schema::{SessionHistoryData, StatsData};

const STATS_FILE: &str = "stats.json";
const SESSIONS_FILE: &str = "session_history.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(Self::default_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanadrill")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!(file = name, %err, "unreadable stats file, starting fresh");
                T::default()
            }),
            Err(err) => {
                tracing::warn!(file = name, %err, "failed to read stats file");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Lifetime stats. A file written under another schema version is
    /// discarded rather than half-interpreted.
    pub fn load_stats(&self) -> StatsData {
        let stats: StatsData = self.load(STATS_FILE);
        if stats.needs_reset() {
            tracing::info!(
                found = stats.schema_version,
                "stats schema changed, resetting lifetime stats"
            );
            return StatsData::default();
        }
        stats
    }

    pub fn save_stats(&self, data: &StatsData) -> Result<()> {
        self.save(STATS_FILE, data)
    }

    pub fn load_session_history(&self) -> SessionHistoryData {
        let history: SessionHistoryData = self.load(SESSIONS_FILE);
        if history.schema_version != crate::store::schema::SCHEMA_VERSION {
            return SessionHistoryData::default();
        }
        history
    }

    pub fn save_session_history(&self, data: &SessionHistoryData) -> Result<()> {
        self.save(SESSIONS_FILE, data)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::engine::judge::Verdict;
    use crate::engine::score::AttemptRecord;
    use crate::session::result::SessionSummary;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_files_load_defaults() {
        let (_dir, store) = make_test_store();
        let stats = store.load_stats();
        assert!(stats.items.is_empty());
        assert!(store.load_session_history().sessions.is_empty());
    }

    #[test]
    fn test_stats_round_trip() {
        let (_dir, store) = make_test_store();
        let mut stats = StatsData::default();
        stats.apply(&AttemptRecord {
            key: "ア".to_string(),
            verdict: Verdict::Correct,
            response_time_secs: Some(1.25),
        });
        store.save_stats(&stats).unwrap();

        let loaded = store.load_stats();
        assert_eq!(loaded.total_correct, 1);
        assert_eq!(loaded.items["ア"].response_times_secs, vec![1.25]);
        assert!(!store.file_path("stats.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(STATS_FILE), "{ not json").unwrap();
        let stats = store.load_stats();
        assert_eq!(stats.total_correct, 0);
    }

    #[test]
    fn test_stale_schema_is_reset() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path(STATS_FILE),
            r#"{"schema_version": 99, "items": {}, "total_correct": 7, "total_wrong": 0}"#,
        )
        .unwrap();
        assert_eq!(store.load_stats().total_correct, 0);
    }

    #[test]
    fn test_session_history_round_trip() {
        let (_dir, store) = make_test_store();
        let mut history = SessionHistoryData::default();
        history.push(SessionSummary {
            mode: "pick".to_string(),
            groups: vec!["katakana-a".to_string()],
            correct: 4,
            wrong: 1,
            score: 3,
            best_streak: 4,
            accuracy: 80.0,
            avg_response_secs: Some(1.1),
            elapsed_secs: 30.0,
            timestamp: Utc::now(),
        });
        store.save_session_history(&history).unwrap();

        let loaded = store.load_session_history();
        assert_eq!(loaded.sessions.len(), 1);
        assert_eq!(loaded.sessions[0].mode, "pick");
        assert_eq!(loaded.sessions[0].score, 3);
    }
}
