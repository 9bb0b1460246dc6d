use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::controller::{DEFAULT_DISTRACTOR_COUNT, QuizMode};

pub const MIN_DISTRACTORS: usize = 1;
pub const MAX_DISTRACTORS: usize = 5;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,
    #[serde(default = "default_distractor_count")]
    pub distractor_count: usize,
    #[serde(default = "default_sound_enabled")]
    pub sound_enabled: bool,
    #[serde(default)]
    pub dataset_dir: Option<String>,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_mode() -> String {
    QuizMode::Input.as_str().to_string()
}
fn default_groups() -> Vec<String> {
    vec!["hiragana-a".to_string()]
}
fn default_distractor_count() -> usize {
    DEFAULT_DISTRACTOR_COUNT
}
fn default_sound_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            mode: default_mode(),
            groups: default_groups(),
            distractor_count: default_distractor_count(),
            sound_enabled: default_sound_enabled(),
            dataset_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanadrill")
            .join("config.toml")
    }

    pub fn quiz_mode(&self) -> QuizMode {
        QuizMode::from_name(&self.mode).unwrap_or(QuizMode::Input)
    }

    pub fn dataset_path(&self) -> Option<PathBuf> {
        self.dataset_dir
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
    }

    /// Bring a freshly deserialized config back into range. Stale mode names
    /// and groups that no longer exist are dropped rather than rejected.
    pub fn validate(&mut self, known_groups: &[&str]) {
        if QuizMode::from_name(&self.mode).is_none() {
            tracing::warn!(mode = %self.mode, "unknown quiz mode in config, using default");
            self.mode = default_mode();
        }

        self.distractor_count = self
            .distractor_count
            .clamp(MIN_DISTRACTORS, MAX_DISTRACTORS);

        let before = self.groups.len();
        self.groups.retain(|g| known_groups.contains(&g.as_str()));
        self.groups.dedup();
        if self.groups.len() != before {
            tracing::warn!(dropped = before - self.groups.len(), "unknown groups removed from config");
        }
        if self.groups.is_empty() {
            self.groups = default_groups()
                .into_iter()
                .filter(|g| known_groups.contains(&g.as_str()))
                .collect();
        }
    }
}
