use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::judge::normalize_answer;
use crate::error::{QuizError, Result};

/// A prompt shown to the learner and the answers that count as correct.
///
/// Only [`PromptItem::new`] builds one, so answers are always normalized and
/// never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptItem {
    key: String,
    accepted_answers: Vec<String>,
}

impl PromptItem {
    /// Build an item, normalizing answers and dropping blanks and duplicates.
    pub fn new<I, S>(key: impl Into<String>, answers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = key.into();
        let mut accepted_answers: Vec<String> = Vec::new();
        for answer in answers {
            let normalized = normalize_answer(answer.as_ref());
            if !normalized.is_empty() && !accepted_answers.contains(&normalized) {
                accepted_answers.push(normalized);
            }
        }
        if accepted_answers.is_empty() {
            return Err(QuizError::NoAcceptedAnswers { key });
        }
        Ok(Self {
            key,
            accepted_answers,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn accepted_answers(&self) -> &[String] {
        &self.accepted_answers
    }

    /// First accepted answer; used as the label when the item is an option.
    pub fn primary_answer(&self) -> &str {
        &self.accepted_answers[0]
    }
}

/// The set of prompts eligible for selection. Never empty, keys are distinct.
#[derive(Clone, Debug)]
pub struct Pool {
    items: Vec<Arc<PromptItem>>,
}

impl Pool {
    /// Items sharing a key are merged: answers are concatenated in first-seen
    /// order without duplicates.
    pub fn new(items: impl IntoIterator<Item = PromptItem>) -> Result<Self> {
        let mut merged: Vec<PromptItem> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for item in items {
            match index.get(&item.key) {
                Some(&i) => {
                    let existing = &mut merged[i];
                    for answer in item.accepted_answers {
                        if !existing.accepted_answers.contains(&answer) {
                            existing.accepted_answers.push(answer);
                        }
                    }
                }
                None => {
                    index.insert(item.key.clone(), merged.len());
                    merged.push(item);
                }
            }
        }

        if merged.is_empty() {
            return Err(QuizError::EmptyPool);
        }

        let items = merged
            .into_iter()
            .map(|item| PromptItem::new(item.key, item.accepted_answers).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items })
    }

    /// Convenience for tests and small hand-built drills.
    pub fn from_pairs(pairs: &[(&str, &[&str])]) -> Result<Self> {
        let items = pairs
            .iter()
            .map(|(key, answers)| PromptItem::new(*key, answers.iter()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(items)
    }

    pub fn items(&self) -> &[Arc<PromptItem>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Arc<PromptItem>> {
        self.items.iter().find(|item| item.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_normalizes_answers() {
        let item = PromptItem::new("水", ["  Water ", "water", "COLD WATER", ""]).unwrap();
        assert_eq!(item.accepted_answers, vec!["water", "cold water"]);
        assert_eq!(item.primary_answer(), "water");
    }

    #[test]
    fn test_item_without_answers_rejected() {
        let err = PromptItem::new("あ", ["  "]).unwrap_err();
        assert_eq!(
            err,
            QuizError::NoAcceptedAnswers {
                key: "あ".to_string()
            }
        );
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert_eq!(Pool::new(Vec::new()).unwrap_err(), QuizError::EmptyPool);
    }

    #[test]
    fn test_duplicate_keys_merged() {
        let pool = Pool::new(vec![
            PromptItem::new("を", ["wo"]).unwrap(),
            PromptItem::new("あ", ["a"]).unwrap(),
            PromptItem::new("を", ["o", "wo"]).unwrap(),
        ])
        .unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get("を").unwrap().accepted_answers, vec!["wo", "o"]);
    }

    #[test]
    fn test_pool_revalidates_items() {
        let shouty = PromptItem {
            key: "か".to_string(),
            accepted_answers: vec![" KA ".to_string()],
        };
        let pool = Pool::new(vec![shouty]).unwrap();
        assert_eq!(pool.get("か").unwrap().accepted_answers(), ["ka"]);

        let blank = PromptItem {
            key: "あ".to_string(),
            accepted_answers: Vec::new(),
        };
        let ok = PromptItem::new("い", ["i"]).unwrap();
        assert_eq!(
            Pool::new(vec![blank, ok]).unwrap_err(),
            QuizError::NoAcceptedAnswers {
                key: "あ".to_string()
            }
        );
    }

    #[test]
    fn test_from_pairs() {
        let pool = Pool::from_pairs(&[("あ", &["a"]), ("い", &["i"])]).unwrap();
        assert_eq!(pool.len(), 2);
        assert!(pool.get("い").is_some());
        assert!(pool.get("う").is_none());
    }
}
