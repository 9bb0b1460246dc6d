use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::engine::pool::{Pool, PromptItem};

/// Upper bound on rejection sampling before falling back to a direct pick.
pub const MAX_RESAMPLE_ATTEMPTS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    /// The picked key differs from the excluded one (or nothing was excluded).
    Fresh,
    /// The pool holds a single key, so the excluded key came back.
    RepeatUnavoidable,
}

#[derive(Clone, Debug)]
pub struct Pick {
    pub item: Arc<PromptItem>,
    pub rotation: Rotation,
}

/// Uniformly pick the next prompt, never returning `exclude` unless the pool
/// has only one key.
pub fn pick_next<R: Rng>(pool: &Pool, exclude: Option<&str>, rng: &mut R) -> Pick {
    let items = pool.items();
    let sample = |rng: &mut R| Arc::clone(&items[rng.gen_range(0..items.len())]);

    let Some(excluded) = exclude else {
        return Pick {
            item: sample(rng),
            rotation: Rotation::Fresh,
        };
    };

    if items.len() == 1 {
        let item = Arc::clone(&items[0]);
        let rotation = if item.key() == excluded {
            Rotation::RepeatUnavoidable
        } else {
            Rotation::Fresh
        };
        return Pick { item, rotation };
    }

    for _ in 0..MAX_RESAMPLE_ATTEMPTS {
        let item = sample(rng);
        if item.key() != excluded {
            return Pick {
                item,
                rotation: Rotation::Fresh,
            };
        }
    }

    // Keys are distinct, so with more than one item at least one differs.
    let others: Vec<&Arc<PromptItem>> = items.iter().filter(|i| i.key() != excluded).collect();
    let item = match others.choose(rng) {
        Some(item) => Arc::clone(item),
        None => Arc::clone(&items[0]),
    };
    Pick {
        item,
        rotation: Rotation::Fresh,
    }
}

/// One selectable answer in pick mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Key of the prompt this option's label belongs to.
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceSet {
    pub options: Vec<ChoiceOption>,
    /// How many requested distractors could not be supplied by the pool.
    pub shortfall: usize,
}

impl ChoiceSet {
    pub fn correct_position(&self, correct_key: &str) -> Option<usize> {
        self.options.iter().position(|o| o.key == correct_key)
    }
}

/// Which side of an item an option displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionFace {
    /// The item's primary answer; the prompt shows the key.
    Answer,
    /// The item's key; the prompt shows the primary answer.
    Key,
}

impl OptionFace {
    pub fn label(self, item: &PromptItem) -> &str {
        match self {
            OptionFace::Answer => item.primary_answer(),
            OptionFace::Key => item.key(),
        }
    }
}

/// Build the shuffled option list for `correct`: its primary answer plus up to
/// `distractor_count` primary answers of other prompts.
pub fn build_choice_set<R: Rng>(
    pool: &Pool,
    correct: &PromptItem,
    distractor_count: usize,
    rng: &mut R,
) -> ChoiceSet {
    build_choice_set_with(pool, correct, distractor_count, OptionFace::Answer, rng)
}

/// Like [`build_choice_set`], labelling every option with `face`.
///
/// Distractors have distinct keys and labels distinct from each other and from
/// the correct label, so no two options ever read the same.
pub fn build_choice_set_with<R: Rng>(
    pool: &Pool,
    correct: &PromptItem,
    distractor_count: usize,
    face: OptionFace,
    rng: &mut R,
) -> ChoiceSet {
    let mut candidates: Vec<&Arc<PromptItem>> = pool
        .items()
        .iter()
        .filter(|item| item.key() != correct.key())
        .collect();
    candidates.shuffle(rng);

    let mut options = vec![ChoiceOption {
        key: correct.key().to_string(),
        label: face.label(correct).to_string(),
        disabled: false,
    }];

    for candidate in candidates {
        if options.len() > distractor_count {
            break;
        }
        let label = face.label(candidate);
        if options.iter().any(|o| o.label == label) {
            continue;
        }
        options.push(ChoiceOption {
            key: candidate.key().to_string(),
            label: label.to_string(),
            disabled: false,
        });
    }

    let shortfall = distractor_count.saturating_sub(options.len() - 1);
    options.shuffle(rng);

    ChoiceSet { options, shortfall }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn kana_pool() -> Pool {
        Pool::from_pairs(&[
            ("あ", &["a"]),
            ("い", &["i"]),
            ("う", &["u"]),
            ("え", &["e"]),
            ("お", &["o"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_pick_never_repeats_excluded() {
        let pool = kana_pool();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut current = pick_next(&pool, None, &mut rng).item;
        for _ in 0..1_000 {
            let next = pick_next(&pool, Some(current.key()), &mut rng);
            assert_ne!(next.item.key(), current.key());
            assert_eq!(next.rotation, Rotation::Fresh);
            current = next.item;
        }
    }

    #[test]
    fn test_two_key_pool_alternates() {
        let pool = Pool::from_pairs(&[("あ", &["a"]), ("い", &["i"])]).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(pick_next(&pool, Some("あ"), &mut rng).item.key(), "い");
            assert_eq!(pick_next(&pool, Some("い"), &mut rng).item.key(), "あ");
        }
    }

    #[test]
    fn test_single_key_pool_repeat_is_reported() {
        let pool = Pool::from_pairs(&[("ん", &["n"])]).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let pick = pick_next(&pool, Some("ん"), &mut rng);
        assert_eq!(pick.item.key(), "ん");
        assert_eq!(pick.rotation, Rotation::RepeatUnavoidable);

        let first = pick_next(&pool, None, &mut rng);
        assert_eq!(first.rotation, Rotation::Fresh);
    }

    #[test]
    fn test_pick_covers_whole_pool() {
        let pool = kana_pool();
        let mut rng = SmallRng::seed_from_u64(11);
        let seen: HashSet<String> = (0..500)
            .map(|_| pick_next(&pool, None, &mut rng).item.key().to_string())
            .collect();
        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn test_choice_set_has_exactly_one_correct_and_distinct_options() {
        let pool = kana_pool();
        let mut rng = SmallRng::seed_from_u64(42);
        for item in pool.items() {
            for _ in 0..50 {
                let set = build_choice_set(&pool, item, 2, &mut rng);
                assert_eq!(set.options.len(), 3);
                assert_eq!(set.shortfall, 0);
                let correct = set.options.iter().filter(|o| o.key == item.key()).count();
                assert_eq!(correct, 1);
                let keys: HashSet<&str> = set.options.iter().map(|o| o.key.as_str()).collect();
                let labels: HashSet<&str> = set.options.iter().map(|o| o.label.as_str()).collect();
                assert_eq!(keys.len(), 3);
                assert_eq!(labels.len(), 3);
                assert!(set.options.iter().all(|o| !o.disabled));
            }
        }
    }

    #[test]
    fn test_choice_set_degrades_on_small_pool() {
        let pool = Pool::from_pairs(&[("あ", &["a"]), ("い", &["i"])]).unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        let correct = pool.get("あ").unwrap();
        let set = build_choice_set(&pool, correct, 2, &mut rng);
        assert_eq!(set.options.len(), 2);
        assert_eq!(set.shortfall, 1);

        let lonely = Pool::from_pairs(&[("ん", &["n"])]).unwrap();
        let set = build_choice_set(&lonely, lonely.get("ん").unwrap(), 2, &mut rng);
        assert_eq!(set.options.len(), 1);
        assert_eq!(set.shortfall, 2);
        assert_eq!(set.options[0].label, "n");
    }

    #[test]
    fn test_choice_set_skips_colliding_labels() {
        // じ and ぢ are both romanized "ji"
        let pool = Pool::from_pairs(&[("じ", &["ji"]), ("ぢ", &["ji"]), ("か", &["ka"])]).unwrap();
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..50 {
            let set = build_choice_set(&pool, pool.get("じ").unwrap(), 2, &mut rng);
            assert_eq!(set.options.len(), 2);
            assert_eq!(set.shortfall, 1);
            assert!(set.options.iter().all(|o| o.key != "ぢ"));
        }
    }

    #[test]
    fn test_key_face_labels_options_with_keys() {
        // the colliding "ji" readings are fine when options show the kana
        let pool = Pool::from_pairs(&[("じ", &["ji"]), ("ぢ", &["ji"]), ("か", &["ka"])]).unwrap();
        let mut rng = SmallRng::seed_from_u64(9);
        let set = build_choice_set_with(&pool, pool.get("じ").unwrap(), 2, OptionFace::Key, &mut rng);
        assert_eq!(set.shortfall, 0);
        assert!(set.options.iter().all(|o| o.label == o.key));
        assert_eq!(set.correct_position("じ").map(|i| set.options[i].label.as_str()), Some("じ"));
    }

    #[test]
    fn test_correct_position_roughly_uniform() {
        let pool = kana_pool();
        let correct = pool.get("う").unwrap();
        let mut rng = SmallRng::seed_from_u64(2024);
        let trials = 30_000;
        let mut counts = [0usize; 3];
        for _ in 0..trials {
            let set = build_choice_set(&pool, correct, 2, &mut rng);
            counts[set.correct_position("う").unwrap()] += 1;
        }
        let expected = trials as f64 / 3.0;
        for (pos, &count) in counts.iter().enumerate() {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(
                deviation < 0.05,
                "position {pos} chosen {count} times, expected about {expected:.0}"
            );
        }
    }
}
