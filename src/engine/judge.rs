use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

/// Trim, lowercase and NFC-compose typed text.
///
/// Composition matters for kana answers: an IME may hand us `か` followed by a
/// combining dakuten instead of the precomposed `が`.
pub fn normalize_answer(text: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    nfc.normalize(text.trim()).to_lowercase()
}

/// Judge typed input against a prompt's accepted answers.
///
/// `accepted` is expected to be normalized already (pools normalize at load).
pub fn evaluate_text(submitted: &str, accepted: &[String]) -> Verdict {
    let normalized = normalize_answer(submitted);
    if accepted.iter().any(|a| *a == normalized) {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

pub fn evaluate(submitted: &str, accepted: &[String]) -> Verdict {
    evaluate_text(submitted, accepted)
}

/// Judge a picked option. Options are selected, not typed, so keys are
/// compared as-is.
pub fn evaluate_choice(selected_key: &str, prompt_key: &str) -> Verdict {
    if selected_key == prompt_key {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(answers: &[&str]) -> Vec<String> {
        answers.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(evaluate(" Ka ", &accepted(&["ka"])), Verdict::Correct);
    }

    #[test]
    fn test_case_ignored() {
        assert_eq!(evaluate("KA", &accepted(&["ka"])), Verdict::Correct);
    }

    #[test]
    fn test_wrong_answer() {
        assert_eq!(evaluate("ka ", &accepted(&["ki"])), Verdict::Incorrect);
    }

    #[test]
    fn test_any_accepted_answer_matches() {
        let meanings = accepted(&["water", "cold water"]);
        assert_eq!(evaluate("Cold Water", &meanings), Verdict::Correct);
        assert_eq!(evaluate("water", &meanings), Verdict::Correct);
        assert_eq!(evaluate("wate", &meanings), Verdict::Incorrect);
    }

    #[test]
    fn test_empty_submission_is_incorrect() {
        assert_eq!(evaluate("", &accepted(&["a"])), Verdict::Incorrect);
        assert_eq!(evaluate("   ", &accepted(&["a"])), Verdict::Incorrect);
    }

    #[test]
    fn test_inner_whitespace_is_significant() {
        assert_eq!(evaluate("coldwater", &accepted(&["cold water"])), Verdict::Incorrect);
    }

    #[test]
    fn test_decomposed_kana_matches_precomposed() {
        // か + combining voiced sound mark
        let decomposed = "\u{304B}\u{3099}";
        assert_eq!(evaluate(decomposed, &accepted(&["が"])), Verdict::Correct);
        assert_eq!(normalize_answer(decomposed), "が");
    }

    #[test]
    fn test_choice_compares_keys_exactly() {
        assert_eq!(evaluate_choice("あ", "あ"), Verdict::Correct);
        assert_eq!(evaluate_choice("い", "あ"), Verdict::Incorrect);
        assert_eq!(evaluate_choice(" あ", "あ"), Verdict::Incorrect);
        assert!(evaluate_choice("あ", "あ").is_correct());
    }
}
