use crate::util::percent;
use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};

/// Splits on whitespace, lowercases, then drops every non-word character
pub fn normalize_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.to_lowercase()
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect()
        })
        .collect()
}

/// Word-by-word result of a dictation check
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptComparison {
    pub reference_words: Vec<String>,
    pub candidate_words: Vec<String>,
    pub matched_count: usize,
    pub accuracy: f64,
    pub passed: bool,
}

/// Outcome of one reference position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordMatch<'a> {
    pub index: usize,
    pub expected: &'a str,
    pub given: Option<&'a str>,
}

impl WordMatch<'_> {
    pub fn is_match(&self) -> bool {
        self.given == Some(self.expected)
    }
}

impl TranscriptComparison {
    /// Rounded accuracy as an integer percentage
    pub fn score(&self) -> u8 {
        self.accuracy.clamp(0.0, 100.0) as u8
    }

    pub fn feedback(&self) -> DictationFeedback {
        DictationFeedback::for_accuracy(self.score())
    }

    /// One entry per reference word; extra candidate words are not reported
    pub fn word_matches(&self) -> Vec<WordMatch<'_>> {
        self.reference_words
            .iter()
            .zip_longest(self.candidate_words.iter())
            .enumerate()
            .filter_map(|(index, pair)| match pair {
                EitherOrBoth::Both(expected, given) => Some(WordMatch {
                    index,
                    expected: expected.as_str(),
                    given: Some(given.as_str()),
                }),
                EitherOrBoth::Left(expected) => Some(WordMatch {
                    index,
                    expected: expected.as_str(),
                    given: None,
                }),
                EitherOrBoth::Right(_) => None,
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DictationFeedback {
    Excellent,
    Good,
    Fair,
    KeepPracticing,
}

impl DictationFeedback {
    pub fn for_accuracy(accuracy: u8) -> Self {
        match accuracy {
            90.. => DictationFeedback::Excellent,
            75..=89 => DictationFeedback::Good,
            60..=74 => DictationFeedback::Fair,
            _ => DictationFeedback::KeepPracticing,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DictationFeedback::Excellent => "Excellent work! Your transcription is highly accurate.",
            DictationFeedback::Good => "Good job! A few minor errors to work on.",
            DictationFeedback::Fair => "Not bad, but practice will help improve accuracy.",
            DictationFeedback::KeepPracticing => {
                "Keep practicing! Focus on listening carefully to each word."
            }
        }
    }
}

/// Strict positional word comparator: no alignment, no partial credit.
#[derive(Clone, Copy, Debug)]
pub struct Comparator {
    pass_threshold: u8,
}

impl Default for Comparator {
    fn default() -> Self {
        Self { pass_threshold: 75 }
    }
}

impl Comparator {
    pub fn new(pass_threshold: u8) -> Self {
        Self { pass_threshold }
    }

    pub fn pass_threshold(&self) -> u8 {
        self.pass_threshold
    }

    pub fn compare(&self, reference_text: &str, candidate_text: &str) -> TranscriptComparison {
        let reference_words = normalize_words(reference_text);
        let candidate_words = normalize_words(candidate_text);

        let matched_count = reference_words
            .iter()
            .zip(candidate_words.iter())
            .filter(|(r, c)| r == c)
            .count();

        // denominator is always the reference length; empty reference scores 0
        let mut accuracy = percent(matched_count, reference_words.len());
        if matched_count < reference_words.len() {
            // 100 is reserved for a full match, even when rounding would reach it
            accuracy = accuracy.min(99.0);
        }

        TranscriptComparison {
            reference_words,
            candidate_words,
            matched_count,
            accuracy,
            passed: accuracy >= f64::from(self.pass_threshold),
        }
    }
}

/// Compares with the default pass threshold
pub fn compare(reference_text: &str, candidate_text: &str) -> TranscriptComparison {
    Comparator::default().compare(reference_text, candidate_text)
}
