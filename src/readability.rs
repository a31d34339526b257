//! Flesch Reading Ease.
//!
//! `206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words)`,
//! clamped to 0..=100. Higher is easier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bands::{classify, round1, Band};
use crate::text::TextStats;

struct Hyperparameters {
    base: f64,
    sentence_length_weight: f64,
    syllable_weight: f64,
    score_min: f64,
    score_max: f64,
}

static HP: Hyperparameters = Hyperparameters {
    base: 206.835,
    sentence_length_weight: 1.015,
    syllable_weight: 84.6,
    score_min: 0.0,
    score_max: 100.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingEase {
    #[serde(rename = "Very easy")]
    VeryEasy,
    #[serde(rename = "Easy")]
    Easy,
    #[serde(rename = "Fairly easy")]
    FairlyEasy,
    #[serde(rename = "Standard")]
    Standard,
    #[serde(rename = "Fairly difficult")]
    FairlyDifficult,
    #[serde(rename = "Difficult")]
    Difficult,
    #[serde(rename = "Very difficult")]
    VeryDifficult,
}

impl fmt::Display for ReadingEase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReadingEase::VeryEasy => "Very easy",
            ReadingEase::Easy => "Easy",
            ReadingEase::FairlyEasy => "Fairly easy",
            ReadingEase::Standard => "Standard",
            ReadingEase::FairlyDifficult => "Fairly difficult",
            ReadingEase::Difficult => "Difficult",
            ReadingEase::VeryDifficult => "Very difficult",
        };
        f.write_str(s)
    }
}

pub static READING_EASE_BANDS: [Band<ReadingEase>; 7] = [
    Band::at_least(90.0, ReadingEase::VeryEasy),
    Band::at_least(80.0, ReadingEase::Easy),
    Band::at_least(70.0, ReadingEase::FairlyEasy),
    Band::at_least(60.0, ReadingEase::Standard),
    Band::at_least(50.0, ReadingEase::FairlyDifficult),
    Band::at_least(30.0, ReadingEase::Difficult),
    Band::at_least(f64::NEG_INFINITY, ReadingEase::VeryDifficult),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityReport {
    pub flesch_score: Option<f64>,
    pub label: Option<ReadingEase>,
    pub stats: TextStats,
}

/// Unrounded, clamped score, or `None` when there are no words or no
/// sentences.
pub fn flesch_reading_ease(stats: &TextStats) -> Option<f64> {
    let words_per_sentence = stats.avg_sentence_length?;
    let syllables_per_word = stats.avg_syllables_per_word?;
    let raw = HP.base
        - HP.sentence_length_weight * words_per_sentence
        - HP.syllable_weight * syllables_per_word;
    Some(raw.clamp(HP.score_min, HP.score_max))
}

#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn score(text: &str) -> ReadabilityReport {
    let stats = TextStats::from_text(text);
    let score = flesch_reading_ease(&stats).map(round1);
    let label = score.and_then(|s| classify(&READING_EASE_BANDS, s));
    tracing::debug!(?score, ?label, "scored readability");
    ReadabilityReport {
        flesch_score: score,
        label,
        stats: stats.rounded(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_sentences_are_very_easy() {
        let report = score("This is a simple test. It has two short sentences.");
        // 206.835 - 1.015 * 5 - 84.6 * 1.3 = 91.78
        assert_eq!(report.flesch_score, Some(91.8));
        assert_eq!(report.label, Some(ReadingEase::VeryEasy));
    }

    #[test]
    fn dense_prose_is_difficult() {
        let text = "The implementation of the comprehensive organizational restructuring \
                    initiative necessitated the establishment of interdepartmental \
                    communication protocols that facilitated the dissemination of \
                    procedural documentation.";
        let report = score(text);
        let label = report.label.unwrap();
        assert!(matches!(
            label,
            ReadingEase::Difficult | ReadingEase::VeryDifficult
        ));
    }

    #[test]
    fn empty_text_is_not_applicable() {
        let report = score("");
        assert_eq!(report.flesch_score, None);
        assert_eq!(report.label, None);
        assert_eq!(report.stats.word_count, 0);
    }

    #[test]
    fn score_is_clamped() {
        let stats = TextStats {
            sentence_count: 1,
            word_count: 1,
            syllable_count: 1,
            avg_sentence_length: Some(1.0),
            avg_syllables_per_word: Some(1.0),
        };
        assert_eq!(flesch_reading_ease(&stats), Some(100.0));

        let stats = TextStats {
            avg_sentence_length: Some(80.0),
            avg_syllables_per_word: Some(3.0),
            ..stats
        };
        assert_eq!(flesch_reading_ease(&stats), Some(0.0));
    }

    #[test]
    fn band_edges_are_inclusive_at_the_floor() {
        assert_eq!(classify(&READING_EASE_BANDS, 90.0), Some(ReadingEase::VeryEasy));
        assert_eq!(classify(&READING_EASE_BANDS, 89.9), Some(ReadingEase::Easy));
        assert_eq!(classify(&READING_EASE_BANDS, 30.0), Some(ReadingEase::Difficult));
        assert_eq!(classify(&READING_EASE_BANDS, 29.9), Some(ReadingEase::VeryDifficult));
        assert_eq!(classify(&READING_EASE_BANDS, 0.0), Some(ReadingEase::VeryDifficult));
    }

    #[test]
    fn scoring_is_deterministic() {
        let text = "Short words help. Long, winding, convoluted sentences rarely do.";
        assert_eq!(score(text), score(text));
    }
}
