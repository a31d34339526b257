use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bands::{classify, deduplicate, round1, Band};
use crate::readability::{self, ReadabilityReport, ReadingEase};
use crate::text::{self, Document};

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct Hyperparameters {
    short_sentence_max_words: usize,
    long_sentence_min_words: usize,
    avg_sentence_length_limit: f64,
    formality_prior: f64,
    score_max: f64,
}

static HP: Hyperparameters = Hyperparameters {
    short_sentence_max_words: 9,
    long_sentence_min_words: 21,
    avg_sentence_length_limit: 25.0,
    formality_prior: 1.0,
    score_max: 100.0,
};

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Formality {
    Casual,
    Conversational,
    SemiFormal,
    Formal,
}

impl fmt::Display for Formality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Formality::Casual => "Casual",
            Formality::Conversational => "Conversational",
            Formality::SemiFormal => "Semi-formal",
            Formality::Formal => "Formal",
        };
        f.write_str(s)
    }
}

pub static FORMALITY_BANDS: [Band<Formality>; 4] = [
    Band::at_least(71.0, Formality::Formal),
    Band::at_least(51.0, Formality::SemiFormal),
    Band::at_least(31.0, Formality::Conversational),
    Band::at_least(0.0, Formality::Casual),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Professional,
    Friendly,
    Authoritative,
    Conversational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    FirstPerson,
    SecondPerson,
    ThirdPerson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variety {
    Low,
    Medium,
    High,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Authoritative => "authoritative",
            Tone::Conversational => "conversational",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Perspective::FirstPerson => "first person",
            Perspective::SecondPerson => "second person",
            Perspective::ThirdPerson => "third person",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Variety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Variety::Low => "low",
            Variety::Medium => "medium",
            Variety::High => "high",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

fn word_alternation(words: &[&str]) -> Regex {
    let alt = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)\\b({alt})\\b")).unwrap()
}

static FORMAL_RE: Lazy<Regex> = Lazy::new(|| {
    word_alternation(&[
        "therefore",
        "furthermore",
        "moreover",
        "consequently",
        "accordingly",
        "nevertheless",
        "hereby",
        "pursuant",
        "regarding",
        "whereas",
        "thus",
        "hence",
        "shall",
        "subsequently",
        "additionally",
        "notwithstanding",
    ])
});

static CASUAL_RE: Lazy<Regex> = Lazy::new(|| {
    word_alternation(&[
        "hey", "cool", "awesome", "stuff", "yeah", "gonna", "wanna", "kinda", "gotta", "super",
        "totally", "folks", "okay", "ok", "lol", "btw", "guys",
    ])
});

// `'s` is only a contraction after pronouns and adverbs; elsewhere it marks a
// possessive.
static CONTRACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:[a-z]+['\u{2019}](?:re|ve|ll|d|t|m)|(?:it|that|he|she|there|here|what|who|where|let)['\u{2019}]s)\b",
    )
    .unwrap()
});

static EXCLAMATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!+").unwrap());

static TONE_PATTERNS: Lazy<Vec<(Tone, Regex)>> = Lazy::new(|| {
    vec![
        (
            Tone::Professional,
            word_alternation(&[
                "expertise",
                "solution",
                "solutions",
                "deliver",
                "ensure",
                "strategic",
                "objective",
                "objectives",
                "efficient",
                "framework",
                "stakeholders",
            ]),
        ),
        (
            Tone::Friendly,
            word_alternation(&[
                "happy", "glad", "love", "thanks", "thank", "welcome", "enjoy", "excited",
                "together", "share",
            ]),
        ),
        (
            Tone::Authoritative,
            word_alternation(&[
                "must",
                "proven",
                "always",
                "never",
                "essential",
                "required",
                "guarantee",
                "definitive",
                "critical",
            ]),
        ),
        (
            Tone::Conversational,
            word_alternation(&[
                "you know",
                "let's",
                "imagine",
                "basically",
                "actually",
                "pretty",
                "really",
                "honestly",
            ]),
        ),
    ]
});

static PERSPECTIVE_PATTERNS: Lazy<Vec<(Perspective, Regex)>> = Lazy::new(|| {
    vec![
        (
            Perspective::FirstPerson,
            word_alternation(&["i", "me", "my", "mine", "we", "us", "our", "ours"]),
        ),
        (
            Perspective::SecondPerson,
            word_alternation(&["you", "your", "yours", "yourself"]),
        ),
        (
            Perspective::ThirdPerson,
            word_alternation(&["he", "she", "they", "them", "their", "his", "her", "it", "its"]),
        ),
    ]
});

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerCounts {
    pub formal: usize,
    pub casual: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceAnalysis {
    pub average_length: Option<f64>,
    pub short: usize,
    pub medium: usize,
    pub long: usize,
    pub variety: Option<Variety>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceReport {
    pub word_count: usize,
    pub formality_score: Option<u8>,
    pub formality: Option<Formality>,
    pub markers: MarkerCounts,
    pub tone: Option<Tone>,
    pub perspective: Option<Perspective>,
    pub sentence_analysis: SentenceAnalysis,
    pub readability: ReadabilityReport,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// First label with the strictly highest count; `None` when nothing matched.
fn dominant<L: Copy>(text: &str, patterns: &[(L, Regex)]) -> Option<L> {
    let mut best: Option<(L, usize)> = None;
    for (label, re) in patterns {
        let count = re.find_iter(text).count();
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((*label, count));
        }
    }
    best.map(|(label, _)| label)
}

fn count_markers(text: &str) -> MarkerCounts {
    MarkerCounts {
        formal: FORMAL_RE.find_iter(text).count(),
        casual: CASUAL_RE.find_iter(text).count()
            + CONTRACTION_RE.find_iter(text).count()
            + EXCLAMATION_RE.find_iter(text).count(),
    }
}

/// Smoothed share of formal markers, 0..=100.
fn score_formality(markers: &MarkerCounts) -> u8 {
    let formal = markers.formal as f64 + HP.formality_prior;
    let total = (markers.formal + markers.casual) as f64 + 2.0 * HP.formality_prior;
    (HP.score_max * formal / total).round().clamp(0.0, HP.score_max) as u8
}

fn analyze_sentences(sentences: &[String]) -> SentenceAnalysis {
    let lengths: Vec<usize> = sentences.iter().map(|s| text::word_count(s)).collect();
    let short = lengths
        .iter()
        .filter(|&&n| n <= HP.short_sentence_max_words)
        .count();
    let long = lengths
        .iter()
        .filter(|&&n| n >= HP.long_sentence_min_words)
        .count();
    let medium = lengths.len() - short - long;

    let average_length = (!lengths.is_empty())
        .then(|| round1(lengths.iter().sum::<usize>() as f64 / lengths.len() as f64));

    let variety = match [short, medium, long].iter().filter(|&&n| n > 0).count() {
        0 => None,
        1 => Some(Variety::Low),
        2 => Some(Variety::Medium),
        _ => Some(Variety::High),
    };

    SentenceAnalysis {
        average_length,
        short,
        medium,
        long,
        variety,
    }
}

fn recommendations(report: &VoiceReport) -> Vec<String> {
    let mut advice = Vec::new();

    match report.formality {
        Some(Formality::Casual) => advice.push(
            "Voice reads as casual; replace slang and contractions if the brand calls for a professional register."
                .to_string(),
        ),
        Some(Formality::Formal) => advice.push(
            "Voice reads as formal; shorter sentences and direct address make it more approachable."
                .to_string(),
        ),
        _ => {}
    }

    if report.tone.is_none() && report.word_count > 0 {
        advice.push(
            "No clear tone markers found; define the intended brand tone and use it consistently."
                .to_string(),
        );
    }

    if report.perspective == Some(Perspective::ThirdPerson) {
        advice.push(
            "Content is mostly third person; address the reader as \"you\" to build connection."
                .to_string(),
        );
    }

    if let Some(avg) = report.sentence_analysis.average_length {
        if avg > HP.avg_sentence_length_limit {
            advice.push(format!(
                "Average sentence length is {avg:.1} words; aim for 15-20."
            ));
        }
    }

    if report.sentence_analysis.variety == Some(Variety::Low)
        && report.readability.stats.sentence_count > 1
    {
        advice.push("Sentence lengths are uniform; mix short and long sentences.".to_string());
    }

    if let Some(
        label @ (ReadingEase::FairlyDifficult | ReadingEase::Difficult | ReadingEase::VeryDifficult),
    ) = report.readability.label
    {
        advice.push(format!(
            "Readability is {label}; use shorter words and split long sentences."
        ));
    }

    deduplicate(advice)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[tracing::instrument(skip(doc), fields(prose_len = doc.prose.len()))]
pub fn analyze(doc: &Document) -> VoiceReport {
    let prose = doc.prose.as_str();
    let word_count = text::word_count(prose);
    let markers = count_markers(prose);

    let formality_score = (word_count > 0).then(|| score_formality(&markers));
    let formality = formality_score.and_then(|s| classify(&FORMALITY_BANDS, f64::from(s)));

    let sentences = text::split_sentences(prose);

    let mut report = VoiceReport {
        word_count,
        formality_score,
        formality,
        tone: dominant(prose, TONE_PATTERNS.as_slice()),
        perspective: dominant(prose, PERSPECTIVE_PATTERNS.as_slice()),
        markers,
        sentence_analysis: analyze_sentences(&sentences),
        readability: readability::score(prose),
        recommendations: Vec::new(),
    };
    report.recommendations = recommendations(&report);

    tracing::debug!(
        formality_score = ?report.formality_score,
        tone = ?report.tone,
        perspective = ?report.perspective,
        "analyzed brand voice"
    );
    report
}
