use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bands::{classify, round1, Band};
use crate::error::Result;
use crate::text::{self, Document};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Below this density (percent) a keyword is under-used.
pub const DENSITY_OPTIMAL_MIN: f64 = 1.0;
/// Upper edge (inclusive) of the optimal range.
pub const DENSITY_OPTIMAL_MAX: f64 = 2.0;
/// Above this density a keyword is over-optimized.
pub const DENSITY_OVER_OPTIMIZED: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityStatus {
    TooLow,
    Optimal,
    High,
    OverOptimized,
}

impl fmt::Display for DensityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DensityStatus::TooLow => "too low, increase usage",
            DensityStatus::Optimal => "optimal",
            DensityStatus::High => "high",
            DensityStatus::OverOptimized => "over-optimized",
        };
        f.write_str(s)
    }
}

pub static DENSITY_BANDS: [Band<DensityStatus>; 4] = [
    Band::above(DENSITY_OVER_OPTIMIZED, DensityStatus::OverOptimized),
    Band::above(DENSITY_OPTIMAL_MAX, DensityStatus::High),
    Band::at_least(DENSITY_OPTIMAL_MIN, DensityStatus::Optimal),
    Band::at_least(0.0, DensityStatus::TooLow),
];

// ---------------------------------------------------------------------------
// Keyword specification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSpec {
    pub primary: Option<String>,
    pub secondary: Vec<String>,
}

impl KeywordSpec {
    /// Builds a spec from the raw `--keyword` and comma-separated
    /// `--secondary` values. Blank entries are dropped.
    pub fn new(primary: Option<&str>, secondary: Option<&str>) -> Self {
        let primary = primary
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        let secondary = secondary
            .map(|csv| {
                csv.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self { primary, secondary }
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordReport {
    pub keyword: String,
    pub count: usize,
    pub density: Option<f64>,
    pub status: Option<DensityStatus>,
    pub in_title: bool,
    pub in_first_paragraph: bool,
    pub heading_hit_count: usize,
}

/// Case-insensitive whole-phrase matcher. Inner whitespace matches any run
/// of whitespace; word boundaries are only asserted next to word characters
/// so keywords such as `C++` still match.
fn phrase_pattern(keyword: &str) -> Result<Regex> {
    let body = keyword
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if keyword.starts_with(is_word) { r"\b" } else { "" };
    let trail = if keyword.ends_with(is_word) { r"\b" } else { "" };
    Ok(Regex::new(&format!("(?i){lead}{body}{trail}"))?)
}

/// Density in percent, rounded to one decimal; `None` for an empty document.
pub fn density(count: usize, word_count: usize) -> Option<f64> {
    if word_count == 0 {
        return None;
    }
    Some(round1((count as f64 / word_count as f64 * 100.0).min(100.0)))
}

pub fn analyze_keyword(doc: &Document, keyword: &str) -> Result<KeywordReport> {
    let pattern = phrase_pattern(keyword)?;
    // Link targets are not reader-visible text.
    let visible = text::strip_link_targets(&doc.prose);
    let prose = visible.as_ref();
    let word_count = text::word_count(prose);

    let count = pattern.find_iter(prose).count();
    let density = density(count, word_count);
    // Classified on the rounded value so the reported number and status agree.
    let status = density.and_then(|d| classify(&DENSITY_BANDS, d));

    let in_title = doc.title().is_some_and(|t| pattern.is_match(&t));
    let in_first_paragraph =
        text::first_paragraph(prose).is_some_and(|p| pattern.is_match(&p));
    let heading_hit_count = text::headings(prose)
        .iter()
        .filter(|(_, heading)| pattern.is_match(heading))
        .count();

    tracing::debug!(keyword, count, ?density, ?status, "analyzed keyword");

    Ok(KeywordReport {
        keyword: keyword.to_string(),
        count,
        density,
        status,
        in_title,
        in_first_paragraph,
        heading_hit_count,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    pub primary: Option<KeywordReport>,
    pub secondary: Vec<KeywordReport>,
}

pub fn analyze(doc: &Document, spec: &KeywordSpec) -> Result<KeywordAnalysis> {
    let primary = spec
        .primary
        .as_deref()
        .map(|k| analyze_keyword(doc, k))
        .transpose()?;
    let secondary = spec
        .secondary
        .iter()
        .map(|k| analyze_keyword(doc, k))
        .collect::<Result<Vec<_>>>()?;
    Ok(KeywordAnalysis { primary, secondary })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(raw: &str) -> Document {
        Document::parse(raw).unwrap()
    }

    /// `total` words of filler with `hits` occurrences of `keyword` at the
    /// front.
    fn padded(keyword: &str, hits: usize, total: usize) -> String {
        let mut words: Vec<&str> = vec![keyword; hits];
        words.resize(total, "filler");
        words.join(" ")
    }

    #[test]
    fn secondary_csv_drops_empty_entries() {
        let spec = KeywordSpec::new(Some("api"), Some("a,,b"));
        assert_eq!(spec.secondary, vec!["a".to_string(), "b".to_string()]);

        let spec = KeywordSpec::new(None, Some(" rust , ,cli,"));
        assert_eq!(spec.secondary, vec!["rust".to_string(), "cli".to_string()]);
    }

    #[test]
    fn blank_primary_is_absent() {
        assert_eq!(KeywordSpec::new(Some("  "), None).primary, None);
    }

    #[test]
    fn counting_is_case_insensitive() {
        let d = doc("The API is great. Every api call returns JSON. Api keys rotate.");
        let report = analyze_keyword(&d, "API").unwrap();
        assert_eq!(report.count, 3);
    }

    #[test]
    fn matches_whole_phrases_only() {
        let d = doc("Rapid rapids. Rapid deployment wins; rapid  deployment again.");
        assert_eq!(analyze_keyword(&d, "rapid").unwrap().count, 3);
        assert_eq!(analyze_keyword(&d, "rapid deployment").unwrap().count, 2);
    }

    #[test]
    fn symbols_in_keywords_are_literal() {
        let d = doc("We write C++ and C. Some C++ too.");
        assert_eq!(analyze_keyword(&d, "C++").unwrap().count, 2);
    }

    #[test]
    fn three_hits_in_150_words_is_two_percent() {
        let d = doc(&padded("API", 3, 150));
        let report = analyze_keyword(&d, "api").unwrap();
        assert_eq!(report.density, Some(2.0));
        assert_eq!(report.status, Some(DensityStatus::Optimal));
    }

    #[test]
    fn density_edges() {
        let at = |hits| {
            analyze_keyword(&doc(&padded("seo", hits, 100)), "seo")
                .unwrap()
                .status
        };
        assert_eq!(at(0), Some(DensityStatus::TooLow));
        assert_eq!(at(1), Some(DensityStatus::Optimal));
        assert_eq!(at(2), Some(DensityStatus::Optimal));
        assert_eq!(at(3), Some(DensityStatus::High));
        assert_eq!(at(4), Some(DensityStatus::OverOptimized));
        assert_eq!(classify(&DENSITY_BANDS, 0.9), Some(DensityStatus::TooLow));
    }

    #[test]
    fn absent_keyword_has_zero_density() {
        let report = analyze_keyword(&doc("Nothing relevant here at all."), "kubernetes").unwrap();
        assert_eq!(report.count, 0);
        assert_eq!(report.density, Some(0.0));
    }

    #[test]
    fn empty_document_density_is_not_applicable() {
        let report = analyze_keyword(&doc(""), "anything").unwrap();
        assert_eq!(report.count, 0);
        assert_eq!(report.density, None);
        assert_eq!(report.status, None);
    }

    #[test]
    fn placement_checks() {
        let d = doc(
            "# Scrum Master Guide\n\n\
             A scrum master removes blockers.\n\n\
             ## Daily Scrum\n\n\
             ## Retrospectives\n\n\
             Run a scrum retro every sprint.\n",
        );
        let report = analyze_keyword(&d, "scrum").unwrap();
        assert!(report.in_title);
        assert!(report.in_first_paragraph);
        assert_eq!(report.heading_hit_count, 2);
        assert_eq!(report.count, 4);
    }

    #[test]
    fn title_falls_back_to_frontmatter() {
        let d = doc("---\ntitle: Sprint metrics\n---\nVelocity over time.\n");
        assert!(analyze_keyword(&d, "metrics").unwrap().in_title);
    }

    #[test]
    fn density_never_exceeds_one_hundred() {
        for (count, words) in [(0, 1), (1, 1), (5, 7), (10, 10)] {
            let d = density(count, words).unwrap();
            assert!((0.0..=100.0).contains(&d));
        }
    }

    #[test]
    fn link_targets_are_not_counted() {
        let d = doc("Read the [guide](https://api.example.com/api/docs) for the API.");
        let report = analyze_keyword(&d, "api").unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.density, Some(16.7));
    }
}
