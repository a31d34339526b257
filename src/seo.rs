use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bands::{classify, deduplicate, points, round1, Band};
use crate::error::Result;
use crate::keywords::{
    self, DensityStatus, KeywordAnalysis, KeywordReport, KeywordSpec, DENSITY_OPTIMAL_MAX,
    DENSITY_OPTIMAL_MIN,
};
use crate::readability::{self, ReadabilityReport};
use crate::text::{self, Document};

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct Hyperparameters {
    title_max_chars: usize,
    meta_description_max_chars: usize,
    min_word_count: usize,
    keyword_in_title_points: u32,
    keyword_in_first_paragraph_points: u32,
    keyword_in_heading_points: u32,
    single_h1_points: u32,
    subheading_min: usize,
    subheading_points: u32,
    links_points: u32,
    score_max: u32,
}

static HP: Hyperparameters = Hyperparameters {
    title_max_chars: 60,
    meta_description_max_chars: 160,
    min_word_count: 300,
    keyword_in_title_points: 10,
    keyword_in_first_paragraph_points: 10,
    keyword_in_heading_points: 5,
    single_h1_points: 5,
    subheading_min: 2,
    subheading_points: 10,
    links_points: 5,
    score_max: 100,
};

static CONTENT_LENGTH_POINTS: [Band<u32>; 4] = [
    Band::at_least(1500.0, 20),
    Band::at_least(800.0, 15),
    Band::at_least(300.0, 10),
    Band::above(0.0, 5),
];

static READABILITY_POINTS: [Band<u32>; 2] = [Band::at_least(60.0, 10), Band::at_least(30.0, 5)];

static DENSITY_POINTS: [(DensityStatus, u32); 4] = [
    (DensityStatus::Optimal, 25),
    (DensityStatus::High, 15),
    (DensityStatus::TooLow, 10),
    (DensityStatus::OverOptimized, 5),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeoBand {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
}

impl fmt::Display for SeoBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeoBand::Excellent => "Excellent",
            SeoBand::Good => "Good",
            SeoBand::NeedsImprovement => "Needs improvement",
            SeoBand::Poor => "Poor",
        };
        f.write_str(s)
    }
}

pub static SEO_BANDS: [Band<SeoBand>; 4] = [
    Band::at_least(90.0, SeoBand::Excellent),
    Band::at_least(70.0, SeoBand::Good),
    Band::at_least(50.0, SeoBand::NeedsImprovement),
    Band::at_least(0.0, SeoBand::Poor),
];

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(!?)\[[^\]]*\]\(([^)\s]+)[^)]*\)").unwrap());

static EXTERNAL_TARGET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());

static SLUG_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentLength {
    pub word_count: usize,
    pub character_count: usize,
    pub paragraph_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkCounts {
    pub internal: usize,
    pub external: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub other_headings: usize,
    pub links: LinkCounts,
    pub avg_paragraph_words: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaSuggestions {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub url_slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub content_length: u32,
    pub keyword_density: u32,
    pub keyword_in_title: u32,
    pub keyword_in_first_paragraph: u32,
    pub keyword_in_heading: u32,
    pub single_h1: u32,
    pub subheadings: u32,
    pub links: u32,
    pub readability: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.content_length
            + self.keyword_density
            + self.keyword_in_title
            + self.keyword_in_first_paragraph
            + self.keyword_in_heading
            + self.single_h1
            + self.subheadings
            + self.links
            + self.readability
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoReport {
    pub content_length: ContentLength,
    pub structure: Structure,
    pub keywords: KeywordAnalysis,
    pub readability: ReadabilityReport,
    pub meta_suggestions: MetaSuggestions,
    pub seo_score: Option<u8>,
    pub seo_band: Option<SeoBand>,
    pub score_breakdown: ScoreBreakdown,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Cuts `s` to at most `max` characters on a word boundary, marking the cut
/// with `...`.
fn truncate_words(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(3)).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &head[..idx],
        _ => head.as_str(),
    };
    format!("{}...", cut.trim_end())
}

fn slugify(s: &str) -> Option<String> {
    let lower = s.to_lowercase();
    let slug = SLUG_SEPARATOR_RE.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    (!slug.is_empty()).then(|| slug.to_string())
}

fn count_links(text: &str) -> LinkCounts {
    let mut links = LinkCounts {
        internal: 0,
        external: 0,
    };
    for caps in LINK_RE.captures_iter(text) {
        if &caps[1] == "!" {
            continue;
        }
        if EXTERNAL_TARGET_RE.is_match(&caps[2]) {
            links.external += 1;
        } else {
            links.internal += 1;
        }
    }
    links
}

fn analyze_structure(prose: &str, paragraphs: &[String]) -> Structure {
    let mut structure = Structure {
        h1: 0,
        h2: 0,
        h3: 0,
        other_headings: 0,
        links: count_links(prose),
        avg_paragraph_words: None,
    };
    for (level, _) in text::headings(prose) {
        match level {
            1 => structure.h1 += 1,
            2 => structure.h2 += 1,
            3 => structure.h3 += 1,
            _ => structure.other_headings += 1,
        }
    }
    if !paragraphs.is_empty() {
        let words: usize = paragraphs.iter().map(|p| text::word_count(p)).sum();
        structure.avg_paragraph_words = Some(round1(words as f64 / paragraphs.len() as f64));
    }
    structure
}

fn suggest_meta(
    doc: &Document,
    first_paragraph: Option<&str>,
    spec: &KeywordSpec,
) -> MetaSuggestions {
    let title = doc.title().or_else(|| spec.primary.clone());
    MetaSuggestions {
        meta_description: first_paragraph
            .map(|p| truncate_words(p, HP.meta_description_max_chars)),
        url_slug: title.as_deref().and_then(slugify),
        title: title.map(|t| truncate_words(&t, HP.title_max_chars)),
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn density_points(status: Option<DensityStatus>) -> u32 {
    status
        .and_then(|s| DENSITY_POINTS.iter().find(|(d, _)| *d == s))
        .map_or(0, |(_, p)| *p)
}

fn score_breakdown(
    content: &ContentLength,
    structure: &Structure,
    primary: Option<&KeywordReport>,
    readability: &ReadabilityReport,
) -> ScoreBreakdown {
    let award = |hit: bool, pts: u32| if hit { pts } else { 0 };
    let mut breakdown = ScoreBreakdown {
        content_length: points(&CONTENT_LENGTH_POINTS, content.word_count as f64),
        single_h1: award(structure.h1 == 1, HP.single_h1_points),
        subheadings: award(structure.h2 >= HP.subheading_min, HP.subheading_points),
        links: award(
            structure.links.internal + structure.links.external > 0,
            HP.links_points,
        ),
        readability: readability
            .flesch_score
            .map_or(0, |s| points(&READABILITY_POINTS, s)),
        ..ScoreBreakdown::default()
    };
    if let Some(kw) = primary {
        breakdown.keyword_density = density_points(kw.status);
        breakdown.keyword_in_title = award(kw.in_title, HP.keyword_in_title_points);
        breakdown.keyword_in_first_paragraph =
            award(kw.in_first_paragraph, HP.keyword_in_first_paragraph_points);
        breakdown.keyword_in_heading = award(kw.heading_hit_count > 0, HP.keyword_in_heading_points);
    }
    breakdown
}

fn keyword_advice(kw: &KeywordReport, advice: &mut Vec<String>) {
    let k = &kw.keyword;
    let density = kw.density.unwrap_or(0.0);
    match kw.status {
        Some(DensityStatus::TooLow) => advice.push(format!(
            "Keyword '{k}' density is {density:.1}%; increase usage toward {DENSITY_OPTIMAL_MIN:.0}-{DENSITY_OPTIMAL_MAX:.0}%."
        )),
        Some(DensityStatus::High) => advice.push(format!(
            "Keyword '{k}' density is {density:.1}%; slightly above the {DENSITY_OPTIMAL_MIN:.0}-{DENSITY_OPTIMAL_MAX:.0}% target."
        )),
        Some(DensityStatus::OverOptimized) => advice.push(format!(
            "Keyword '{k}' density is {density:.1}%; reduce usage to avoid over-optimization."
        )),
        Some(DensityStatus::Optimal) | None => {}
    }
}

fn recommendations(report: &SeoReport) -> Vec<String> {
    let mut advice = Vec::new();
    let wc = report.content_length.word_count;

    if wc < HP.min_word_count {
        advice.push(format!(
            "Content is short ({wc} words); aim for at least {} words.",
            HP.min_word_count
        ));
    }

    match &report.keywords.primary {
        None => advice.push(
            "Specify a primary keyword to score keyword placement and density.".to_string(),
        ),
        Some(kw) => {
            keyword_advice(kw, &mut advice);
            if !kw.in_title {
                advice.push(format!("Add '{}' to the title.", kw.keyword));
            }
            if !kw.in_first_paragraph {
                advice.push(format!("Mention '{}' in the first paragraph.", kw.keyword));
            }
            if kw.heading_hit_count == 0 {
                advice.push(format!("Use '{}' in at least one subheading.", kw.keyword));
            }
        }
    }

    for kw in &report.keywords.secondary {
        if kw.count == 0 {
            advice.push(format!(
                "Secondary keyword '{}' does not appear; work it into the content.",
                kw.keyword
            ));
        } else if kw.status == Some(DensityStatus::OverOptimized) {
            keyword_advice(kw, &mut advice);
        }
    }

    match report.structure.h1 {
        0 => advice.push("Add a single H1 title.".to_string()),
        1 => {}
        n => advice.push(format!("Use exactly one H1; found {n}.")),
    }
    if report.structure.h2 < HP.subheading_min {
        advice.push("Add H2 sections to structure the content.".to_string());
    }
    let links = &report.structure.links;
    if links.internal + links.external == 0 {
        advice.push("Add internal or external links.".to_string());
    }

    if let (Some(score), Some(label)) = (report.readability.flesch_score, report.readability.label)
    {
        if score < READABILITY_POINTS[0].floor {
            advice.push(format!(
                "Readability is {label} ({score:.1}); shorten sentences and prefer simpler words."
            ));
        }
    }

    deduplicate(advice)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[tracing::instrument(skip(doc), fields(prose_len = doc.prose.len()))]
pub fn analyze(doc: &Document, spec: &KeywordSpec) -> Result<SeoReport> {
    let prose = doc.prose.as_str();
    let paragraphs = text::paragraphs(prose);
    let first_paragraph = paragraphs.first().map(String::as_str);

    let content_length = ContentLength {
        word_count: text::word_count(prose),
        character_count: prose.trim().chars().count(),
        paragraph_count: paragraphs.len(),
    };
    let structure = analyze_structure(prose, &paragraphs);
    let keywords = keywords::analyze(doc, spec)?;
    let readability = readability::score(prose);
    let meta_suggestions = suggest_meta(doc, first_paragraph, spec);

    let breakdown = score_breakdown(
        &content_length,
        &structure,
        keywords.primary.as_ref(),
        &readability,
    );
    let seo_score = (content_length.word_count > 0)
        .then(|| breakdown.total().min(HP.score_max) as u8);
    let seo_band = seo_score.and_then(|s| classify(&SEO_BANDS, f64::from(s)));

    let mut report = SeoReport {
        content_length,
        structure,
        keywords,
        readability,
        meta_suggestions,
        seo_score,
        seo_band,
        score_breakdown: breakdown,
        recommendations: Vec::new(),
    };
    report.recommendations = if report.content_length.word_count == 0 {
        vec!["Document is empty; add content before optimizing.".to_string()]
    } else {
        recommendations(&report)
    };

    tracing::debug!(seo_score = ?report.seo_score, band = ?report.seo_band, "scored SEO");
    Ok(report)
}
