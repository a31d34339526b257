use std::fmt::{Display, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::keywords::KeywordReport;
use crate::readability::ReadabilityReport;
use crate::seo::SeoReport;
use crate::sprint::SprintReport;
use crate::voice::VoiceReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A finished analysis that can be printed for people or machines.
pub trait Report: Serialize {
    fn render_text(&self) -> String;
}

pub fn render<R: Report>(report: &R, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const NOT_APPLICABLE: &str = "N/A";

fn na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_APPLICABLE.to_string(), |v| v.to_string())
}

fn na_f1(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_APPLICABLE.to_string(), |v| format!("{v:.1}"))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

fn readability_section(out: &mut String, r: &ReadabilityReport) {
    heading(out, "Readability");
    let _ = writeln!(
        out,
        "Flesch Reading Ease: {} ({})",
        na_f1(r.flesch_score),
        na(r.label)
    );
    let _ = writeln!(
        out,
        "Sentences: {}  Words: {}  Syllables: {}",
        r.stats.sentence_count, r.stats.word_count, r.stats.syllable_count
    );
    let _ = writeln!(
        out,
        "Avg sentence length: {}  Avg syllables/word: {}",
        na_f1(r.stats.avg_sentence_length),
        r.stats
            .avg_syllables_per_word
            .map_or_else(|| NOT_APPLICABLE.to_string(), |v| format!("{v:.2}"))
    );
}

fn recommendations_section(out: &mut String, recommendations: &[String]) {
    heading(out, "Recommendations");
    if recommendations.is_empty() {
        let _ = writeln!(out, "None.");
    }
    for (i, rec) in recommendations.iter().enumerate() {
        let _ = writeln!(out, "{}. {rec}", i + 1);
    }
}

fn keyword_line(out: &mut String, kw: &KeywordReport) {
    let density = kw
        .density
        .map_or_else(|| NOT_APPLICABLE.to_string(), |d| format!("{d:.1}%"));
    let _ = writeln!(
        out,
        "'{}': {} occurrence(s), density {} ({}), title: {}, first paragraph: {}, headings: {}",
        kw.keyword,
        kw.count,
        density,
        na(kw.status),
        yes_no(kw.in_title),
        yes_no(kw.in_first_paragraph),
        kw.heading_hit_count
    );
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

impl Report for VoiceReport {
    fn render_text(&self) -> String {
        let mut out = String::from("BRAND VOICE ANALYSIS\n====================\n");
        let _ = writeln!(out, "Words: {}", self.word_count);
        let _ = writeln!(
            out,
            "Formality: {}/100 ({})",
            na(self.formality_score),
            na(self.formality)
        );
        let _ = writeln!(
            out,
            "Markers: {} formal, {} casual",
            self.markers.formal, self.markers.casual
        );
        let _ = writeln!(out, "Tone: {}", na(self.tone));
        let _ = writeln!(out, "Perspective: {}", na(self.perspective));

        heading(&mut out, "Sentences");
        let s = &self.sentence_analysis;
        let _ = writeln!(out, "Average length: {} words", na_f1(s.average_length));
        let _ = writeln!(
            out,
            "Short: {}  Medium: {}  Long: {}  Variety: {}",
            s.short,
            s.medium,
            s.long,
            na(s.variety)
        );

        readability_section(&mut out, &self.readability);
        recommendations_section(&mut out, &self.recommendations);
        out
    }
}

impl Report for SeoReport {
    fn render_text(&self) -> String {
        let mut out = String::from("SEO ANALYSIS\n============\n");
        let _ = writeln!(
            out,
            "SEO score: {}/100 ({})",
            na(self.seo_score),
            na(self.seo_band)
        );

        heading(&mut out, "Content");
        let c = &self.content_length;
        let _ = writeln!(
            out,
            "Words: {}  Characters: {}  Paragraphs: {}",
            c.word_count, c.character_count, c.paragraph_count
        );

        heading(&mut out, "Keywords");
        match &self.keywords.primary {
            Some(kw) => {
                let _ = write!(out, "Primary ");
                keyword_line(&mut out, kw);
            }
            None => {
                let _ = writeln!(out, "Primary: none given");
            }
        }
        for kw in &self.keywords.secondary {
            let _ = write!(out, "Secondary ");
            keyword_line(&mut out, kw);
        }

        heading(&mut out, "Structure");
        let s = &self.structure;
        let _ = writeln!(
            out,
            "Headings: H1 {}  H2 {}  H3 {}  other {}",
            s.h1, s.h2, s.h3, s.other_headings
        );
        let _ = writeln!(
            out,
            "Links: {} internal, {} external",
            s.links.internal, s.links.external
        );
        let _ = writeln!(
            out,
            "Avg paragraph length: {} words",
            na_f1(s.avg_paragraph_words)
        );

        readability_section(&mut out, &self.readability);

        heading(&mut out, "Meta suggestions");
        let m = &self.meta_suggestions;
        let _ = writeln!(out, "Title: {}", na(m.title.as_deref()));
        let _ = writeln!(out, "Description: {}", na(m.meta_description.as_deref()));
        let _ = writeln!(out, "Slug: {}", na(m.url_slug.as_deref()));

        recommendations_section(&mut out, &self.recommendations);
        out
    }
}

impl Report for SprintReport {
    fn render_text(&self) -> String {
        let mut out = String::from("SPRINT METRICS\n==============\n");
        let _ = writeln!(out, "Sprints analyzed: {}", self.sprint_count);

        heading(&mut out, "Velocity");
        let v = &self.velocity;
        let _ = writeln!(
            out,
            "Average: {}  Std dev: {}  CV: {}%",
            na_f1(v.average),
            na_f1(v.std_dev),
            na_f1(v.coefficient_of_variation)
        );
        let _ = writeln!(out, "Range: {} - {}", na_f1(v.min), na_f1(v.max));
        let _ = writeln!(
            out,
            "Trend: {}  Stability: {}",
            na(v.trend),
            na(v.stability)
        );

        heading(&mut out, "Commitment");
        let c = &self.commitment;
        let _ = writeln!(
            out,
            "Average completion: {}%  Met commitment: {}/{}",
            na_f1(c.average_completion_rate),
            c.sprints_meeting_commitment,
            self.sprint_count
        );
        let _ = writeln!(out, "Predictability: {}", na(c.predictability));

        heading(&mut out, "Scope change");
        let _ = writeln!(
            out,
            "Total added: {:.1}  Average per sprint: {}",
            self.scope_change.total_added,
            na_f1(self.scope_change.average_added)
        );

        heading(&mut out, "Forecast");
        match &self.forecast {
            Some(f) => {
                let _ = writeln!(
                    out,
                    "Next sprint: {:.1} - {:.1} points (expected {:.1})",
                    f.low, f.high, f.expected
                );
            }
            None => {
                let _ = writeln!(out, "Next sprint: {NOT_APPLICABLE}");
            }
        }

        recommendations_section(&mut out, &self.recommendations);
        out
    }
}
