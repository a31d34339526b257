use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::bands::round1;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static SENTENCE_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]+["'\u{201D}\u{2019})\]]*(?:\s|$)"#).unwrap());

static FENCED_CODE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());

static LIST_ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:[-*+]|\d+\.)\s").unwrap());

static LINK_TARGET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\]\([^)]*\)").unwrap());

const FRONTMATTER_FENCE: &str = "---";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A loaded Markdown file: optional YAML frontmatter plus the body.
///
/// `prose` is the body with fenced code blocks removed; every metric is
/// computed over it.
#[derive(Debug, Clone)]
pub struct Document {
    pub frontmatter: Option<Mapping>,
    pub body: String,
    pub prose: String,
}

impl Document {
    pub fn parse(raw: &str) -> Result<Self> {
        let (frontmatter, body) = match split_frontmatter(raw) {
            Some((yaml, body)) if yaml.trim().is_empty() => (Some(Mapping::new()), body),
            // A leading `---` followed by prose is a thematic break, not metadata.
            Some((yaml, body)) => match serde_yaml::from_str::<Value>(yaml)? {
                Value::Mapping(mapping) => (Some(mapping), body),
                _ => (None, raw),
            },
            None => (None, raw),
        };
        let prose = FENCED_CODE_BLOCK_RE.replace_all(body, "").into_owned();
        Ok(Self {
            frontmatter,
            body: body.to_string(),
            prose,
        })
    }

    /// `title`, falling back to `name`, from the frontmatter.
    pub fn frontmatter_title(&self) -> Option<&str> {
        let fm = self.frontmatter.as_ref()?;
        ["title", "name"]
            .iter()
            .find_map(|key| fm.get(*key).and_then(Value::as_str))
    }

    /// First H1 in the body, else the frontmatter title.
    pub fn title(&self) -> Option<String> {
        first_h1(&self.prose).or_else(|| self.frontmatter_title().map(str::to_string))
    }
}

fn split_frontmatter(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let first_line_end = raw.find('\n')?;
    if raw[..first_line_end].trim_end() != FRONTMATTER_FENCE {
        return None;
    }
    let rest = &raw[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONTMATTER_FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

// ---------------------------------------------------------------------------
// Tokenizing
// ---------------------------------------------------------------------------

/// Whitespace tokens that carry at least one letter or digit, so Markdown
/// markers such as `#`, `-` and `>` are not counted as words.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect()
}

pub fn word_count(text: &str) -> usize {
    words(text).len()
}

/// Drops the `(target)` half of Markdown links and images, keeping the
/// bracketed text a reader sees.
pub fn strip_link_targets(text: &str) -> Cow<'_, str> {
    LINK_TARGET_RE.replace_all(text, "]")
}

/// Sentences within each block; headings and list items end a sentence even
/// without terminal punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    blocks(text)
        .iter()
        .flat_map(|block| SENTENCE_SPLIT_RE.split(block))
        .map(|s| s.trim().to_string())
        .filter(|s| word_count(s) > 0)
        .collect()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Vowel-group syllable estimate. Targets English; other scripts get a
/// count of at least 1 per word.
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if letters.is_empty() {
        return 1;
    }

    let mut groups = 0;
    let mut prev_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            groups += 1;
        }
        prev_vowel = vowel;
    }

    // Silent trailing e, except consonant + "le" ("simple", "table").
    let n = letters.len();
    if groups > 1 && letters[n - 1] == 'e' {
        let consonant_le = n >= 3 && letters[n - 2] == 'l' && !is_vowel(letters[n - 3]);
        if !consonant_le {
            groups -= 1;
        }
    }
    groups.max(1)
}

// ---------------------------------------------------------------------------
// Markdown structure
// ---------------------------------------------------------------------------

/// Level and text of an ATX heading line (`#` through `######`).
pub fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some((level, rest.trim()))
    } else {
        None
    }
}

pub fn headings(text: &str) -> Vec<(usize, &str)> {
    text.lines().filter_map(heading).collect()
}

pub fn first_h1(text: &str) -> Option<String> {
    headings(text)
        .into_iter()
        .find(|(level, _)| *level == 1)
        .map(|(_, title)| title.to_string())
}

/// Runs of consecutive non-blank lines; every heading and list item is a
/// block of its own.
fn blocks(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || heading(line).is_some() || LIST_ITEM_RE.is_match(line) {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        } else {
            current.push(trimmed);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}

/// Blank-line separated blocks of non-heading text.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || heading(line).is_some() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(trimmed);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out.retain(|p| word_count(p) > 0);
    out
}

pub fn first_paragraph(text: &str) -> Option<String> {
    paragraphs(text).into_iter().next()
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    pub sentence_count: usize,
    pub word_count: usize,
    pub syllable_count: usize,
    pub avg_sentence_length: Option<f64>,
    pub avg_syllables_per_word: Option<f64>,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        let tokens = words(text);
        let word_count = tokens.len();
        let sentence_count = split_sentences(text).len();
        let syllable_count: usize = tokens.iter().map(|w| count_syllables(w)).sum();

        let avg_sentence_length =
            (sentence_count > 0).then(|| word_count as f64 / sentence_count as f64);
        let avg_syllables_per_word =
            (word_count > 0).then(|| syllable_count as f64 / word_count as f64);

        tracing::debug!(
            sentence_count,
            word_count,
            syllable_count,
            "extracted text statistics"
        );

        Self {
            sentence_count,
            word_count,
            syllable_count,
            avg_sentence_length,
            avg_syllables_per_word,
        }
    }

    /// Copy with the averages rounded for reporting.
    pub fn rounded(&self) -> Self {
        Self {
            avg_sentence_length: self.avg_sentence_length.map(round1),
            avg_syllables_per_word: self
                .avg_syllables_per_word
                .map(|v| (v * 100.0).round() / 100.0),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_counts() {
        let stats = TextStats::from_text("");
        assert_eq!(stats.sentence_count, 0);
        assert_eq!(stats.word_count, 0);
        assert_eq!(stats.syllable_count, 0);
        assert_eq!(stats.avg_sentence_length, None);
        assert_eq!(stats.avg_syllables_per_word, None);
    }

    #[test]
    fn two_sentence_example() {
        let stats = TextStats::from_text("This is a simple test. It has two short sentences.");
        assert_eq!(stats.sentence_count, 2);
        assert_eq!(stats.word_count, 10);
        assert_eq!(stats.syllable_count, 13);
        assert_eq!(stats.avg_sentence_length, Some(5.0));
    }

    #[test]
    fn syllable_heuristic() {
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("simple"), 2);
        assert_eq!(count_syllables("sentences"), 3);
        assert_eq!(count_syllables("Beautiful,"), 3);
        assert_eq!(count_syllables("2024"), 1);
    }

    #[test]
    fn non_ascii_words_do_not_panic() {
        assert_eq!(count_syllables("日本語"), 1);
        let stats = TextStats::from_text("Ça marche très bien. Привет мир!");
        assert_eq!(stats.sentence_count, 2);
        assert_eq!(stats.word_count, 6);
    }

    #[test]
    fn markdown_markers_are_not_words() {
        assert_eq!(word_count("# Title\n\n- item one\n> quoted"), 4);
    }

    #[test]
    fn headings_end_sentences() {
        let sentences = split_sentences("# Overview\nThe tool reads a file. It prints a report.");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0], "# Overview");
    }

    #[test]
    fn heading_requires_space_after_hashes() {
        assert_eq!(heading("## Setup"), Some((2, "Setup")));
        assert_eq!(heading("#hashtag"), None);
        assert_eq!(heading("####### seven"), None);
    }

    #[test]
    fn frontmatter_is_split_from_body() {
        let doc = Document::parse("---\nname: ceo-advisor\ndescription: Strategy\n---\nBody text here.\n")
            .unwrap();
        assert_eq!(doc.frontmatter_title(), Some("ceo-advisor"));
        assert_eq!(doc.body, "Body text here.\n");
    }

    #[test]
    fn unclosed_frontmatter_is_body() {
        let doc = Document::parse("---\nno closing fence\n").unwrap();
        assert!(doc.frontmatter.is_none());
        assert!(doc.body.starts_with("---"));
    }

    #[test]
    fn malformed_frontmatter_is_an_error() {
        assert!(Document::parse("---\nkey: [unclosed\n---\nbody\n").is_err());
    }

    #[test]
    fn leading_thematic_break_is_body() {
        let raw = "---\n\n# Title\n\nPlain markdown text.\n\n---\n\nMore text here.\n";
        let doc = Document::parse(raw).unwrap();
        assert!(doc.frontmatter.is_none());
        assert_eq!(doc.title().as_deref(), Some("Title"));
        assert_eq!(word_count(&doc.prose), 7);

        let doc = Document::parse("---\n# just a comment\n---\nBody text.\n").unwrap();
        assert!(doc.frontmatter.is_none());
        assert_eq!(word_count(&doc.prose), 5);
    }

    #[test]
    fn link_targets_are_stripped() {
        assert_eq!(
            strip_link_targets("See [the docs](https://api.example.com/v1) and ![logo](img.png)."),
            "See [the docs] and ![logo]."
        );
        assert_eq!(strip_link_targets("No links here."), "No links here.");
    }

    #[test]
    fn code_blocks_are_excluded_from_prose() {
        let doc = Document::parse("Intro line.\n\n```\nlet x = 1;\n```\n").unwrap();
        assert_eq!(word_count(&doc.prose), 2);
    }

    #[test]
    fn h1_wins_over_frontmatter_title() {
        let doc = Document::parse("---\ntitle: From YAML\n---\n# From Body\n\nText.\n").unwrap();
        assert_eq!(doc.title().as_deref(), Some("From Body"));
    }

    #[test]
    fn first_paragraph_skips_headings() {
        let text = "# Title\n\nFirst line\ncontinues here.\n\nSecond paragraph.";
        assert_eq!(
            first_paragraph(text).as_deref(),
            Some("First line continues here.")
        );
        assert_eq!(paragraphs(text).len(), 2);
    }
}
