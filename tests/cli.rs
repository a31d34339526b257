#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn analyzer() -> Command {
    Command::cargo_bin("skill-analyzer").unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

const DOC: &str = "# API Design Guide\n\n\
                   A good API is easy to learn. This API guide covers naming and errors.\n\n\
                   ## Naming\n\nUse nouns for resources.\n";

// ---------------------------------------------------------------------------
// voice
// ---------------------------------------------------------------------------

#[test]
fn voice_text_output() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.md", DOC);
    analyzer()
        .arg("voice")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("BRAND VOICE ANALYSIS"))
        .stdout(predicate::str::contains("Formality:"));
}

#[test]
fn voice_json_output_parses() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.md", DOC);
    let output = analyzer()
        .args(["voice", "-o", "json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["formality_score"].is_u64());
    assert!(value["readability"]["flesch_score"].is_number());
}

#[test]
fn empty_file_reports_not_applicable() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "empty.md", "");
    analyzer()
        .arg("voice")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("N/A"));
}

// ---------------------------------------------------------------------------
// seo
// ---------------------------------------------------------------------------

#[test]
fn seo_with_keywords_json() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.md", DOC);
    let output = analyzer()
        .args(["seo", "--keyword", "API", "--secondary", "naming,,errors,", "-o", "json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["keywords"]["primary"]["count"], 3);
    assert_eq!(value["keywords"]["secondary"].as_array().unwrap().len(), 2);
    assert!(value["seo_score"].is_u64());
}

#[test]
fn seo_writes_to_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.md", DOC);
    let out = dir.path().join("report.txt");
    analyzer()
        .args(["seo", "-k", "api", "-f"])
        .arg(&out)
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let report = std::fs::read_to_string(&out).unwrap();
    assert!(report.contains("SEO ANALYSIS"));
    assert!(report.contains("'api': 3 occurrence(s)"));
}

// ---------------------------------------------------------------------------
// sprint
// ---------------------------------------------------------------------------

#[test]
fn sprint_metrics_text() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "sprints.json",
        r#"{"sprints": [
            {"name": "S1", "committed_points": 30, "completed_points": 28},
            {"name": "S2", "committed_points": 30, "completed_points": 30},
            {"name": "S3", "committed_points": 30, "completed_points": 29}
        ]}"#,
    );
    analyzer()
        .arg("sprint")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Average: 29.0"))
        .stdout(predicate::str::contains("Predictability: Highly predictable"));
}

#[test]
fn sprint_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "sprints.json", "{ not json");
    analyzer()
        .arg("sprint")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("malformed sprint data"));
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

#[test]
fn missing_file_exits_one_and_names_path() {
    analyzer()
        .args(["voice", "does/not/exist.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does/not/exist.md"));
}

#[test]
fn missing_argument_is_usage_error() {
    analyzer().arg("seo").assert().code(2);
}

#[test]
fn unknown_flag_is_usage_error() {
    analyzer()
        .args(["voice", "--bogus", "x.md"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn malformed_frontmatter_exits_one() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.md", "---\nname: [oops\n---\nBody.\n");
    analyzer()
        .arg("voice")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed frontmatter"));
}

// ---------------------------------------------------------------------------
// logging
// ---------------------------------------------------------------------------

#[test]
fn rust_log_enables_debug_without_verbose() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.md", DOC);
    analyzer()
        .env("RUST_LOG", "debug")
        .arg("voice")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("read document"));
}

#[test]
fn quiet_by_default_and_verbose_with_flag() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.md", DOC);
    analyzer()
        .env_remove("RUST_LOG")
        .arg("voice")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
    analyzer()
        .env_remove("RUST_LOG")
        .args(["voice", "-v"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("read document"));
}

#[test]
fn leading_horizontal_rule_is_not_frontmatter() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "rules.md",
        "---\n\n# Title\n\nPlain markdown text.\n\n---\n\nMore text here.\n",
    );
    analyzer()
        .arg("voice")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Words: 7"));
}

#[test]
fn version_flag() {
    analyzer()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("skill-analyzer"));
}
