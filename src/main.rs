use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use skill_analyzer::{render, seo, sprint, voice, KeywordSpec, OutputFormat};

#[derive(Parser)]
#[command(
    name = "skill-analyzer",
    about = "Analyze skill documents for brand voice, SEO, and sprint metrics",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log analysis details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Common {
    /// File to analyze
    input: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Rate formality, tone, perspective, and readability of a document
    Voice {
        #[command(flatten)]
        common: Common,
    },

    /// Score keyword usage, structure, and readability of a document
    Seo {
        #[command(flatten)]
        common: Common,

        /// Primary keyword or phrase
        #[arg(short, long)]
        keyword: Option<String>,

        /// Comma-separated secondary keywords
        #[arg(short, long)]
        secondary: Option<String>,
    },

    /// Compute velocity and commitment metrics from a JSON sprint history
    Sprint {
        #[command(flatten)]
        common: Common,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    // `RUST_LOG`, when set, takes precedence over the `-v` default.
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    let (rendered, common) = match command {
        Command::Voice { common } => {
            let doc = skill_analyzer::read_document(&common.input)?;
            let report = voice::analyze(&doc);
            (render(&report, common.output)?, common)
        }
        Command::Seo {
            common,
            keyword,
            secondary,
        } => {
            let spec = KeywordSpec::new(keyword.as_deref(), secondary.as_deref());
            let doc = skill_analyzer::read_document(&common.input)?;
            let report = seo::analyze(&doc, &spec)
                .with_context(|| format!("analyzing {}", common.input.display()))?;
            (render(&report, common.output)?, common)
        }
        Command::Sprint { common } => {
            let data = skill_analyzer::read_sprint_data(&common.input)?;
            let report = sprint::analyze(&data);
            (render(&report, common.output)?, common)
        }
    };
    emit(&rendered, common.file.as_deref())
}

fn emit(rendered: &str, path: Option<&Path>) -> anyhow::Result<()> {
    let mut body = rendered.to_string();
    if !body.ends_with('\n') {
        body.push('\n');
    }
    match path {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("cannot write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote report");
        }
        None => print!("{body}"),
    }
    Ok(())
}
