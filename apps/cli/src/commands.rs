//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use studytree_core::{
    ExportFormat, Extractor, FileOutcome, IngestReport, KeyPointSummarizer, ProgressReporter,
    Session, export_tree, ingest_files, render,
};
use studytree_shared::{AppConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// StudyTree: turn study material into a knowledge tree.
#[derive(Parser)]
#[command(
    name = "studytree",
    version,
    about = "Extract knowledge sections from PDF, DOCX and PPTX study material.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Knowledge tree output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Markdown,
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Markdown => ExportFormat::Markdown,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract files into a knowledge tree and print or export it.
    Extract {
        /// Source files (.pdf, .docx, .pptx).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Reduce each node to its key points.
        #[arg(long)]
        summarize: bool,

        /// Write the tree to this file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format (defaults to the configured export format).
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Print the sections extracted from a single file.
    Inspect {
        /// Source file (.pdf, .docx, .pptx).
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "studytree=info",
        1 => "studytree=debug",
        _ => "studytree=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract {
            files,
            summarize,
            out,
            format,
        } => cmd_extract(&files, summarize, out.as_deref(), format),
        Command::Inspect { file } => cmd_inspect(&file),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_extract(
    files: &[PathBuf],
    summarize: bool,
    out: Option<&Path>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let config = load_config()?;
    let format = match format {
        Some(format) => ExportFormat::from(format),
        None => config.export.default_format.parse()?,
    };

    let mut session = Session::new(Extractor::new(&config));
    let reporter = CliProgress::new();
    let report = ingest_files(&mut session, files, &reporter);

    for (path, reason) in &report.skipped {
        eprintln!("  skipped {}: {reason}", path.display());
    }
    if session.documents().is_empty() {
        return Err(eyre!("none of the {} file(s) could be extracted", files.len()));
    }

    session.generate_tree();
    if summarize {
        let summarizer = KeyPointSummarizer::new(config.summarizer.clone())?;
        session.summarize(&summarizer)?;
    }

    info!(
        documents = session.documents().len(),
        nodes = session.tree().len(),
        summarize,
        "knowledge tree ready"
    );

    match out {
        Some(path) => {
            export_tree(session.tree(), format, path)?;
            eprintln!(
                "  Wrote {} node(s) from {} document(s) to {}",
                session.tree().len(),
                session.documents().len(),
                path.display()
            );
        }
        None => println!("{}", render(session.tree(), format)?),
    }

    Ok(())
}

fn cmd_inspect(file: &Path) -> Result<()> {
    let config = load_config()?;
    let document = Extractor::new(&config).extract(file)?;

    println!("File:     {}", document.source_path.display());
    println!("Pages:    {}", document.metadata.page_count);
    println!("Author:   {}", document.metadata.author);
    println!("Sections: {}", document.sections.len());
    for (i, section) in document.sections.iter().enumerate() {
        println!();
        println!("[{}] {}", i + 1, section.title);
        for line in &section.content {
            println!("    {line}");
        }
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_started(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Extracting [{current}/{total}] {}", path.display()));
    }

    fn file_finished(&self, path: &Path, outcome: &FileOutcome) {
        if let FileOutcome::Ingested { sections } = outcome {
            self.spinner
                .println(format!("  {} ({sections} sections)", path.display()));
        }
    }

    fn done(&self, report: &IngestReport) {
        self.spinner.finish_and_clear();
        eprintln!(
            "  Extracted {}/{} file(s) in {:.1}s",
            report.ingested.len(),
            report.total(),
            report.elapsed.as_secs_f64()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_requires_files() {
        assert!(Cli::try_parse_from(["studytree", "extract"]).is_err());
    }

    #[test]
    fn extract_flags_parse() {
        let cli = Cli::try_parse_from([
            "studytree", "-vv", "extract", "a.pdf", "b.pptx", "--summarize", "--format", "json",
            "--out", "tree.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Extract {
                files,
                summarize,
                out,
                format,
            } => {
                assert_eq!(files, vec![PathBuf::from("a.pdf"), PathBuf::from("b.pptx")]);
                assert!(summarize);
                assert_eq!(out, Some(PathBuf::from("tree.json")));
                assert_eq!(format, Some(OutputFormat::Json));
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn output_format_maps_to_export_format() {
        assert_eq!(ExportFormat::from(OutputFormat::Markdown), ExportFormat::Markdown);
        assert_eq!(ExportFormat::from(OutputFormat::Json), ExportFormat::Json);
    }
}
