//! StudyTree CLI: local study-material extraction tool.
//!
//! Reads PDF, DOCX and PPTX course material, keeps the concept sections, and
//! emits a flat knowledge tree as Markdown or JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
