//! pagesync CLI: keep an assistant's knowledge in step with workspace pages.
//!
//! Exports every workspace page to markdown, uploads the files, and makes
//! them the assistant's retrievable file set.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
