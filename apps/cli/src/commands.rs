//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use pagesync_assistant::AssistantClient;
use pagesync_core::pipeline::{ExportConfig, ProgressReporter, SyncConfig, SyncResult};
use pagesync_shared::{AppConfig, AssistantConfig, NotionConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// pagesync: sync workspace pages into an assistant's knowledge.
#[derive(Parser)]
#[command(
    name = "pagesync",
    version,
    about = "Export workspace pages to markdown and sync them into an assistant's file store.",
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

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Purge old uploads, export all pages, and attach them to the assistant.
    Sync {
        /// Assistant to reuse (overrides config). Created if missing.
        #[arg(long)]
        assistant_id: Option<String>,

        /// Output directory for markdown files (overrides config).
        #[arg(short, long)]
        out: Option<String>,

        /// Keep previously uploaded files instead of deleting them first.
        #[arg(long)]
        no_purge: bool,
    },

    /// Export all pages to markdown files without touching the assistant.
    Export {
        /// Output directory for markdown files (overrides config).
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Delete every file previously uploaded to the assistant API.
    Purge,

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
        0 => "pagesync=info",
        1 => "pagesync=debug",
        _ => "pagesync=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync {
            assistant_id,
            out,
            no_purge,
        } => cmd_sync(assistant_id, out.as_deref(), no_purge).await,
        Command::Export { out } => cmd_export(out.as_deref()).await,
        Command::Purge => cmd_purge().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Build the export config, resolving the workspace token from the environment.
fn export_config(config: &AppConfig, out: Option<&str>) -> Result<ExportConfig> {
    let output_dir = PathBuf::from(out.unwrap_or(&config.output.dir));
    Ok(ExportConfig {
        notion: NotionConfig::resolve(config)?,
        output_dir,
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_sync(assistant_id: Option<String>, out: Option<&str>, no_purge: bool) -> Result<()> {
    let config = load_config()?;

    // Resolve both secrets before any network I/O
    let export = export_config(&config, out)?;
    let mut assistant = AssistantConfig::resolve(&config)?;
    if assistant_id.is_some() {
        assistant.assistant_id = assistant_id;
    }
    if no_purge {
        assistant.purge_before_sync = false;
    }

    info!(
        output_dir = %export.output_dir.display(),
        assistant_id = assistant.assistant_id.as_deref().unwrap_or("<new>"),
        purge = assistant.purge_before_sync,
        "starting sync"
    );

    let reporter = CliProgress::new();
    let result = run_sync(&SyncConfig { export, assistant }, &reporter).await?;

    println!();
    println!("  Assistant knowledge updated!");
    println!("  Assistant: {}", result.assistant_id);
    println!("  Pages:     {}", result.documents);
    println!("  Written:   {}", result.written);
    println!("  Uploaded:  {}", result.uploaded);
    println!("  Purged:    {}", result.purged);
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

/// Run the sync pipeline, clearing the spinner whether it succeeds or fails.
async fn run_sync(config: &SyncConfig, reporter: &CliProgress) -> Result<SyncResult> {
    let result = pagesync_core::pipeline::sync(config, reporter).await;
    reporter.done();
    Ok(result?)
}

async fn cmd_export(out: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let export = export_config(&config, out)?;

    info!(output_dir = %export.output_dir.display(), "exporting pages");

    let reporter = CliProgress::new();
    let result = pagesync_core::pipeline::export(&export, &reporter).await?;
    reporter.done();

    println!();
    println!("  Pages exported!");
    println!("  Pages:   {}", result.documents);
    println!("  Written: {}", result.written.len());
    println!("  Path:    {}", export.output_dir.display());
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_purge() -> Result<()> {
    let config = load_config()?;
    let client = AssistantClient::new(AssistantConfig::resolve(&config)?)?;

    let deleted = client.delete_all_files().await?;
    println!("Deleted {deleted} file(s).");
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
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
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

    fn document_exported(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Exporting [{current}/{total}] {title}"));
    }

    fn done(&self) {
        self.spinner.finish_and_clear();
    }
}
