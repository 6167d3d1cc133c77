//! Chat memory CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Load configuration** from `config.toml` and the environment.
//! 2. **Wire observability** with `tracing-subscriber` (JSON or pretty, on
//!    stderr) and, when configured, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: one [`GithubContentStore`] shared by both
//!    writers as an `Arc<dyn ContentStore>`.
//! 4. **Run one command** and print its result on stdout.
//!
//! Exit status is non-zero on any save failure. Cleanup problems during a
//! memory save are warnings, not failures.

mod commands;
mod config;
mod telemetry;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use github::GithubContentStore;
use memory::{CommitResult, ContentStore, MemorySaveReport, Redactor};
use serde::Serialize;
use tracing::{error, info};

use crate::commands::{App, MemoryInput, PromptOutcome};
use crate::config::AppConfig;
use crate::telemetry::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "chat-memory", version, about = "Save chat memories and summaries to a GitHub repository")]
struct Cli {
    /// Config file; defaults to `{config_dir}/chat-memory/config.toml`.
    #[arg(long, global = true, env = "CHAT_MEMORY_CONFIG")]
    config: Option<PathBuf>,

    /// Log format, overriding the config file.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save a conversation for a session under today's date.
    SaveMemory {
        #[arg(long)]
        session_id: Option<String>,
        /// Chat page URL; the session id is taken from `/chat/{id}`.
        #[arg(long)]
        url: Option<String>,
        /// File holding a JSON array of messages; `-` or absent reads stdin.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Treat input as ready-made Markdown instead of JSON messages.
        #[arg(long)]
        raw: bool,
    },
    /// Overwrite `summary.md`.
    SaveSummary {
        #[arg(long, conflicts_with = "text")]
        input: Option<PathBuf>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Run a prompt through the trigger phrases and save if one matches.
    Prompt {
        #[arg(long)]
        text: String,
        #[arg(long)]
        url: Option<String>,
        /// Conversation (JSON messages) or fallback summary text.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the effective configuration with the token masked.
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.telemetry.format = format;
    }
    let _telemetry = telemetry::init(&config.telemetry, cli.verbose)?;

    if let Err(e) = run(cli, config).await {
        error!(error = %format!("{e:#}"), "Command failed");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    if let Command::ShowConfig = cli.command {
        let rendered =
            toml::to_string_pretty(&config.redacted()).context("Failed to render config")?;
        print!("{rendered}");
        return Ok(());
    }

    let store = GithubContentStore::new(&config.github).context("Invalid GitHub configuration")?;
    info!(
        owner = %config.github.owner,
        repo = %config.github.repo,
        branch = store.branch(),
        "Using GitHub content store"
    );
    let store: Arc<dyn ContentStore> = Arc::new(store);
    let redactor = Redactor::new().with_secret(config.github.token.trim());
    let app = App::new(store, redactor, config.triggers);
    let now = Utc::now();

    match cli.command {
        Command::SaveMemory {
            session_id,
            url,
            input,
            raw,
        } => {
            let input = MemoryInput {
                text: read_input(input.as_deref())?,
                raw,
                session_id,
                url,
            };
            let report = app.save_memory(&input, now).await?;
            print_memory(&report, cli.json)?;
        }
        Command::SaveSummary { input, text } => {
            let text = match text {
                Some(text) => text,
                None => read_input(input.as_deref())?,
            };
            let commit = app.save_summary(&text).await?;
            print_summary(&commit, cli.json)?;
        }
        Command::Prompt { text, url, input } => {
            let input = input.as_deref().map(|p| read_input(Some(p))).transpose()?;
            match app.prompt(&text, url.as_deref(), input.as_deref(), now).await? {
                PromptOutcome::Memory(report) => print_memory(&report, cli.json)?,
                PromptOutcome::Summary(commit) => print_summary(&commit, cli.json)?,
                outcome @ PromptOutcome::NoTrigger if cli.json => print_json(&outcome)?,
                PromptOutcome::NoTrigger => println!("No trigger phrase matched"),
            }
        }
        Command::ShowConfig => {}
    }
    Ok(())
}

/// Reads a file, or stdin for `None` and `-`.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_memory(report: &MemorySaveReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    println!("Saved {} ({})", report.commit.path, report.commit.commit);
    for path in &report.cleanup.deleted {
        println!("Removed {path}");
    }
    for failure in &report.cleanup.failures {
        match &failure.path {
            Some(path) => eprintln!("warning: could not remove {path}: {}", failure.message),
            None => eprintln!("warning: cleanup skipped: {}", failure.message),
        }
    }
    if report.redactions > 0 {
        eprintln!("warning: removed {} credential(s) from content", report.redactions);
    }
    Ok(())
}

fn print_summary(commit: &CommitResult, json: bool) -> Result<()> {
    if json {
        return print_json(commit);
    }
    println!("Saved {} ({})", commit.path, commit.commit);
    if let Some(url) = &commit.html_url {
        println!("{url}");
    }
    Ok(())
}
