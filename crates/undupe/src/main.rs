//! undupe - terminal client for the document deduplication and comparison service

mod app;
mod client;
mod config;
mod logging;
mod print;
mod text;
mod tui;
mod views;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client::ApiClient;
use config::Config;
use logging::LogTarget;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use undupe_core::{
    Applied, CompareKind, CompareRequest, ComparisonResult, DedupeRequest, ResultMode,
    ResultModeController, Settings,
};

#[derive(Parser, Debug)]
#[command(name = "undupe")]
#[command(author, version, about = "Deduplicate datasets and compare documents from the terminal")]
#[command(long_about = "Runs the interactive client when no command is given.\n\n\
    Environment:\n  UNDUPE_API_URL   service base URL\n  UNDUPE_LOG       log filter (e.g. debug)")]
struct Cli {
    /// Service base URL (overrides config and UNDUPE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (default: ~/.config/undupe/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Align two local files and print them side by side
    Diff {
        old: PathBuf,
        new: PathBuf,
        /// Print the alignment ops as JSON
        #[arg(long)]
        json: bool,
        /// Mark changes with [-removed-] / {+added+} instead of colors
        #[arg(long)]
        no_color: bool,
    },
    /// Compare two documents
    Compare {
        query: PathBuf,
        target: PathBuf,
        #[command(flatten)]
        settings: SettingsArgs,
        /// Print the raw service response
        #[arg(long)]
        json: bool,
        #[arg(long)]
        no_color: bool,
    },
    /// Compare a document against every file in a zip archive
    CompareDir {
        query: PathBuf,
        archive: PathBuf,
        /// Maximum number of matches to return
        #[arg(long)]
        top_k: Option<u32>,
        #[command(flatten)]
        settings: SettingsArgs,
        #[arg(long)]
        json: bool,
    },
    /// Deduplicate a dataset (csv, json, txt or pdf)
    Process {
        file: PathBuf,
        /// Column holding the text to deduplicate
        #[arg(long)]
        text_column: Option<String>,
        #[command(flatten)]
        settings: SettingsArgs,
        #[arg(long)]
        json: bool,
    },
    /// Download a server-side artifact
    Download {
        /// Server path as reported by `process`
        path: String,
        /// Output directory (default: configured download dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that the service is reachable
    Health,
}

#[derive(Args, Debug, Default)]
struct SettingsArgs {
    /// Strip stopwords before comparing
    #[arg(long)]
    remove_stopwords: bool,
    /// Cosine similarity threshold (0.0 - 1.0)
    #[arg(long)]
    cosine_threshold: Option<f64>,
    /// Fuzzy ratio threshold (0 - 100)
    #[arg(long)]
    fuzzy_threshold: Option<u8>,
    /// Sentence embedding model
    #[arg(long)]
    model: Option<String>,
}

impl SettingsArgs {
    fn resolve(&self, base: &Settings) -> Result<Settings> {
        let mut settings = base.clone();
        if self.remove_stopwords {
            settings.remove_stopwords = true;
        }
        if let Some(cosine) = self.cosine_threshold {
            if !(0.0..=1.0).contains(&cosine) {
                bail!("--cosine-threshold must be between 0 and 1, got {cosine}");
            }
            settings.thresholds.cosine = cosine;
        }
        if let Some(fuzzy) = self.fuzzy_threshold {
            if fuzzy > 100 {
                bail!("--fuzzy-threshold must be between 0 and 100, got {fuzzy}");
            }
            settings.thresholds.fuzzy = fuzzy;
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(if cli.command.is_none() {
        LogTarget::File
    } else {
        LogTarget::Stderr
    });

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    let Some(command) = cli.command else {
        let client = build_client(&config)?;
        return tui::run(&config, client).await;
    };

    match command {
        Command::Diff {
            old,
            new,
            json,
            no_color,
        } => run_diff(&config, &old, &new, json, !no_color),
        Command::Compare {
            query,
            target,
            settings,
            json,
            no_color,
        } => {
            let request = CompareRequest {
                kind: CompareKind::FileVsFile,
                query,
                target,
                settings: settings.resolve(&config.settings)?,
            };
            run_compare(&config, request, None, json, !no_color).await
        }
        Command::CompareDir {
            query,
            archive,
            top_k,
            settings,
            json,
        } => {
            let request = CompareRequest {
                kind: CompareKind::FileVsFolder,
                query,
                target: archive,
                settings: settings.resolve(&config.settings)?,
            };
            let top_k = top_k.or(config.top_k);
            run_compare(&config, request, top_k, json, false).await
        }
        Command::Process {
            file,
            text_column,
            settings,
            json,
        } => {
            let request = DedupeRequest {
                file,
                text_column: text_column.or_else(|| config.text_column.clone()),
                settings: settings.resolve(&config.settings)?,
            };
            let client = build_client(&config)?;
            let result = client.process(&request).await?;
            present(&config, ComparisonResult::from(result), json, false)
        }
        Command::Download { path, output } => {
            let client = build_client(&config)?;
            let dir = output.unwrap_or_else(|| config.download_dir());
            let saved = client.download_to(&path, &dir).await?;
            println!("{}", saved.display());
            Ok(())
        }
        Command::Health => {
            let client = build_client(&config)?;
            client
                .health()
                .await
                .with_context(|| format!("{} is not reachable", client.base_url()))?;
            println!("{} ok", client.base_url());
            Ok(())
        }
    }
}

fn build_client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(
        config.api_url.clone(),
        config.request_timeout(),
        config.connect_timeout(),
    )
    .context("Failed to build HTTP client")
}

fn use_color(requested: bool) -> bool {
    requested && io::stdout().is_terminal()
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn run_diff(config: &Config, old: &Path, new: &Path, json: bool, color: bool) -> Result<()> {
    let old_text = std::fs::read_to_string(old)
        .with_context(|| format!("Failed to read {}", old.display()))?;
    let new_text = std::fs::read_to_string(new)
        .with_context(|| format!("Failed to read {}", new.display()))?;

    let ops = config.alignment_engine().align(&old_text, &new_text);
    if json {
        return write_json(&ops);
    }

    let panes = undupe_core::project(&ops);
    let stats = undupe_core::AlignmentStats::from_ops(&ops);
    let mut out = io::stdout().lock();
    print::write_stats(&mut out, &stats)?;
    writeln!(out)?;
    print::write_panes(
        &mut out,
        &panes,
        &old.display().to_string(),
        &new.display().to_string(),
        use_color(color),
    )?;
    Ok(())
}

async fn run_compare(
    config: &Config,
    request: CompareRequest,
    top_k: Option<u32>,
    json: bool,
    color: bool,
) -> Result<()> {
    let client = build_client(config)?;
    let result = client.submit_compare(&request, top_k).await?;
    present(config, result, json, color)
}

/// Route a service response through the result controller and print the mode it enters
fn present(config: &Config, result: ComparisonResult, json: bool, color: bool) -> Result<()> {
    if json {
        return match &result {
            ComparisonResult::SinglePair(r) => write_json(r),
            ComparisonResult::Directory(r) => write_json(r),
            ComparisonResult::Dedupe(r) => write_json(r),
        };
    }

    let mut controller = ResultModeController::new(config.alignment_engine());
    let ticket = controller.issue();
    if let Applied::Failed(message) = controller.accept(ticket, Ok(result)) {
        bail!(message);
    }

    let mut out = io::stdout().lock();
    match controller.mode() {
        ResultMode::SinglePair(view) => print::write_single_pair(&mut out, view, use_color(color))?,
        ResultMode::Directory(result) => print::write_directory(&mut out, result)?,
        ResultMode::Dedupe(result) => print::write_dedupe(&mut out, result)?,
        ResultMode::None => {}
    }
    Ok(())
}
