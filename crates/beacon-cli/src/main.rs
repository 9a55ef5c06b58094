//! Beacon - CI status dashboard CLI
//!
//! The `beacon` command polls CI status feeds and prints a dashboard.
//!
//! ## Commands
//!
//! - `check-url`: validate a feed URL and show the project name it carries
//! - `parse`: parse a saved feed payload into a status record
//! - `poll`: run one ingestion cycle and print the dashboard
//! - `watch`: poll on an interval until interrupted

mod config;
mod dashboard;

use anyhow::{bail, Context, Result};
use beacon_core::{FeedKind, StatusRecord};
use beacon_poll::{HttpFeedFetcher, PollReport, Poller, Reconciliation};
use beacon_state::{FileStatusLedger, MemoryStatusLedger, StatusLedger};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, Level};

use config::BeaconConfig;
use dashboard::Dashboard;

#[derive(Parser)]
#[command(name = "beacon")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CI status dashboard", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a feed URL is well formed
    CheckUrl {
        url: String,

        /// CI backend the URL belongs to
        #[arg(short, long, default_value = "integrity")]
        kind: FeedKind,
    },

    /// Parse a saved feed payload and print the resulting status
    Parse {
        /// Payload file (cctray XML or build JSON)
        file: PathBuf,

        #[arg(short, long, default_value = "integrity")]
        kind: FeedKind,

        /// Project to pick out of a multi-project feed
        #[arg(short, long)]
        project: Option<String>,

        /// Treat the payload as a building feed
        #[arg(long)]
        building: bool,
    },

    /// Poll every configured project once and print the dashboard
    Poll {
        #[arg(short, long, env = "BEACON_CONFIG", default_value = "beacon.toml")]
        config: PathBuf,
    },

    /// Poll on the configured interval until Ctrl-C
    Watch {
        #[arg(short, long, env = "BEACON_CONFIG", default_value = "beacon.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    beacon_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::CheckUrl { url, kind } => cmd_check_url(&url, kind),
        Commands::Parse {
            file,
            kind,
            project,
            building,
        } => cmd_parse(&file, kind, project.as_deref(), building),
        Commands::Poll { config } => cmd_poll(&config).await,
        Commands::Watch { config } => cmd_watch(&config).await,
    }
}

/// Validate a feed URL, failing the command when it is malformed.
fn cmd_check_url(url: &str, kind: FeedKind) -> Result<()> {
    let pattern = kind.backend().url_pattern();
    if !pattern.is_valid(Some(url)) {
        bail!("'{}' is not a valid {} feed url", url, kind);
    }

    println!("valid {} feed url", kind);
    match pattern.extract_name(Some(url)) {
        Some(name) => println!("project: {}", name),
        None => println!("project: -"),
    }
    Ok(())
}

fn parse_payload(
    content: &str,
    kind: FeedKind,
    project: Option<&str>,
    building: bool,
) -> StatusRecord {
    let backend = kind.backend();
    if building {
        backend.building_parser(content, project)
    } else {
        backend.status_parser(content, project)
    }
}

fn cmd_parse(path: &Path, kind: FeedKind, project: Option<&str>, building: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read payload {}", path.display()))?;
    let record = parse_payload(&content, kind, project, building);

    println!("{}", serde_json::to_string_pretty(&record)?);
    println!("status: {}", record.in_words());
    Ok(())
}

/// Everything one poll cycle needs, built once per command.
struct Runtime {
    config: BeaconConfig,
    ledger: Arc<dyn StatusLedger>,
    poller: Poller,
}

impl Runtime {
    fn from_config(path: &Path) -> Result<Self> {
        let config = BeaconConfig::load(path)?;
        let fetcher = Arc::new(
            HttpFeedFetcher::new(config.fetch_timeout()).context("Failed to build HTTP client")?,
        );
        let ledger = open_ledger(config.ledger_path.as_deref())?;
        let poller = Poller::new(ledger.clone(), fetcher);
        Ok(Self {
            config,
            ledger,
            poller,
        })
    }

    async fn cycle(&self) -> Result<(PollReport, Dashboard)> {
        let projects = self.config.projects();
        let report = self.poller.poll_all(&projects).await?;
        let dashboard = Dashboard::load(
            self.ledger.as_ref(),
            &projects,
            &self.config.aggregates(),
            self.config.dashboard_limit,
        )
        .await?;
        Ok((report, dashboard))
    }
}

fn open_ledger(path: Option<&Path>) -> Result<Arc<dyn StatusLedger>> {
    Ok(match path {
        Some(path) => Arc::new(
            FileStatusLedger::open(path)
                .with_context(|| format!("Failed to open ledger {}", path.display()))?,
        ),
        None => Arc::new(MemoryStatusLedger::new()),
    })
}

fn render_report(report: &PollReport) -> String {
    let mut lines = Vec::new();
    for outcome in &report.outcomes {
        let decision = match outcome.decision {
            Reconciliation::Record => "recorded",
            Reconciliation::Unchanged => "unchanged",
        };
        let building = if outcome.building { " (building)" } else { "" };
        lines.push(format!(
            "{}: {} {}{}",
            outcome.project,
            outcome.status.in_words(),
            decision,
            building
        ));
    }
    for name in &report.skipped {
        lines.push(format!("{}: skipped (no feed url)", name));
    }
    lines.join("\n")
}

async fn cmd_poll(config: &Path) -> Result<()> {
    let runtime = Runtime::from_config(config)?;
    let (report, dashboard) = runtime.cycle().await?;

    println!("{}", render_report(&report));
    println!();
    print!("{}", dashboard.render());
    Ok(())
}

async fn cmd_watch(config: &Path) -> Result<()> {
    let runtime = Runtime::from_config(config)?;
    let mut ticker = tokio::time::interval(runtime.config.poll_interval());
    info!(
        interval_secs = runtime.config.poll_interval_secs,
        projects = runtime.config.projects.len(),
        "watching status feeds"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match runtime.cycle().await {
                    Ok((_, dashboard)) => print!("{}", dashboard.render()),
                    Err(e) => error!(error = %format!("{:#}", e), "poll cycle failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                break;
            }
        }
    }
    Ok(())
}
