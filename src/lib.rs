//! Trademark search dashboard.
//!
//! Fetches one search response from the trademark API (or loads a saved one)
//! and lets you filter it by status, free text, and owner/law-firm/attorney
//! facets, either interactively in a TUI or from scripted subcommands.

pub mod client;
pub mod config;
pub mod export;
pub mod filter;
pub mod model;
pub mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;

use crate::client::SearchClient;
use crate::config::DashboardConfig;
use crate::export::{ExportFormat, ExportOptions, export_results};
use crate::filter::{FilterCriteria, StatusFilter, filter_hits};
use crate::model::types::{FacetBucket, SearchResponse, TrademarkHit, TrademarkStatus};

#[derive(Parser, Debug)]
#[command(name = "tms", about = "Search and filter US trademark records", version)]
pub struct Cli {
    /// Path to an alternate config file (default: XDG config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filter flags shared by the scripted subcommands.
#[derive(clap::Args, Debug)]
pub struct FilterArgs {
    /// Free-text query matched across owner, law firm, attorney,
    /// registration number, and description fields
    #[arg(default_value = "")]
    pub query: String,

    /// Status filter: All, Registered, Pending, Abandoned, or Others
    #[arg(long, default_value = "All")]
    pub status: String,

    /// Keep only hits with this owner (repeatable, normalized form)
    #[arg(long = "owner")]
    pub owners: Vec<String>,

    /// Keep only hits filed by this law firm (repeatable)
    #[arg(long = "law-firm")]
    pub law_firms: Vec<String>,

    /// Keep only hits with this attorney of record (repeatable)
    #[arg(long = "attorney")]
    pub attorneys: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive dashboard
    Tui {
        /// Load a saved response JSON file instead of fetching
        #[arg(long)]
        response_file: Option<PathBuf>,
    },

    /// Fetch, filter, and print matching trademarks
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print at most this many hits
        #[arg(long)]
        limit: Option<usize>,

        /// Emit JSON instead of formatted text
        #[arg(long)]
        json: bool,

        /// Load a saved response JSON file instead of fetching
        #[arg(long)]
        response_file: Option<PathBuf>,
    },

    /// Print the facet options (owners, law firms, attorneys) with counts
    Facets {
        /// Emit JSON instead of formatted text
        #[arg(long)]
        json: bool,

        /// Load a saved response JSON file instead of fetching
        #[arg(long)]
        response_file: Option<PathBuf>,
    },

    /// Export filtered results to a file
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output format: markdown, json, or text
        #[arg(long, default_value = "markdown")]
        format: String,

        /// Output file path (default: trademark-export.<ext>)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Load a saved response JSON file instead of fetching
        #[arg(long)]
        response_file: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Install the global tracing subscriber.
///
/// Defaults to `warn` on stderr; `RUST_LOG` overrides the filter and
/// `TMS_LOG_DIR` redirects output to a daily-rolled file in that directory.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let log_dir = std::env::var("TMS_LOG_DIR")
        .map(PathBuf::from)
        .ok()
        .or_else(default_log_dir);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tms.log");
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(appender)
                .with_ansi(false)
                .finish();
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
        None => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
    }
}

/// File logging is opt-in: `TMS_LOG=1` without `TMS_LOG_DIR` picks the
/// platform data directory.
fn default_log_dir() -> Option<PathBuf> {
    if std::env::var("TMS_LOG").is_err() {
        return None;
    }
    directories::ProjectDirs::from("", "", "tms").map(|dirs| dirs.data_dir().join("logs"))
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tui { response_file } => {
            ui::tui::ensure_terminal()?;
            let (response, error) =
                obtain_for_tui(cli.config.as_deref(), response_file.as_deref()).await;
            ui::tui::run_tui(response, error)
        }
        Commands::Search {
            filters,
            limit,
            json,
            response_file,
        } => {
            run_search(
                cli.config.as_deref(),
                response_file.as_deref(),
                filters,
                limit,
                json,
            )
            .await
        }
        Commands::Facets {
            json,
            response_file,
        } => run_facets(cli.config.as_deref(), response_file.as_deref(), json).await,
        Commands::Export {
            filters,
            format,
            output,
            response_file,
        } => {
            run_export(
                cli.config.as_deref(),
                response_file.as_deref(),
                filters,
                &format,
                output,
            )
            .await
        }
        Commands::Config { action } => match action {
            ConfigCommands::Init { force } => run_config_init(cli.config.as_deref(), force),
        },
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "tms",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

/// Resolve the response: a saved file when given, a live fetch otherwise.
async fn obtain_response(
    config_path: Option<&Path>,
    response_file: Option<&Path>,
) -> Result<SearchResponse> {
    if let Some(path) = response_file {
        return client::load_response(path)
            .with_context(|| format!("loading response from {}", path.display()));
    }

    let config = match config_path {
        Some(path) => DashboardConfig::load_from(path)?,
        None => DashboardConfig::load()?,
    };
    let client = SearchClient::new(&config)?;
    Ok(client.fetch().await?)
}

/// The dashboard opens even when the fetch fails; it shows the error and an
/// empty result list instead of exiting.
async fn obtain_for_tui(
    config_path: Option<&Path>,
    response_file: Option<&Path>,
) -> (Option<SearchResponse>, Option<String>) {
    match obtain_response(config_path, response_file).await {
        Ok(response) => (Some(response), None),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "dashboard_fetch_failed");
            (None, Some(format!("{err:#}")))
        }
    }
}

fn build_criteria(args: FilterArgs) -> Result<FilterCriteria> {
    let Some(status) = StatusFilter::from_label(&args.status) else {
        bail!(
            "unknown status '{}' (expected one of: All, Registered, Pending, Abandoned, Others)",
            args.status
        );
    };
    Ok(FilterCriteria {
        status,
        search_query: args.query,
        selected_owners: args.owners.into_iter().collect(),
        selected_law_firms: args.law_firms.into_iter().collect(),
        selected_attorneys: args.attorneys.into_iter().collect(),
    })
}

async fn run_search(
    config_path: Option<&Path>,
    response_file: Option<&Path>,
    filters: FilterArgs,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let criteria = build_criteria(filters)?;
    let response = obtain_response(config_path, response_file).await?;

    let mut hits = filter_hits(Some(&response), &criteria);
    let total_visible = hits.len();
    if let Some(limit) = limit {
        hits.truncate(limit);
    }

    if json {
        let payload = serde_json::json!({
            "count": total_visible,
            "hits": hits,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for hit in &hits {
        println!("{}", render_hit_line(hit));
    }
    println!(
        "{}",
        format!("{} of {} hits", total_visible, response.hits().len()).dimmed()
    );
    Ok(())
}

fn render_hit_line(hit: &TrademarkHit) -> String {
    let src = &hit.source;
    let status = TrademarkStatus::classify(&src.status_type);
    format!(
        "{}  {:<30.30}  reg {:<10.10}  {:<30.30}  first use {}",
        paint_status(&status),
        src.current_owner,
        src.registration_number,
        src.law_firm,
        ui::format::format_first_use_date(src.first_use_anywhere_date.as_deref())
    )
}

fn paint_status(status: &TrademarkStatus) -> String {
    let label = format!("{:<10.10}", status.to_string());
    match status {
        TrademarkStatus::Registered => label.green().to_string(),
        TrademarkStatus::Pending => label.yellow().to_string(),
        TrademarkStatus::Abandoned => label.red().to_string(),
        TrademarkStatus::Other(_) => label.dimmed().to_string(),
    }
}

async fn run_facets(
    config_path: Option<&Path>,
    response_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let response = obtain_response(config_path, response_file).await?;

    if json {
        let payload = serde_json::json!({
            "owners": response.owners(),
            "law_firms": response.law_firms(),
            "attorneys": response.attorneys(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    print_facet_section("Owners", response.owners());
    print_facet_section("Law Firms", response.law_firms());
    print_facet_section("Attorneys", response.attorneys());
    Ok(())
}

fn print_facet_section(title: &str, buckets: &[FacetBucket]) {
    println!("{}", title.bold());
    if buckets.is_empty() {
        println!("  (none)");
    }
    for bucket in buckets {
        println!("  {} ({})", bucket.key, bucket.doc_count);
    }
    println!();
}

/// Materialize the default config so the user has a file to edit.
fn run_config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => DashboardConfig::config_path()?,
    };

    if path.exists() && !force {
        bail!(
            "config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    DashboardConfig::default().save_to(&path)?;
    println!("wrote default config to {}", path.display());
    Ok(())
}

async fn run_export(
    config_path: Option<&Path>,
    response_file: Option<&Path>,
    filters: FilterArgs,
    format_name: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let Some(format) = ExportFormat::from_name(format_name) else {
        bail!("unknown export format '{format_name}' (expected markdown, json, or text)");
    };

    let criteria = build_criteria(filters)?;
    let response = obtain_response(config_path, response_file).await?;

    let hits: Vec<TrademarkHit> = filter_hits(Some(&response), &criteria)
        .into_iter()
        .cloned()
        .collect();

    let options = ExportOptions {
        query: (!criteria.search_query.trim().is_empty())
            .then(|| criteria.search_query.clone()),
        ..Default::default()
    };
    let content = export_results(&hits, format, &options);

    let path = output
        .unwrap_or_else(|| PathBuf::from(format!("trademark-export.{}", format.extension())));
    std::fs::write(&path, content)
        .with_context(|| format!("writing export to {}", path.display()))?;

    tracing::info!(file = %path.display(), hits = hits.len(), format = format.name(), "export_written");
    println!("exported {} hits to {}", hits.len(), path.display());
    Ok(())
}
