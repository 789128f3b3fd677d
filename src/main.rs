use clap::{Parser, Subcommand};
use research_sync::approval::ApprovalStore;
use research_sync::config::{Config, ConfigError};
use research_sync::openalex::{OpenAlexClient, OpenAlexError};
use research_sync::sheets::{SheetsClient, SheetsError};
use research_sync::sync::{ResearchSyncOrchestrator, SyncError};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Sync newly published research articles into the approval spreadsheet.
#[derive(Parser)]
#[command(name = "research-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
	/// Enable debug logging.
	#[arg(short, long, global = true)]
	verbose: bool,

	/// Path to a TOML configuration file.
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Append new works from the given journals to the approval sheet.
	Sync {
		/// Journal (source) ids; defaults to the configured list.
		journals: Vec<String>,
	},

	/// Print the approved articles.
	Approved,

	/// Free-text search over works.
	Search {
		query: String,

		/// Filter expression, e.g. `publication_year:2026`.
		#[arg(short, long)]
		filter: Option<String>,

		#[arg(long, default_value = "1")]
		page: u32,

		#[arg(long, default_value = "25")]
		per_page: u32,
	},

	/// Look up one work by id.
	Work { id: String },

	/// List works by one author.
	Author {
		author_id: String,

		#[arg(long, default_value = "1")]
		page: u32,

		#[arg(long, default_value = "25")]
		per_page: u32,
	},
}

#[derive(Debug, thiserror::Error)]
enum CliError {
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("Search error: {0}")]
	Search(#[from] OpenAlexError),

	#[error("Spreadsheet error: {0}")]
	Sheets(#[from] SheetsError),

	#[error("Sync failed: {0}")]
	Sync(#[from] SyncError),

	#[error("Output error: {0}")]
	Output(#[from] serde_json::Error),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	dotenvy::dotenv().ok();
	let cli = Cli::parse();

	let filter = match log_filter(cli.verbose) {
		Ok(filter) => filter,
		Err(e) => {
			eprintln!("Invalid log directive: {}", e);
			return ExitCode::FAILURE;
		}
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.init();

	match run(cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{}", e);
			ExitCode::FAILURE
		}
	}
}

/// `RUST_LOG` plus an info floor; `--verbose` turns on debug output for this crate only.
fn log_filter(verbose: bool) -> Result<EnvFilter, ParseError> {
	let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
	if verbose {
		Ok(filter.add_directive("research_sync=debug".parse()?))
	} else {
		Ok(filter)
	}
}

async fn run(cli: Cli) -> Result<(), CliError> {
	let config = Config::load(cli.config.as_deref())?;
	let search = OpenAlexClient::new(&config.openalex)?;

	match cli.command {
		Commands::Sync { journals } => {
			let journals = if journals.is_empty() {
				config.journals.clone()
			} else {
				journals
			};
			let orchestrator = build_orchestrator(&config, search)?;
			let report = orchestrator.sync(&journals).await?;
			for journal in &report.journals {
				info!(
					"{}: fetched {}, already approved {}, appended {}",
					journal.journal_id, journal.fetched, journal.already_approved, journal.appended
				);
			}
			print_json(&json!({ "appendedCount": report.total_appended }))
		}
		Commands::Approved => {
			let orchestrator = build_orchestrator(&config, search)?;
			let works = orchestrator.approved_articles().await?;
			print_json(&works)
		}
		Commands::Search {
			query,
			filter,
			page,
			per_page,
		} => {
			let response = search
				.search_works(&query, filter.as_deref(), page, per_page)
				.await?;
			print_json(&response)
		}
		Commands::Work { id } => {
			let work = search.get_work(&id).await?;
			print_json(&work)
		}
		Commands::Author {
			author_id,
			page,
			per_page,
		} => {
			let response = search.works_by_author(&author_id, page, per_page).await?;
			print_json(&response)
		}
	}
}

fn build_orchestrator(
	config: &Config,
	search: OpenAlexClient,
) -> Result<ResearchSyncOrchestrator, CliError> {
	config.validate_store()?;
	let sheets = SheetsClient::new(&config.sheets)?;
	let approvals = ApprovalStore::new(Box::new(sheets), config.sheets.sheet_name.clone());
	Ok(ResearchSyncOrchestrator::new(
		Box::new(search),
		approvals,
		config.sync.clone(),
	))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
