//!
//! Runtime configuration.
//!
//! Values come from an optional TOML file and are then overridden by environment variables, so a
//! deployment can keep the spreadsheet id and access token out of the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::sync::strategies::PagingConfig;

/// Upper bound the works endpoint accepts for `per-page`.
pub const MAX_PER_PAGE: u32 = 200;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Failed to read config file {path:?}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file {path:?}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid value {value:?} for {name}")]
	InvalidValue { name: &'static str, value: String },

	#[error("Missing required setting: {0}")]
	Missing(&'static str),
}

/// Retry budget for one HTTP call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
	/// Total time spent retrying transient failures; 0 disables retries.
	pub max_elapsed_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAlexConfig {
	pub base_url: String,
	pub timeout_secs: u64,
	/// Contact address sent as `mailto` so requests land in the polite pool.
	pub mailto: Option<String>,
	pub retry: RetryConfig,
}

impl Default for OpenAlexConfig {
	fn default() -> Self {
		Self {
			base_url: "https://api.openalex.org".to_string(),
			timeout_secs: 30,
			mailto: None,
			retry: RetryConfig::default(),
		}
	}
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
	pub base_url: String,
	pub spreadsheet_id: String,
	/// Tab to address; the first tab is used when unset.
	pub sheet_name: Option<String>,
	pub access_token: String,
	pub timeout_secs: u64,
	pub retry: RetryConfig,
}

impl Default for SheetsConfig {
	fn default() -> Self {
		Self {
			base_url: "https://sheets.googleapis.com".to_string(),
			spreadsheet_id: String::new(),
			sheet_name: None,
			access_token: String::new(),
			timeout_secs: 30,
			retry: RetryConfig::default(),
		}
	}
}

impl std::fmt::Debug for SheetsConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SheetsConfig")
			.field("base_url", &self.base_url)
			.field("spreadsheet_id", &self.spreadsheet_id)
			.field("sheet_name", &self.sheet_name)
			.field("access_token", &"<redacted>")
			.field("timeout_secs", &self.timeout_secs)
			.field("retry", &self.retry)
			.finish()
	}
}

/// What the orchestrator does when one journal fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalErrorPolicy {
	/// Stop the run and surface the first error.
	#[default]
	Abort,
	/// Record the failure on the journal's report entry and keep going.
	Continue,
}

impl FromStr for JournalErrorPolicy {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"abort" => Ok(Self::Abort),
			"continue" => Ok(Self::Continue),
			_ => Err(ConfigError::InvalidValue {
				name: "sync.on_journal_error",
				value: s.to_string(),
			}),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
	/// Length of the trailing publication-date window, in days.
	pub window_days: u32,
	/// Page size requested per journal.
	pub per_page: u32,
	pub on_journal_error: JournalErrorPolicy,
	pub pages: PagingConfig,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			window_days: 7,
			per_page: 25,
			on_journal_error: JournalErrorPolicy::Abort,
			pages: PagingConfig::default(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub openalex: OpenAlexConfig,
	pub sheets: SheetsConfig,
	pub sync: SyncConfig,
	/// Journals synced when none are given on the command line.
	pub journals: Vec<String>,
}

impl Config {
	/// Load the file at `path` (if any), then apply environment overrides.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let mut config = match path {
			Some(path) => Self::from_file(path)?,
			None => Self::default(),
		};
		config.apply_overrides(|name| std::env::var(name).ok())?;
		config.validate()?;
		Ok(config)
	}

	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		toml::from_str(&content).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})
	}

	/// Apply overrides from `lookup`, which maps a variable name to its value.
	pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(v) = lookup("OPENALEX_BASE_URL") {
			self.openalex.base_url = v;
		}
		if let Some(v) = lookup("OPENALEX_MAILTO") {
			self.openalex.mailto = Some(v).filter(|v| !v.trim().is_empty());
		}
		if let Some(v) = lookup("SHEETS_BASE_URL") {
			self.sheets.base_url = v;
		}
		if let Some(v) = lookup("SHEETS_SPREADSHEET_ID") {
			self.sheets.spreadsheet_id = v;
		}
		if let Some(v) = lookup("SHEETS_ACCESS_TOKEN") {
			self.sheets.access_token = v;
		}
		if let Some(v) = lookup("SHEETS_SHEET_NAME") {
			self.sheets.sheet_name = Some(v).filter(|v| !v.trim().is_empty());
		}
		if let Some(v) = lookup("SYNC_WINDOW_DAYS") {
			self.sync.window_days = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
				name: "SYNC_WINDOW_DAYS",
				value: v.clone(),
			})?;
		}
		if let Some(v) = lookup("SYNC_ON_JOURNAL_ERROR") {
			self.sync.on_journal_error = v.parse()?;
		}
		if let Some(v) = lookup("SYNC_JOURNALS") {
			self.journals = v
				.split(',')
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(str::to_string)
				.collect();
		}
		Ok(())
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.sync.window_days == 0 {
			return Err(ConfigError::InvalidValue {
				name: "sync.window_days",
				value: "0".to_string(),
			});
		}
		if self.sync.per_page == 0 || self.sync.per_page > MAX_PER_PAGE {
			return Err(ConfigError::InvalidValue {
				name: "sync.per_page",
				value: self.sync.per_page.to_string(),
			});
		}
		Ok(())
	}

	/// Checks the settings needed by commands that read or write the approval sheet.
	pub fn validate_store(&self) -> Result<(), ConfigError> {
		if self.sheets.spreadsheet_id.trim().is_empty() {
			return Err(ConfigError::Missing("sheets.spreadsheet_id"));
		}
		if self.sheets.access_token.trim().is_empty() {
			return Err(ConfigError::Missing("sheets.access_token"));
		}
		Ok(())
	}
}
