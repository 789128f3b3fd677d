//! Spreadsheet value-range access
//!
//! The approval sheet is reached through plain value ranges: read a rectangular range, overwrite a
//! rectangular range. [`SheetsClient`] talks to the Sheets REST API and [`MemorySheet`] keeps the
//! grid in memory with the same read semantics (trailing empty cells and rows are dropped).

/// REST client for the spreadsheet values API
mod client;
/// In-memory grid
mod memory;
/// A1 range notation
pub mod range;

pub use client::SheetsClient;
pub use memory::MemorySheet;
pub use range::A1Range;

use crate::retry::Transient;

/// Outcome of a range overwrite as reported by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
	pub updated_range: Option<String>,
	pub updated_rows: u32,
}

/// Error types for spreadsheet access
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
	#[error("Invalid range: {0}")]
	InvalidRange(String),

	#[error("Invalid store URL: {0}")]
	InvalidUrl(String),

	#[error("HTTP transport error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("HTTP error {status} for {range}: {body}")]
	Status {
		range: String,
		status: u16,
		body: String,
	},

	#[error("Unexpected response for {range}: {source}")]
	Decode {
		range: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("Write conflict on {range}: {detail}")]
	Conflict { range: String, detail: String },
}

impl Transient for SheetsError {
	fn is_transient(&self) -> bool {
		match self {
			SheetsError::Transport(_) => true,
			SheetsError::Status { status, .. } => *status == 429 || *status >= 500,
			_ => false,
		}
	}
}
