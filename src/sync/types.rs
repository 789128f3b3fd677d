use crate::openalex::OpenAlexError;
use crate::sheets::SheetsError;
use std::fmt;

/// Errors surfaced by a sync run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
	#[error("Search service unavailable: {0}")]
	UpstreamUnavailable(String),

	#[error("Search service error: {0}")]
	UpstreamResponseError(String),

	#[error("Unexpected search payload: {0}")]
	DeserializationError(String),

	#[error("Approval store unavailable: {0}")]
	StoreUnavailable(String),

	#[error("Approval store write conflict: {0}")]
	StoreWriteConflict(String),

	#[error("Invalid input: {0}")]
	InvalidInput(String),

	#[error("A sync is already in progress")]
	SyncInProgress,
}

impl From<OpenAlexError> for SyncError {
	fn from(err: OpenAlexError) -> Self {
		let message = err.to_string();
		match err {
			OpenAlexError::InvalidRequest(_) => SyncError::InvalidInput(message),
			OpenAlexError::Transport(_) => SyncError::UpstreamUnavailable(message),
			OpenAlexError::Status { .. } | OpenAlexError::MalformedBody { .. } => {
				SyncError::UpstreamResponseError(message)
			}
			OpenAlexError::Schema { .. } => SyncError::DeserializationError(message),
		}
	}
}

impl From<SheetsError> for SyncError {
	fn from(err: SheetsError) -> Self {
		let message = err.to_string();
		match err {
			SheetsError::Transport(_) | SheetsError::Status { .. } | SheetsError::InvalidUrl(_) => {
				SyncError::StoreUnavailable(message)
			}
			SheetsError::Conflict { .. } | SheetsError::Decode { .. } | SheetsError::InvalidRange(_) => {
				SyncError::StoreWriteConflict(message)
			}
		}
	}
}

/// Opaque id of a source venue, e.g. `S137773608`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JournalId(String);

impl JournalId {
	/// Trimmed id; blank ids are rejected.
	pub fn new(id: impl AsRef<str>) -> Result<Self, SyncError> {
		let id = id.as_ref().trim();
		if id.is_empty() {
			return Err(SyncError::InvalidInput("journal id is blank".to_string()));
		}
		Ok(Self(id.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for JournalId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
