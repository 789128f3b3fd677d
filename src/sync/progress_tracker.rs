//! Progress tracking for a sync run.
//!
//! The `SyncProgressTracker` collects one `JournalReport` per processed journal, keeps the running
//! total of appended works, and produces the final `SyncReport`.

use crate::sync::types::{JournalId, SyncError};
use crate::sync::window::SyncWindow;
use serde::Serialize;
use tracing::{info, warn};

/// Outcome for a single journal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JournalReport {
	pub journal_id: String,
	/// Works returned by the search service.
	pub fetched: usize,
	/// Works dropped because they were already approved.
	pub already_approved: usize,
	/// Rows written to the approval sheet.
	pub appended: usize,
	/// Set when the journal failed and the run continued.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub failure: Option<String>,
}

impl JournalReport {
	pub fn failed(journal_id: &JournalId, err: &SyncError) -> Self {
		Self {
			journal_id: journal_id.to_string(),
			failure: Some(err.to_string()),
			..Self::default()
		}
	}
}

/// Result of a completed sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
	pub window: SyncWindow,
	/// Total works appended across all journals.
	#[serde(rename = "appendedCount")]
	pub total_appended: usize,
	pub journals: Vec<JournalReport>,
}

impl SyncReport {
	pub fn failed_journals(&self) -> usize {
		self.journals.iter().filter(|j| j.failure.is_some()).count()
	}

	/// Get a human-readable summary of the run
	pub fn summary(&self) -> String {
		let failed = self.failed_journals();
		format!(
			"Sync {}: {} new works appended across {} journals{}",
			self.window,
			self.total_appended,
			self.journals.len(),
			if failed == 0 {
				String::new()
			} else {
				format!(" ({} failed)", failed)
			}
		)
	}
}

/// Service for tracking the progress of one sync run
#[derive(Debug, Clone)]
pub struct SyncProgressTracker {
	window: SyncWindow,
	journals: Vec<JournalReport>,
	total_appended: usize,
	expected_journals: usize,
}

impl SyncProgressTracker {
	/// Create a new tracker for a run over `expected_journals` journals.
	pub fn new(window: SyncWindow, expected_journals: usize) -> Self {
		Self {
			window,
			journals: Vec::with_capacity(expected_journals),
			total_appended: 0,
			expected_journals,
		}
	}

	/// Record the outcome of one journal
	pub fn record(&mut self, report: JournalReport) {
		self.total_appended += report.appended;

		match &report.failure {
			Some(failure) => warn!(
				"Journal {} failed ({}/{}): {}",
				report.journal_id,
				self.journals.len() + 1,
				self.expected_journals,
				failure
			),
			None => info!(
				"Journal {} done ({}/{}): fetched {}, already approved {}, appended {}",
				report.journal_id,
				self.journals.len() + 1,
				self.expected_journals,
				report.fetched,
				report.already_approved,
				report.appended
			),
		}

		self.journals.push(report);
	}

	pub fn finish(self) -> SyncReport {
		SyncReport {
			window: self.window,
			total_appended: self.total_appended,
			journals: self.journals,
		}
	}
}
