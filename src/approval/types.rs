//! Rows of the approval sheet.

use crate::openalex::Work;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Column titles of row 1.
pub const HEADER: [&str; 7] = [
	"Article ID",
	"Title",
	"Publication Date",
	"DOI",
	"Abstract",
	"Status",
	"Comments",
];

/// Rows shorter than this (id through status) carry no decision and are skipped.
pub const MIN_COLUMNS: usize = 6;

const STATUS_COLUMN: usize = 5;

/// Review decision recorded in the status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApprovalStatus {
	Pending,
	Approved,
	Rejected,
}

impl ApprovalStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			ApprovalStatus::Pending => "Pending",
			ApprovalStatus::Approved => "Approved",
			ApprovalStatus::Rejected => "Rejected",
		}
	}
}

impl fmt::Display for ApprovalStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ApprovalStatus {
	type Err = String;

	/// Cell values are matched exactly, the way the review dropdown writes them.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"Pending" => Ok(ApprovalStatus::Pending),
			"Approved" => Ok(ApprovalStatus::Approved),
			"Rejected" => Ok(ApprovalStatus::Rejected),
			other => Err(format!("unknown approval status {:?}", other)),
		}
	}
}

/// One data row of the approval sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalRecord {
	pub id: String,
	pub title: String,
	pub publication_date: Option<NaiveDate>,
	pub doi: Option<String>,
	pub abstract_text: Option<String>,
	/// `None` when a reviewer typed something outside the allowed values.
	pub status: Option<ApprovalStatus>,
	pub comment: String,
}

impl ApprovalRecord {
	/// New row for a freshly discovered work: status `Pending`, no comment.
	pub fn from_work(work: &Work) -> Self {
		Self {
			id: work.id.clone(),
			title: work.title.clone(),
			publication_date: work.publication_date,
			doi: work.doi.clone(),
			abstract_text: work.abstract_plain(),
			status: Some(ApprovalStatus::Pending),
			comment: String::new(),
		}
	}

	/// Parse a row read back from the sheet. Returns `None` for rows too short to hold a status.
	pub fn from_row(row: &[String]) -> Option<Self> {
		if row.len() < MIN_COLUMNS {
			return None;
		}

		let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or_default();
		let optional = |i: usize| Some(cell(i).to_string()).filter(|v| !v.is_empty());

		Some(Self {
			id: cell(0).to_string(),
			title: cell(1).to_string(),
			publication_date: NaiveDate::parse_from_str(cell(2), "%Y-%m-%d").ok(),
			doi: optional(3),
			abstract_text: optional(4),
			status: cell(STATUS_COLUMN).parse().ok(),
			comment: cell(6).to_string(),
		})
	}

	pub fn to_row(&self) -> Vec<String> {
		vec![
			self.id.clone(),
			self.title.clone(),
			self.publication_date
				.map(|d| d.format("%Y-%m-%d").to_string())
				.unwrap_or_default(),
			self.doi.clone().unwrap_or_default(),
			self.abstract_text.clone().unwrap_or_default(),
			self.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
			self.comment.clone(),
		]
	}

	pub fn is_approved(&self) -> bool {
		self.status == Some(ApprovalStatus::Approved)
	}
}

/// Ids of the works currently marked approved. Rebuilt from the sheet on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalIndex {
	ids: HashSet<String>,
}

impl ApprovalIndex {
	pub fn contains(&self, id: &str) -> bool {
		self.ids.contains(id)
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}
}

impl<S: Into<String>> FromIterator<S> for ApprovalIndex {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self {
			ids: iter.into_iter().map(Into::into).collect(),
		}
	}
}

/// Outcome of an append.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppendResult {
	/// Number of data rows written.
	pub appended: usize,
	/// Range the store reported as written, if any rows were written.
	pub updated_range: Option<String>,
}
