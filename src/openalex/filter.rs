//! Filter expressions for the works endpoint.
//!
//! The API takes `key:value` clauses joined with commas, and all clauses must hold.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkFilter {
	clauses: Vec<(String, String)>,
}

impl WorkFilter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Restrict to works whose primary venue is `source_id`.
	pub fn source(self, source_id: &str) -> Self {
		self.with("primary_location.source.id", source_id)
	}

	/// Restrict to works published on or after `date`.
	pub fn from_publication_date(self, date: NaiveDate) -> Self {
		self.with("from_publication_date", date.format("%Y-%m-%d").to_string())
	}

	pub fn author(self, author_id: &str) -> Self {
		self.with("author.id", author_id)
	}

	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.clauses.push((key.into(), value.into()));
		self
	}
}

impl fmt::Display for WorkFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, (key, value)) in self.clauses.iter().enumerate() {
			if i > 0 {
				f.write_str(",")?;
			}
			write!(f, "{}:{}", key, value)?;
		}
		Ok(())
	}
}
