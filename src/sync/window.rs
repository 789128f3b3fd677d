//! Trailing publication-date window.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Dates `start..=end`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncWindow {
	pub start: NaiveDate,
	pub end: NaiveDate,
}

impl SyncWindow {
	/// The `days`-long window ending at `today`.
	pub fn trailing(today: NaiveDate, days: u32) -> Self {
		let start = today
			.checked_sub_days(Days::new(u64::from(days)))
			.unwrap_or(NaiveDate::MIN);
		Self { start, end: today }
	}
}

impl fmt::Display for SyncWindow {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}..={}", self.start, self.end)
	}
}
