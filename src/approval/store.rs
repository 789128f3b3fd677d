//!
//! Approval sheet adapter.
//!
//! Reads the decisions reviewers recorded and appends newly discovered works below the last
//! populated row. The store itself gives no single-writer guarantee, so an append re-reads its
//! target block right before writing and refuses to overwrite anything it finds there.

use super::types::*;
use crate::openalex::Work;
use crate::sheets::{A1Range, SheetsError};
use crate::sync::repositories::ValueRangeStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

const COLUMNS: u32 = HEADER.len() as u32;

pub struct ApprovalStore {
	values: Box<dyn ValueRangeStore>,
	/// Tab to address; `None` means the first tab.
	sheet_name: Option<String>,
	/// Set once the header row is known to exist.
	headers_ready: AtomicBool,
}

impl ApprovalStore {
	/// Create a new approval store on top of a value-range store.
	///
	/// # Arguments
	/// * `values` - Backing store (REST client or in-memory sheet).
	/// * `sheet_name` - Optional tab name prefixed to every range.
	pub fn new(values: Box<dyn ValueRangeStore>, sheet_name: Option<String>) -> Self {
		Self {
			values,
			sheet_name,
			headers_ready: AtomicBool::new(false),
		}
	}

	fn range(&self, range: A1Range) -> A1Range {
		range.on_sheet(self.sheet_name.as_deref())
	}

	/// All data rows that carry at least an id and a status column.
	pub async fn load_records(&self) -> Result<Vec<ApprovalRecord>, SheetsError> {
		let rows = self
			.values
			.get_values(&self.range(A1Range::columns(1, COLUMNS)))
			.await?;

		let mut records = Vec::with_capacity(rows.len().saturating_sub(1));
		for (offset, row) in rows.iter().enumerate().skip(1) {
			match ApprovalRecord::from_row(row) {
				Some(record) => records.push(record),
				None if row.is_empty() => {}
				None => warn!(
					"Skipping row {}: {} of {} columns populated",
					offset + 1,
					row.len(),
					MIN_COLUMNS
				),
			}
		}

		debug!("Loaded {} approval records", records.len());
		Ok(records)
	}

	/// Ids whose status is `Approved`.
	pub async fn load_approved_ids(&self) -> Result<ApprovalIndex, SheetsError> {
		let index: ApprovalIndex = self
			.load_records()
			.await?
			.into_iter()
			.filter(ApprovalRecord::is_approved)
			.map(|record| record.id)
			.collect();

		info!("Found {} approved articles", index.len());
		Ok(index)
	}

	/// Approved ids in sheet order, first occurrence only.
	pub async fn approved_ids_in_order(&self) -> Result<Vec<String>, SheetsError> {
		let mut seen = HashSet::new();
		Ok(self
			.load_records()
			.await?
			.into_iter()
			.filter(ApprovalRecord::is_approved)
			.filter_map(|record| seen.insert(record.id.clone()).then_some(record.id))
			.collect())
	}

	/// Write the header row if row 1 is empty. Checked once per store value.
	pub async fn ensure_headers(&self) -> Result<(), SheetsError> {
		if self.headers_ready.load(Ordering::Acquire) {
			return Ok(());
		}

		let range = self.range(A1Range::block(1, 1, COLUMNS, 1));
		let existing = self.values.get_values(&range).await?;
		if existing.iter().all(|row| row.is_empty()) {
			let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
			self.values.update_values(&range, &[header]).await?;
			info!("Initialized sheet with headers");
		}

		self.headers_ready.store(true, Ordering::Release);
		Ok(())
	}

	/// Append works as `Pending` rows after the last populated row.
	///
	/// An empty list still makes sure the header row exists.
	///
	/// # Returns
	/// The number of rows written and the range the store reported.
	pub async fn append(&self, works: &[Work]) -> Result<AppendResult, SheetsError> {
		self.ensure_headers().await?;
		if works.is_empty() {
			return Ok(AppendResult::default());
		}

		let id_column = self
			.values
			.get_values(&self.range(A1Range::columns(1, 1)))
			.await?;
		let last_row = id_column.len().max(1) as u32;
		let count = works.len() as u32;
		let target = self.range(A1Range::block(1, last_row + 1, COLUMNS, last_row + count));
		debug!("Last populated row is {}, writing to {}", last_row, target);

		let occupied = self.values.get_values(&target).await?;
		if !occupied.is_empty() {
			return Err(SheetsError::Conflict {
				range: target.to_string(),
				detail: format!("{} rows were written concurrently", occupied.len()),
			});
		}

		let rows: Vec<Vec<String>> = works
			.iter()
			.map(|work| ApprovalRecord::from_work(work).to_row())
			.collect();
		let summary = self.values.update_values(&target, &rows).await?;
		if summary.updated_rows as usize != rows.len() {
			return Err(SheetsError::Conflict {
				range: target.to_string(),
				detail: format!(
					"store reported {} rows updated, sent {}",
					summary.updated_rows,
					rows.len()
				),
			});
		}

		if let Some(reported) = &summary.updated_range {
			let written: A1Range = reported.parse()?;
			if written.first_row() != target.first_row() {
				return Err(SheetsError::Conflict {
					range: target.to_string(),
					detail: format!("store reported the write at {}", reported),
				});
			}
		}

		let updated_range = summary.updated_range.unwrap_or_else(|| target.to_string());
		info!("Appended {} articles at {}", rows.len(), updated_range);
		Ok(AppendResult {
			appended: rows.len(),
			updated_range: Some(updated_range),
		})
	}
}
