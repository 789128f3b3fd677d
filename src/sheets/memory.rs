//! In-memory grid with spreadsheet read semantics.

use super::{A1Range, SheetsError, UpdateSummary};
use crate::sync::repositories::ValueRangeStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// A single-tab sheet held in memory. Clones share the same grid.
#[derive(Clone, Default)]
pub struct MemorySheet {
	rows: Arc<Mutex<Vec<Vec<String>>>>,
	updates: Arc<AtomicUsize>,
}

impl MemorySheet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
		Self {
			rows: Arc::new(Mutex::new(rows)),
			updates: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// Snapshot of the grid.
	pub async fn rows(&self) -> Vec<Vec<String>> {
		self.rows.lock().await.clone()
	}

	/// Number of successful `update_values` calls.
	pub fn update_count(&self) -> usize {
		self.updates.load(Ordering::SeqCst)
	}
}

#[async_trait::async_trait]
impl ValueRangeStore for MemorySheet {
	async fn get_values(&self, range: &A1Range) -> Result<Vec<Vec<String>>, SheetsError> {
		let grid = self.rows.lock().await;
		let (first_col, last_col) = range.column_span();
		let first_row = range.first_row().max(1) as usize;
		let last_row = range
			.last_row()
			.map(|r| r as usize)
			.unwrap_or(grid.len())
			.min(grid.len());

		let mut out: Vec<Vec<String>> = Vec::new();
		for row_index in first_row..=last_row {
			let Some(row) = grid.get(row_index - 1) else {
				break;
			};
			let mut cells: Vec<String> = row
				.iter()
				.skip(first_col as usize - 1)
				.take((last_col - first_col + 1) as usize)
				.cloned()
				.collect();
			while cells.last().is_some_and(|c| c.is_empty()) {
				cells.pop();
			}
			out.push(cells);
		}
		while out.last().is_some_and(|r| r.is_empty()) {
			out.pop();
		}
		Ok(out)
	}

	async fn update_values(
		&self,
		range: &A1Range,
		rows: &[Vec<String>],
	) -> Result<UpdateSummary, SheetsError> {
		let (first_col, last_col) = range.column_span();
		let width = (last_col - first_col + 1) as usize;
		let first_row = range.first_row().max(1) as usize;

		if let Some(last_row) = range.last_row() {
			let capacity = (last_row as usize + 1).saturating_sub(first_row);
			if rows.len() > capacity {
				return Err(SheetsError::InvalidRange(format!(
					"{} rows do not fit in {}",
					rows.len(),
					range
				)));
			}
		}
		if let Some(row) = rows.iter().find(|r| r.len() > width) {
			return Err(SheetsError::InvalidRange(format!(
				"{} cells do not fit in {}",
				row.len(),
				range
			)));
		}

		let mut grid = self.rows.lock().await;
		for (offset, values) in rows.iter().enumerate() {
			let row_index = first_row - 1 + offset;
			if grid.len() <= row_index {
				grid.resize_with(row_index + 1, Vec::new);
			}
			let row = &mut grid[row_index];
			let needed = first_col as usize - 1 + values.len();
			if row.len() < needed {
				row.resize(needed, String::new());
			}
			for (col_offset, value) in values.iter().enumerate() {
				row[first_col as usize - 1 + col_offset] = value.clone();
			}
		}
		self.updates.fetch_add(1, Ordering::SeqCst);

		let written = first_row + rows.len().saturating_sub(1);
		Ok(UpdateSummary {
			updated_range: Some(
				A1Range::block(first_col, first_row as u32, last_col, written as u32).to_string(),
			),
			updated_rows: rows.len() as u32,
		})
	}
}
