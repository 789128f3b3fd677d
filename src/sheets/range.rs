//! A1-notation ranges (`A1:G1`, `A:A`, `'Review'!A5:G7`).

use std::fmt;
use std::str::FromStr;

use super::SheetsError;

/// One corner of a range. `row` is `None` for whole-column references like `A:A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
	/// 1-based column index (`A` = 1).
	pub column: u32,
	/// 1-based row index.
	pub row: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
	pub sheet: Option<String>,
	pub start: CellRef,
	pub end: CellRef,
}

impl A1Range {
	/// Whole columns, e.g. `A:G`.
	pub fn columns(first: u32, last: u32) -> Self {
		Self {
			sheet: None,
			start: CellRef {
				column: first,
				row: None,
			},
			end: CellRef {
				column: last,
				row: None,
			},
		}
	}

	/// A bounded block, e.g. `A5:G7`.
	pub fn block(first_column: u32, first_row: u32, last_column: u32, last_row: u32) -> Self {
		Self {
			sheet: None,
			start: CellRef {
				column: first_column,
				row: Some(first_row),
			},
			end: CellRef {
				column: last_column,
				row: Some(last_row),
			},
		}
	}

	pub fn on_sheet(mut self, sheet: Option<&str>) -> Self {
		self.sheet = sheet.map(str::to_string);
		self
	}

	/// First row covered by the range.
	pub fn first_row(&self) -> u32 {
		self.start.row.unwrap_or(1)
	}

	/// Last row covered by the range, `None` when unbounded.
	pub fn last_row(&self) -> Option<u32> {
		match (self.start.row, self.end.row) {
			(_, Some(end)) => Some(end),
			(Some(start), None) if self.start == self.end => Some(start),
			_ => None,
		}
	}

	pub fn column_span(&self) -> (u32, u32) {
		(self.start.column, self.end.column)
	}
}

impl fmt::Display for A1Range {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(sheet) = &self.sheet {
			write!(f, "'{}'!", sheet.replace('\'', "''"))?;
		}
		write_cell(f, &self.start)?;
		// Whole-column references always need both ends (`A:A`, never `A`).
		if self.start != self.end || self.start.row.is_none() {
			f.write_str(":")?;
			write_cell(f, &self.end)?;
		}
		Ok(())
	}
}

impl FromStr for A1Range {
	type Err = SheetsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || SheetsError::InvalidRange(s.to_string());

		let (sheet, cells) = match s.rsplit_once('!') {
			Some((sheet, cells)) => {
				let sheet = sheet
					.strip_prefix('\'')
					.and_then(|t| t.strip_suffix('\''))
					.map(|t| t.replace("''", "'"))
					.unwrap_or_else(|| sheet.to_string());
				(Some(sheet), cells)
			}
			None => (None, s),
		};

		let (start, end) = match cells.split_once(':') {
			Some((a, b)) => (parse_cell(a).ok_or_else(invalid)?, parse_cell(b).ok_or_else(invalid)?),
			None => {
				let cell = parse_cell(cells).ok_or_else(invalid)?;
				(cell, cell)
			}
		};
		if end.column < start.column {
			return Err(invalid());
		}

		Ok(Self { sheet, start, end })
	}
}

/// Column letters for a 1-based index (`1` -> `A`, `27` -> `AA`).
pub fn column_letters(mut column: u32) -> String {
	let mut letters = Vec::new();
	while column > 0 {
		let rem = (column - 1) % 26;
		letters.push(char::from(b'A' + rem as u8));
		column = (column - 1) / 26;
	}
	letters.iter().rev().collect()
}

fn write_cell(f: &mut fmt::Formatter<'_>, cell: &CellRef) -> fmt::Result {
	f.write_str(&column_letters(cell.column))?;
	if let Some(row) = cell.row {
		write!(f, "{}", row)?;
	}
	Ok(())
}

fn parse_cell(s: &str) -> Option<CellRef> {
	let s = s.trim();
	let split = s.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(s.len());
	let (letters, digits) = s.split_at(split);
	if letters.is_empty() {
		return None;
	}

	let mut column = 0u32;
	for c in letters.chars() {
		let value = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
		column = column.checked_mul(26)?.checked_add(value)?;
	}

	let row = if digits.is_empty() {
		None
	} else {
		let row: u32 = digits.parse().ok()?;
		if row == 0 {
			return None;
		}
		Some(row)
	};

	Some(CellRef { column, row })
}
