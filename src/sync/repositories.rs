use crate::openalex::{OpenAlexClient, OpenAlexError, Work, WorksResponse};
use crate::sheets::{A1Range, SheetsError, UpdateSummary};

/// Paginated, filterable source of works
#[async_trait::async_trait]
pub trait WorkSearch: Send + Sync {
	/// One page of works matching `query` and `filter`.
	async fn search(
		&self,
		query: &str,
		filter: Option<&str>,
		page: u32,
		per_page: u32,
	) -> Result<WorksResponse, OpenAlexError>;

	/// A single work by id.
	async fn get_work(&self, id: &str) -> Result<Work, OpenAlexError>;
}

/// Rectangular value ranges of a spreadsheet
#[async_trait::async_trait]
pub trait ValueRangeStore: Send + Sync {
	/// Rows of `range`, with trailing empty cells and rows dropped.
	async fn get_values(&self, range: &A1Range) -> Result<Vec<Vec<String>>, SheetsError>;

	/// Overwrite `range` starting at its top-left cell. Values are stored as given.
	async fn update_values(
		&self,
		range: &A1Range,
		rows: &[Vec<String>],
	) -> Result<UpdateSummary, SheetsError>;
}

#[async_trait::async_trait]
impl WorkSearch for OpenAlexClient {
	async fn search(
		&self,
		query: &str,
		filter: Option<&str>,
		page: u32,
		per_page: u32,
	) -> Result<WorksResponse, OpenAlexError> {
		self.search_works(query, filter, page, per_page).await
	}

	async fn get_work(&self, id: &str) -> Result<Work, OpenAlexError> {
		OpenAlexClient::get_work(self, id).await
	}
}
