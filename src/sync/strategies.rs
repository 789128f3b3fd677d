use crate::openalex::{OpenAlexError, Work};
use crate::sync::repositories::WorkSearch;
use serde::Deserialize;
use tracing::debug;

/// How many result pages to read per journal
#[async_trait::async_trait]
pub trait PageStrategy: Send + Sync {
	/// Fetch the candidate works for one filter expression.
	async fn fetch(
		&self,
		search: &dyn WorkSearch,
		filter: &str,
		per_page: u32,
	) -> Result<Vec<Work>, OpenAlexError>;

	/// Get the name of this strategy
	fn name(&self) -> &'static str;
}

/// Paging configuration, `[sync.pages]` in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PagingConfig {
	/// Page 1 only.
	#[default]
	First,
	/// Every page, up to `max_pages`.
	All { max_pages: u32 },
}

impl PagingConfig {
	pub fn strategy(&self) -> Box<dyn PageStrategy> {
		match self {
			PagingConfig::First => Box::new(FirstPage),
			PagingConfig::All { max_pages } => Box::new(AllPages::new(*max_pages)),
		}
	}
}

/// Strategy that reads only the first page of results
pub struct FirstPage;

#[async_trait::async_trait]
impl PageStrategy for FirstPage {
	async fn fetch(
		&self,
		search: &dyn WorkSearch,
		filter: &str,
		per_page: u32,
	) -> Result<Vec<Work>, OpenAlexError> {
		let response = search.search("", Some(filter), 1, per_page).await?;
		if response.meta.count > response.results.len() as u64 {
			debug!(
				"Read first page only: {} of {} matching works",
				response.results.len(),
				response.meta.count
			);
		}
		Ok(response.results)
	}

	fn name(&self) -> &'static str {
		"FirstPage"
	}
}

/// Strategy that keeps reading pages until the result set is exhausted
pub struct AllPages {
	max_pages: u32,
}

impl AllPages {
	pub fn new(max_pages: u32) -> Self {
		Self {
			max_pages: max_pages.max(1),
		}
	}
}

#[async_trait::async_trait]
impl PageStrategy for AllPages {
	async fn fetch(
		&self,
		search: &dyn WorkSearch,
		filter: &str,
		per_page: u32,
	) -> Result<Vec<Work>, OpenAlexError> {
		let mut works = Vec::new();
		let mut page = 1;

		loop {
			let response = search.search("", Some(filter), page, per_page).await?;
			let received = response.results.len();
			works.extend(response.results);
			debug!(
				"Page {}: {} works ({} of {} so far)",
				page,
				received,
				works.len(),
				response.meta.count
			);

			if received == 0 || works.len() as u64 >= response.meta.count || page >= self.max_pages {
				break;
			}
			page += 1;
		}

		Ok(works)
	}

	fn name(&self) -> &'static str {
		"AllPages"
	}
}
