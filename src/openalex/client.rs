//!
//! HTTP client for the OpenAlex works API.
//!
//! The client holds one connection pool and its configuration. It is built once from
//! [`OpenAlexConfig`] and handed to whoever needs it. Every call returns a single page; callers that
//! want more pages ask for them explicitly.

use super::types::*;
use crate::config::{MAX_PER_PAGE, OpenAlexConfig, RetryConfig};
use crate::retry::with_retry;
use crate::openalex::WorkFilter;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

const ID_PREFIX: &str = "https://openalex.org/";

/// OpenAlex works API client
#[derive(Clone)]
pub struct OpenAlexClient {
	/// The underlying HTTP client.
	http_client: Client,
	/// API root, e.g. `https://api.openalex.org`.
	base_url: String,
	/// Optional contact address for the polite pool.
	mailto: Option<String>,
	retry: RetryConfig,
}

impl OpenAlexClient {
	/// Create a new client from configuration.
	pub fn new(config: &OpenAlexConfig) -> Result<Self, OpenAlexError> {
		let http_client = Client::builder()
			.timeout(Duration::from_secs(config.timeout_secs))
			.build()?;

		Ok(Self {
			http_client,
			base_url: config.base_url.trim_end_matches('/').to_string(),
			mailto: config.mailto.clone(),
			retry: config.retry.clone(),
		})
	}

	/// Search works.
	///
	/// # Arguments
	/// * `query` - Free-text query; an empty string sends no `search` parameter.
	/// * `filter` - Filter expression; `None` means no restriction beyond the query.
	/// * `page` - 1-based page number.
	/// * `per_page` - Page size, between 1 and 200.
	///
	/// # Returns
	/// One page of results together with the total match count.
	pub async fn search_works(
		&self,
		query: &str,
		filter: Option<&str>,
		page: u32,
		per_page: u32,
	) -> Result<WorksResponse, OpenAlexError> {
		if page < 1 {
			return Err(OpenAlexError::InvalidRequest(format!(
				"page must be at least 1, got {}",
				page
			)));
		}
		if per_page < 1 || per_page > MAX_PER_PAGE {
			return Err(OpenAlexError::InvalidRequest(format!(
				"per_page must be between 1 and {}, got {}",
				MAX_PER_PAGE, per_page
			)));
		}

		let mut params: Vec<(&str, String)> = Vec::new();
		if !query.is_empty() {
			params.push(("search", query.to_string()));
		}
		if let Some(filter) = filter.filter(|f| !f.is_empty()) {
			params.push(("filter", filter.to_string()));
		}
		params.push(("page", page.to_string()));
		params.push(("per-page", per_page.to_string()));

		debug!(
			"Searching works: query={:?} filter={:?} page={} per_page={}",
			query, filter, page, per_page
		);

		let endpoint = format!("{}/works", self.base_url);
		let response: WorksResponse = self.get_json(&endpoint, params).await?;

		info!(
			"Works search returned {} of {} results (page {})",
			response.results.len(),
			response.meta.count,
			page
		);
		Ok(response)
	}

	/// Fetch a single work. Accepts either the bare key (`W123`) or the full id URL.
	pub async fn get_work(&self, id: &str) -> Result<Work, OpenAlexError> {
		let key = work_key(id);
		if key.is_empty() {
			return Err(OpenAlexError::InvalidRequest("work id is empty".to_string()));
		}

		let endpoint = format!("{}/works/{}", self.base_url, key);
		let work: Work = self.get_json(&endpoint, Vec::new()).await?;
		debug!("Fetched work {}: {}", work.id, work.title);
		Ok(work)
	}

	/// List works by one author.
	pub async fn works_by_author(
		&self,
		author_id: &str,
		page: u32,
		per_page: u32,
	) -> Result<WorksResponse, OpenAlexError> {
		let filter = WorkFilter::new().author(work_key(author_id)).to_string();
		self.search_works("", Some(&filter), page, per_page).await
	}

	async fn get_json<T: DeserializeOwned>(
		&self,
		endpoint: &str,
		mut params: Vec<(&str, String)>,
	) -> Result<T, OpenAlexError> {
		if let Some(mailto) = &self.mailto {
			params.push(("mailto", mailto.clone()));
		}

		let body = with_retry(&self.retry, endpoint, || self.fetch_text(endpoint, &params)).await?;

		// A body that is not JSON at all is a bad response; JSON of the wrong shape is a schema error.
		let value: serde_json::Value =
			serde_json::from_str(&body).map_err(|source| OpenAlexError::MalformedBody {
				endpoint: endpoint.to_string(),
				source,
			})?;
		serde_json::from_value(value).map_err(|source| OpenAlexError::Schema {
			endpoint: endpoint.to_string(),
			source,
		})
	}

	async fn fetch_text(
		&self,
		endpoint: &str,
		params: &[(&str, String)],
	) -> Result<String, OpenAlexError> {
		let response = self
			.http_client
			.get(endpoint)
			.query(params)
			.header("Accept", "application/json")
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(OpenAlexError::Status {
				endpoint: endpoint.to_string(),
				status: status.as_u16(),
				body,
			});
		}

		Ok(response.text().await?)
	}
}

/// Strip the `https://openalex.org/` prefix from an entity id.
pub fn work_key(id: &str) -> &str {
	let id = id.trim();
	id.strip_prefix(ID_PREFIX).unwrap_or(id)
}
