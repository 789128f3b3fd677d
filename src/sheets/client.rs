//!
//! REST client for the spreadsheet values API.
//!
//! Reads use `GET /v4/spreadsheets/{id}/values/{range}`, writes use
//! `PUT /v4/spreadsheets/{id}/values/{range}?valueInputOption=RAW`, so values are stored verbatim
//! and never evaluated as formulas.

use super::{A1Range, SheetsError, UpdateSummary};
use crate::config::{RetryConfig, SheetsConfig};
use crate::retry::with_retry;
use crate::sync::repositories::ValueRangeStore;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ValueRangeBody {
	#[serde(default)]
	values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesBody {
	updated_range: Option<String>,
	#[serde(default)]
	updated_rows: u32,
}

/// Spreadsheet values client bound to one spreadsheet.
#[derive(Clone)]
pub struct SheetsClient {
	http_client: Client,
	base_url: String,
	spreadsheet_id: String,
	access_token: String,
	retry: RetryConfig,
}

impl SheetsClient {
	pub fn new(config: &SheetsConfig) -> Result<Self, SheetsError> {
		let http_client = Client::builder()
			.timeout(Duration::from_secs(config.timeout_secs))
			.build()?;

		Ok(Self {
			http_client,
			base_url: config.base_url.clone(),
			spreadsheet_id: config.spreadsheet_id.clone(),
			access_token: config.access_token.clone(),
			retry: config.retry.clone(),
		})
	}

	fn values_url(&self, range: &A1Range) -> Result<Url, SheetsError> {
		let mut url =
			Url::parse(&self.base_url).map_err(|e| SheetsError::InvalidUrl(e.to_string()))?;
		let range = range.to_string();
		url.path_segments_mut()
			.map_err(|_| SheetsError::InvalidUrl(self.base_url.clone()))?
			.pop_if_empty()
			.extend([
				"v4",
				"spreadsheets",
				self.spreadsheet_id.as_str(),
				"values",
				range.as_str(),
			]);
		Ok(url)
	}

	async fn send(
		&self,
		request: reqwest::RequestBuilder,
		range: &A1Range,
	) -> Result<String, SheetsError> {
		let response = request.bearer_auth(&self.access_token).send().await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(SheetsError::Status {
				range: range.to_string(),
				status: status.as_u16(),
				body,
			});
		}

		Ok(response.text().await?)
	}

	fn decode<T: serde::de::DeserializeOwned>(body: &str, range: &A1Range) -> Result<T, SheetsError> {
		serde_json::from_str(body).map_err(|source| SheetsError::Decode {
			range: range.to_string(),
			source,
		})
	}
}

#[async_trait::async_trait]
impl ValueRangeStore for SheetsClient {
	async fn get_values(&self, range: &A1Range) -> Result<Vec<Vec<String>>, SheetsError> {
		let url = self.values_url(range)?;
		debug!("Reading range {}", range);

		let body = with_retry(&self.retry, "sheet read", || {
			self.send(self.http_client.get(url.clone()), range)
		})
		.await?;
		let parsed: ValueRangeBody = Self::decode(&body, range)?;

		Ok(parsed
			.values
			.into_iter()
			.map(|row| row.into_iter().map(cell_text).collect())
			.collect())
	}

	async fn update_values(
		&self,
		range: &A1Range,
		rows: &[Vec<String>],
	) -> Result<UpdateSummary, SheetsError> {
		let url = self.values_url(range)?;
		let payload = json!({
			"range": range.to_string(),
			"majorDimension": "ROWS",
			"values": rows,
		});
		debug!("Writing {} rows to range {}", rows.len(), range);

		let body = with_retry(&self.retry, "sheet write", || {
			self.send(
				self.http_client
					.put(url.clone())
					.query(&[("valueInputOption", "RAW")])
					.json(&payload),
				range,
			)
		})
		.await?;
		let parsed: UpdateValuesBody = Self::decode(&body, range)?;

		Ok(UpdateSummary {
			updated_range: parsed.updated_range,
			updated_rows: parsed.updated_rows,
		})
	}
}

fn cell_text(value: Value) -> String {
	match value {
		Value::String(s) => s,
		Value::Null => String::new(),
		other => other.to_string(),
	}
}
