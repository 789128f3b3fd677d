//! Types for the OpenAlex works API

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::retry::Transient;

/// A single scholarly work as returned by the works endpoint.
///
/// Unknown fields are ignored. Missing or null optional fields fall back to their defaults
/// (`cited_by_count = 0`, empty lists).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Work {
	/// Globally unique id, e.g. `https://openalex.org/W2741809807`.
	pub id: String,
	pub doi: Option<String>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub title: String,
	pub publication_year: Option<i32>,
	pub publication_date: Option<NaiveDate>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub cited_by_count: u64,
	#[serde(rename = "type")]
	pub work_type: Option<String>,
	pub primary_location: Option<Location>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub authorships: Vec<Authorship>,
	#[serde(rename = "abstract")]
	pub abstract_text: Option<String>,
	/// Word to positions map the API publishes instead of a plain abstract.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub abstract_inverted_index: Option<BTreeMap<String, Vec<usize>>>,
}

impl Work {
	/// Plain-text abstract, rebuilt from the inverted index when no plain abstract was sent.
	pub fn abstract_plain(&self) -> Option<String> {
		if let Some(text) = self.abstract_text.as_ref().filter(|t| !t.is_empty()) {
			return Some(text.clone());
		}

		let index = self.abstract_inverted_index.as_ref()?;
		let mut positioned: Vec<(usize, &str)> = index
			.iter()
			.flat_map(|(word, positions)| positions.iter().map(move |p| (*p, word.as_str())))
			.collect();
		if positioned.is_empty() {
			return None;
		}
		positioned.sort_by_key(|(position, _)| *position);

		Some(
			positioned
				.into_iter()
				.map(|(_, word)| word)
				.collect::<Vec<_>>()
				.join(" "),
		)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
	pub source: Option<Source>,
	pub version: Option<String>,
	pub license: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
	pub id: Option<String>,
	pub display_name: Option<String>,
	#[serde(rename = "type")]
	pub source_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authorship {
	pub author: Author,
	pub author_position: Option<String>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub institutions: Vec<Institution>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
	#[serde(default, deserialize_with = "null_as_default")]
	pub id: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Institution {
	pub id: Option<String>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub display_name: String,
	#[serde(rename = "type")]
	pub institution_type: Option<String>,
	pub country_code: Option<String>,
}

/// Paging metadata of a list response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
	/// Total number of works matching the query, across all pages.
	pub count: u64,
	/// Absent when cursor paging is used.
	pub page: Option<u32>,
	pub per_page: u32,
}

/// Envelope of a `/works` list response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorksResponse {
	pub meta: Meta,
	#[serde(default, deserialize_with = "null_as_default")]
	pub results: Vec<Work>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error types for OpenAlex requests
#[derive(Debug, thiserror::Error)]
pub enum OpenAlexError {
	#[error("Invalid request: {0}")]
	InvalidRequest(String),

	#[error("HTTP transport error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("HTTP error {status} from {endpoint}: {body}")]
	Status {
		endpoint: String,
		status: u16,
		body: String,
	},

	#[error("Malformed response body from {endpoint}: {source}")]
	MalformedBody {
		endpoint: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("Unexpected response schema from {endpoint}: {source}")]
	Schema {
		endpoint: String,
		#[source]
		source: serde_json::Error,
	},
}

impl Transient for OpenAlexError {
	fn is_transient(&self) -> bool {
		match self {
			OpenAlexError::Transport(_) => true,
			OpenAlexError::Status { status, .. } => *status == 429 || *status >= 500,
			_ => false,
		}
	}
}
