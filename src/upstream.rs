//! HTTP access to the identity provider's admin API.

// crates.io
use http::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use url::Url;
// self
use crate::{
	_prelude::*,
	normalize::{RawClient, RawClientDetail},
};

/// Envelope wrapping the clients collection response.
#[derive(Debug, Default, Deserialize)]
pub struct ClientListEnvelope {
	/// Raw client records.
	#[serde(default)]
	pub data: Vec<RawClient>,
}

/// Retrieve the full client list from the collection endpoint.
///
/// Any non-success status is an [`Error::HttpStatus`]; the response body is captured
/// best-effort for diagnostics. Malformed JSON surfaces as a decode error of the
/// same severity.
pub async fn fetch_client_list(
	client: &Client,
	url: Url,
	headers: &HeaderMap,
) -> Result<Vec<RawClient>> {
	let start = Instant::now();
	let response = client.get(url.clone()).headers(headers.clone()).send().await?;
	let status = response.status();

	if !status.is_success() {
		let body = response.text().await.ok();

		return Err(Error::HttpStatus { status, url, body });
	}

	let envelope = response.json::<ClientListEnvelope>().await?;

	tracing::debug!(
		%url,
		%status,
		count = envelope.data.len(),
		elapsed = ?start.elapsed(),
		"client list fetch complete"
	);

	Ok(envelope.data)
}

/// Retrieve one client's detail record from the per-client endpoint.
pub async fn fetch_client_detail(
	client: &Client,
	url: Url,
	headers: &HeaderMap,
) -> Result<RawClientDetail> {
	let start = Instant::now();
	let response = client.get(url.clone()).headers(headers.clone()).send().await?;
	let status = response.status();

	if !status.is_success() {
		let body = response.text().await.ok();

		return Err(Error::HttpStatus { status, url, body });
	}

	let detail = response.json::<RawClientDetail>().await?;

	tracing::debug!(%url, %status, elapsed = ?start.elapsed(), "client detail fetch complete");

	Ok(detail)
}
