//! Outbound authentication header resolution.
//!
//! Headers are derived either from a process-wide static API key or from a bearer
//! token carried in the caller's session state. The static credential takes
//! priority and never consults the session.

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::Deserialize;
// self
use crate::{_prelude::*, config::CatalogConfig};

/// Session key expected to hold the serialized auth token payload.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Header carrying the static service credential.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Opaque per-request key/value store, standing in for the portal's cookie jar.
#[derive(Clone, Debug, Default)]
pub struct SessionState(std::collections::HashMap<String, String>);
impl SessionState {
	/// Create an empty session.
	pub fn new() -> Self {
		Self::default()
	}

	/// Retrieve a session value.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Store a session value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.0.insert(key.into(), value.into());
	}
}
impl<K, V> FromIterator<(K, V)> for SessionState
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

#[derive(Debug, Deserialize)]
struct AuthTokenPayload {
	access_token: Option<String>,
}

/// Build the headers for outbound admin API calls.
///
/// Always includes `Accept` and `Content-Type`. Attaches the static API key when one
/// is configured; otherwise expects the session's [`AUTH_TOKEN_KEY`] field to hold a
/// JSON object with an `access_token` and attaches it as a bearer credential.
pub fn resolve_headers(config: &CatalogConfig, session: &SessionState) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

	if let Some(api_key) = &config.api_key {
		let value = HeaderValue::from_str(api_key).map_err(|_| {
			Error::Authentication("Configured API key is not a valid header value.".into())
		})?;

		headers.insert(API_KEY_HEADER, value);
		tracing::debug!("using static api key credential");

		return Ok(headers);
	}

	let raw = session
		.get(AUTH_TOKEN_KEY)
		.ok_or_else(|| Error::Authentication("No authentication method available.".into()))?;
	let payload: AuthTokenPayload = serde_json::from_str(raw)
		.map_err(|_| Error::Authentication("Invalid auth token format.".into()))?;
	let access_token = payload
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or_else(|| Error::Authentication("Auth token carries no access_token.".into()))?;
	let value = HeaderValue::from_str(&format!("Bearer {access_token}"))
		.map_err(|_| Error::Authentication("Access token is not a valid header value.".into()))?;

	headers.insert(AUTHORIZATION, value);
	tracing::debug!("using session access token credential");

	Ok(headers)
}
