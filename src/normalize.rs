//! Normalization of heterogeneous upstream client shapes.
//!
//! The provider's API has gone through several schema generations; list and detail
//! endpoints have historically diverged, so each accepts its own set of legacy field
//! spellings. The fallback orders here are load-bearing: changing them changes
//! observable normalization output.

// crates.io
use serde::Deserialize;
use serde_json::{Map, Value};
// self
use crate::{
	config::CatalogConfig,
	model::{Client, ClientDetail, EVERYONE_GROUP, UserGroup},
};

/// A client record as returned by the list endpoint, all schema generations included.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawClient {
	/// Canonical record identifier.
	#[serde(default)]
	pub id: Option<String>,
	/// OIDC client identifier; doubles as the id fallback.
	#[serde(default)]
	pub client_id: Option<String>,
	/// Current display-name field.
	#[serde(default)]
	pub client_name: Option<String>,
	/// Legacy display-name field.
	#[serde(default)]
	pub name: Option<String>,
	/// Free-form description.
	#[serde(default)]
	pub description: Option<String>,
	/// Current public-client flag.
	#[serde(rename = "isPublic", default)]
	pub is_public: Option<bool>,
	/// Legacy public-client flag.
	#[serde(rename = "is_public", default)]
	pub is_public_legacy: Option<bool>,
	/// Boolean logo flag.
	#[serde(rename = "hasLogo", default)]
	pub has_logo: Option<bool>,
	/// Logo URI whose presence also signals a logo.
	#[serde(default)]
	pub logo_uri: Option<String>,
	/// Optional icon identifier.
	#[serde(default)]
	pub icon: Option<String>,
	/// Canonical callback-URL field.
	#[serde(default)]
	pub callback_urls: Option<Value>,
	/// Camel-cased callback-URL spelling.
	#[serde(rename = "callbackURLs", default)]
	pub callback_urls_camel: Option<Value>,
	/// RFC-styled callback-URL spelling.
	#[serde(default)]
	pub redirect_uris: Option<Value>,
}

/// A per-client detail record, legacy callback spellings included.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawClientDetail {
	/// Groups permitted to use the client.
	#[serde(rename = "allowedUserGroups", default)]
	pub allowed_user_groups: Vec<UserGroup>,
	/// Canonical callback-URL field.
	#[serde(default)]
	pub callback_urls: Option<Value>,
	/// Camel-cased callback-URL spelling.
	#[serde(rename = "callbackURLs", default)]
	pub callback_urls_camel: Option<Value>,
	/// RFC-styled callback-URL spelling.
	#[serde(default)]
	pub redirect_uris: Option<Value>,
	/// Remaining upstream fields, passed through untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Map a raw list record into the canonical [`Client`] representation.
///
/// Access fields start at their unrestricted defaults; the access filter refines
/// them once detail records are available.
pub fn normalize_client(raw: &RawClient, config: &CatalogConfig) -> Client {
	let client_id = raw.client_id.clone().unwrap_or_default();
	let id = non_empty(&raw.id).unwrap_or_else(|| client_id.clone());
	let name = non_empty(&raw.client_name)
		.or_else(|| non_empty(&raw.name))
		.unwrap_or_else(|| client_id.clone());
	let has_logo =
		raw.has_logo.unwrap_or(false) || raw.logo_uri.as_deref().is_some_and(|uri| !uri.is_empty());
	let logo_url = if has_logo { Some(config.logo_url(&id)) } else { None };
	let callback_urls = resolve_callback_urls([
		raw.callback_urls.as_ref(),
		raw.callback_urls_camel.as_ref(),
		raw.redirect_uris.as_ref(),
	]);

	Client {
		id,
		client_id,
		name,
		description: raw.description.clone().unwrap_or_default(),
		is_public: raw.is_public.unwrap_or(false) || raw.is_public_legacy.unwrap_or(false),
		has_logo,
		logo_url,
		icon: non_empty(&raw.icon),
		callback_urls,
		access_groups: vec![EVERYONE_GROUP.to_string()],
		restricted_access: false,
		has_access: true,
	}
}

/// Map a raw detail record into [`ClientDetail`], normalizing only the callback
/// fields and keeping everything else as-is.
pub fn normalize_client_detail(raw: RawClientDetail) -> ClientDetail {
	let callback_urls = resolve_callback_urls([
		raw.callback_urls.as_ref(),
		raw.callback_urls_camel.as_ref(),
		raw.redirect_uris.as_ref(),
	]);

	ClientDetail { allowed_user_groups: raw.allowed_user_groups, callback_urls, extra: raw.extra }
}

fn non_empty(value: &Option<String>) -> Option<String> {
	value.clone().filter(|s| !s.is_empty())
}

/// Pick the first present, non-empty candidate and coerce it to an array.
fn resolve_callback_urls(candidates: [Option<&Value>; 3]) -> Vec<String> {
	for candidate in candidates.into_iter().flatten() {
		let skip = match candidate {
			Value::Null => true,
			Value::Array(items) => items.is_empty(),
			Value::String(s) => s.is_empty(),
			_ => false,
		};

		if !skip {
			return coerce_url_array(candidate);
		}
	}

	Vec::new()
}

/// Coerce one callback-URL value to an array: a bare string becomes a one-element
/// array, any other non-array value becomes an empty array.
fn coerce_url_array(value: &Value) -> Vec<String> {
	match value {
		Value::Array(items) =>
			items.iter().filter_map(|item| item.as_str().map(ToOwned::to_owned)).collect(),
		Value::String(url) => vec![url.clone()],
		_ => Vec::new(),
	}
}
