//! Canonical data model shared by the fetcher, the access filter, and the portal.

// crates.io
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Display name used for clients without group restrictions.
pub const EVERYONE_GROUP: &str = "Everyone";

/// Canonical representation of a registered OIDC client application.
///
/// Serialized field names follow the portal's historical JSON contract, which mixes
/// snake and camel case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Client {
	/// Primary identifier; falls back to `client_id` for records lacking one.
	pub id: String,
	/// OIDC client identifier.
	pub client_id: String,
	/// Display name.
	pub name: String,
	/// Free-form description; empty when the upstream record has none.
	#[serde(default)]
	pub description: String,
	/// Whether the client is a public (non-confidential) OIDC client.
	#[serde(rename = "isPublic", default)]
	pub is_public: bool,
	/// Whether the upstream record signals a logo via either legacy flag.
	#[serde(rename = "hasLogo", default)]
	pub has_logo: bool,
	/// Resolved logo URL; only populated when `has_logo` is true.
	#[serde(rename = "logoUrl", default)]
	pub logo_url: Option<Url>,
	/// Optional icon identifier.
	#[serde(default)]
	pub icon: Option<String>,
	/// Registered callback URLs; always an array after normalization.
	#[serde(default)]
	pub callback_urls: Vec<String>,
	/// Display names of the groups permitted to see the client.
	#[serde(rename = "accessGroups", default = "default_access_groups")]
	pub access_groups: Vec<String>,
	/// Whether visibility is limited to specific groups.
	#[serde(rename = "restrictedAccess", default)]
	pub restricted_access: bool,
	/// Whether the current caller may see the client.
	///
	/// Computed during filtering; not meaningful past the response it populates.
	#[serde(rename = "hasAccess", default = "default_true")]
	pub has_access: bool,
}

fn default_access_groups() -> Vec<String> {
	vec![EVERYONE_GROUP.to_string()]
}

fn default_true() -> bool {
	true
}

/// Per-client detail record retrieved from the provider's admin API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientDetail {
	/// Groups permitted to use the client; absent or empty means unrestricted.
	#[serde(rename = "allowedUserGroups", default)]
	pub allowed_user_groups: Vec<UserGroup>,
	/// Callback URLs after normalization; always an array.
	#[serde(default)]
	pub callback_urls: Vec<String>,
	/// Remaining upstream fields, kept as-is.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl ClientDetail {
	/// Whether the detail record restricts visibility to specific groups.
	pub fn is_restricted(&self) -> bool {
		!self.allowed_user_groups.is_empty()
	}
}

/// A user group known to the identity provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
	/// Group identifier used for access checks.
	pub id: String,
	/// Technical group name.
	#[serde(default)]
	pub name: String,
	/// Human-friendly display name, when the provider maintains one.
	#[serde(rename = "friendlyName", default)]
	pub friendly_name: Option<String>,
}
impl UserGroup {
	/// Display name for the group, preferring a non-empty friendly name.
	pub fn display_name(&self) -> &str {
		match self.friendly_name.as_deref() {
			Some(friendly) if !friendly.is_empty() => friendly,
			_ => &self.name,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn display_name_prefers_friendly_name() {
		let group = UserGroup {
			id: "g1".into(),
			name: "eng-berlin".into(),
			friendly_name: Some("Engineering Berlin".into()),
		};

		assert_eq!(group.display_name(), "Engineering Berlin");
	}

	#[test]
	fn display_name_falls_back_on_empty_friendly_name() {
		let group =
			UserGroup { id: "g1".into(), name: "eng-berlin".into(), friendly_name: Some(String::new()) };

		assert_eq!(group.display_name(), "eng-berlin");

		let group = UserGroup { id: "g1".into(), name: "eng-berlin".into(), friendly_name: None };

		assert_eq!(group.display_name(), "eng-berlin");
	}

	#[test]
	fn detail_without_groups_is_unrestricted() {
		let detail = ClientDetail::default();

		assert!(!detail.is_restricted());
	}

	#[test]
	fn client_serializes_with_portal_field_names() {
		let client = Client {
			id: "c1".into(),
			client_id: "c1".into(),
			name: "Wiki".into(),
			description: String::new(),
			is_public: false,
			has_logo: false,
			logo_url: None,
			icon: None,
			callback_urls: Vec::new(),
			access_groups: vec![EVERYONE_GROUP.to_string()],
			restricted_access: false,
			has_access: true,
		};
		let value = serde_json::to_value(&client).expect("serialize");

		assert_eq!(value["isPublic"], false);
		assert_eq!(value["hasLogo"], false);
		assert_eq!(value["accessGroups"][0], EVERYONE_GROUP);
		assert_eq!(value["restrictedAccess"], false);
	}
}
