//! Catalog configuration and validation.

// std
use std::fmt::{Debug, Formatter, Result as FmtResult};
// crates.io
use url::Url;
// self
use crate::_prelude::*;

/// Default TTL applied to the cached client list.
pub const DEFAULT_CLIENT_LIST_TTL: Duration = Duration::from_secs(5 * 60);
/// Default TTL applied to cached per-client detail records.
pub const DEFAULT_CLIENT_DETAIL_TTL: Duration = Duration::from_secs(10 * 60);
/// Default bound on concurrent per-client detail fetches.
pub const DEFAULT_DETAIL_CONCURRENCY: usize = 4;

/// Constructor producing a client logo URL from the issuer base and a client id.
pub type LogoUrlFn = Arc<dyn Fn(&Url, &str) -> Url + Send + Sync>;

/// Configuration describing how to reach and cache the provider's admin API.
#[derive(Clone)]
pub struct CatalogConfig {
	/// Base URL identifying the OIDC provider.
	pub issuer: Url,
	/// Static service credential; when set it takes priority over session tokens.
	pub api_key: Option<String>,
	/// TTL for the cached client list.
	pub client_list_ttl: Duration,
	/// TTL for cached per-client detail records.
	pub client_detail_ttl: Duration,
	/// Maximum number of detail fetches in flight at once.
	pub detail_concurrency: usize,
	logo_url: Option<LogoUrlFn>,
}
impl CatalogConfig {
	/// Construct a configuration for the given issuer with default cache settings.
	pub fn new(issuer: impl AsRef<str>) -> Result<Self> {
		let issuer = Url::parse(issuer.as_ref())?;

		Ok(Self {
			issuer,
			api_key: None,
			client_list_ttl: DEFAULT_CLIENT_LIST_TTL,
			client_detail_ttl: DEFAULT_CLIENT_DETAIL_TTL,
			detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
			logo_url: None,
		})
	}

	/// Set the static API key credential.
	pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
		self.api_key = Some(api_key.into());

		self
	}

	/// Set the client list TTL.
	pub fn with_client_list_ttl(mut self, ttl: Duration) -> Self {
		self.client_list_ttl = ttl;

		self
	}

	/// Set the per-client detail TTL.
	pub fn with_client_detail_ttl(mut self, ttl: Duration) -> Self {
		self.client_detail_ttl = ttl;

		self
	}

	/// Set the bound on concurrent detail fetches.
	pub fn with_detail_concurrency(mut self, bound: usize) -> Self {
		self.detail_concurrency = bound;

		self
	}

	/// Override the logo URL constructor.
	pub fn with_logo_url_fn(mut self, logo_url: LogoUrlFn) -> Self {
		self.logo_url = Some(logo_url);

		self
	}

	/// Validate the configuration against the documented constraints.
	pub fn validate(&self) -> Result<()> {
		if self.issuer.host_str().is_none() {
			return Err(Error::Validation {
				field: "issuer",
				reason: "Must include a host component.".into(),
			});
		}
		if self.client_list_ttl.is_zero() {
			return Err(Error::Validation {
				field: "client_list_ttl",
				reason: "Must be greater than zero.".into(),
			});
		}
		if self.client_detail_ttl.is_zero() {
			return Err(Error::Validation {
				field: "client_detail_ttl",
				reason: "Must be greater than zero.".into(),
			});
		}
		if self.detail_concurrency == 0 {
			return Err(Error::Validation {
				field: "detail_concurrency",
				reason: "Must be greater than zero.".into(),
			});
		}

		Ok(())
	}

	/// Resolve the logo URL for a client id.
	pub fn logo_url(&self, client_id: &str) -> Url {
		match &self.logo_url {
			Some(logo_url) => logo_url(&self.issuer, client_id),
			None => {
				let mut url = self.issuer.clone();

				if let Ok(mut segments) = url.path_segments_mut() {
					segments.pop_if_empty().extend(["api", "oidc", "clients", client_id, "logo"]);
				}

				url
			},
		}
	}

	/// Endpoint serving the clients collection.
	pub fn clients_url(&self) -> Url {
		let mut url = self.issuer.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().extend(["api", "oidc", "clients"]);
		}

		url
	}

	/// Endpoint serving a single client's detail record.
	pub fn client_url(&self, client_id: &str) -> Url {
		let mut url = self.issuer.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().extend(["api", "oidc", "clients", client_id]);
		}

		url
	}
}
impl Debug for CatalogConfig {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("CatalogConfig")
			.field("issuer", &self.issuer)
			.field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
			.field("client_list_ttl", &self.client_list_ttl)
			.field("client_detail_ttl", &self.client_detail_ttl)
			.field("detail_concurrency", &self.detail_concurrency)
			.field("logo_url", &self.logo_url.as_ref().map(|_| "<fn>"))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoints_join_issuer_path() {
		let config = CatalogConfig::new("https://id.example.com").expect("config");

		assert_eq!(config.clients_url().as_str(), "https://id.example.com/api/oidc/clients");
		assert_eq!(config.client_url("abc").as_str(), "https://id.example.com/api/oidc/clients/abc");
		assert_eq!(
			config.logo_url("abc").as_str(),
			"https://id.example.com/api/oidc/clients/abc/logo"
		);
	}

	#[test]
	fn endpoints_preserve_issuer_subpath() {
		let config = CatalogConfig::new("https://id.example.com/idp/").expect("config");

		assert_eq!(config.clients_url().as_str(), "https://id.example.com/idp/api/oidc/clients");
	}

	#[test]
	fn logo_url_override_is_used() {
		let config = CatalogConfig::new("https://id.example.com")
			.expect("config")
			.with_logo_url_fn(Arc::new(|issuer, id| {
				issuer.join(&format!("logos/{id}.png")).expect("logo url")
			}));

		assert_eq!(config.logo_url("abc").as_str(), "https://id.example.com/logos/abc.png");
	}

	#[test]
	fn validate_rejects_zero_ttls_and_concurrency() {
		let config = CatalogConfig::new("https://id.example.com").expect("config");

		assert!(config.validate().is_ok());
		assert!(config.clone().with_client_list_ttl(Duration::ZERO).validate().is_err());
		assert!(config.clone().with_client_detail_ttl(Duration::ZERO).validate().is_err());
		assert!(config.with_detail_concurrency(0).validate().is_err());
	}
}
