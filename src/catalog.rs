//! Catalog orchestration: header resolution, cached fetching, and visibility filtering.

// std
use std::collections::{HashMap, HashSet};
// crates.io
use http::HeaderMap;
use reqwest::{Client as HttpClient, redirect::Policy};
use tokio::{sync::Semaphore, task::JoinSet};
// self
use crate::{
	_prelude::*,
	access,
	auth::{self, SessionState},
	cache::TtlCache,
	config::CatalogConfig,
	model::{Client, ClientDetail, UserGroup},
	normalize::{normalize_client, normalize_client_detail},
	upstream,
};

/// Fixed cache key for the client list; the cached list is caller-independent
/// (pre-filter), so it is shared across all callers.
const CLIENT_LIST_KEY: &str = "clients_all";

/// Aggregates the provider's client registry for portal page loads.
///
/// Cloning is cheap and clones share the underlying caches and HTTP client, so one
/// catalog instance should be built per process and handed to request handlers.
#[derive(Clone, Debug)]
pub struct ClientCatalog {
	config: Arc<CatalogConfig>,
	http: Arc<HttpClient>,
	list_cache: TtlCache<String, Arc<Vec<Client>>>,
	detail_cache: TtlCache<String, ClientDetail>,
}
impl ClientCatalog {
	/// Build a new catalog with the default reqwest client.
	pub fn new(config: CatalogConfig) -> Result<Self> {
		config.validate()?;

		let http = HttpClient::builder()
			.redirect(Policy::limited(10))
			.user_agent(format!("oidc-client-catalog/{}", env!("CARGO_PKG_VERSION")))
			.connect_timeout(Duration::from_secs(5))
			.build()?;

		Ok(Self::with_client(config, http))
	}

	/// Build a catalog using the supplied HTTP client (primarily for tests).
	pub fn with_client(config: CatalogConfig, http: HttpClient) -> Self {
		Self::with_parts(config, http, TtlCache::new(), TtlCache::new())
	}

	/// Build a catalog from externally owned caches, allowing tests to pre-populate
	/// or share cache state explicitly.
	pub fn with_parts(
		config: CatalogConfig,
		http: HttpClient,
		list_cache: TtlCache<String, Arc<Vec<Client>>>,
		detail_cache: TtlCache<String, ClientDetail>,
	) -> Self {
		Self { config: Arc::new(config), http: Arc::new(http), list_cache, detail_cache }
	}

	/// The configuration this catalog was built with.
	pub fn config(&self) -> &CatalogConfig {
		&self.config
	}

	/// Resolve outbound authentication headers for the caller's session.
	pub fn auth_headers(&self, session: &SessionState) -> Result<HeaderMap> {
		auth::resolve_headers(&self.config, session)
	}

	/// Fetch the normalized client list, consulting the cache first.
	pub async fn fetch_clients(&self, headers: &HeaderMap) -> Result<Arc<Vec<Client>>> {
		let key = CLIENT_LIST_KEY.to_string();

		if let Some(cached) = self.list_cache.get(&key).await {
			tracing::debug!("client list cache hit");

			return Ok(cached);
		}

		let raw =
			upstream::fetch_client_list(&self.http, self.config.clients_url(), headers).await?;
		let clients = Arc::new(
			raw.iter().map(|record| normalize_client(record, &self.config)).collect::<Vec<_>>(),
		);

		self.list_cache.insert(key, clients.clone(), self.config.client_list_ttl).await;

		Ok(clients)
	}

	/// Fetch one client's detail record, consulting the cache first.
	pub async fn fetch_client_details(
		&self,
		headers: &HeaderMap,
		client_id: &str,
	) -> Result<ClientDetail> {
		let key = format!("client_details_{client_id}");

		if let Some(cached) = self.detail_cache.get(&key).await {
			tracing::debug!(client = client_id, "client detail cache hit");

			return Ok(cached);
		}

		let raw =
			upstream::fetch_client_detail(&self.http, self.config.client_url(client_id), headers)
				.await?;
		let detail = normalize_client_detail(raw);

		self.detail_cache.insert(key, detail.clone(), self.config.client_detail_ttl).await;

		Ok(detail)
	}

	/// Resolve the clients visible to the caller, sorted by name.
	///
	/// A failure of the list fetch or of header resolution propagates; individual
	/// detail fetch failures are logged and the affected client is treated as
	/// unrestricted so one broken record cannot abort the whole request.
	#[tracing::instrument(skip(self, session, groups), fields(issuer = %self.config.issuer))]
	pub async fn visible_clients(
		&self,
		session: &SessionState,
		groups: &[UserGroup],
	) -> Result<Vec<Client>> {
		let headers = self.auth_headers(session)?;
		let clients = self.fetch_clients(&headers).await?;
		let details = self.fetch_details(&headers, &clients).await;
		let caller_group_ids =
			groups.iter().map(|group| group.id.clone()).collect::<HashSet<_>>();

		Ok(access::apply_group_access((*clients).clone(), &details, &caller_group_ids))
	}

	/// Fan out detail fetches with bounded concurrency; failures yield no entry.
	async fn fetch_details(
		&self,
		headers: &HeaderMap,
		clients: &[Client],
	) -> HashMap<String, ClientDetail> {
		let semaphore = Arc::new(Semaphore::new(self.config.detail_concurrency));
		let mut tasks = JoinSet::new();

		for client in clients {
			let catalog = self.clone();
			let headers = headers.clone();
			let id = client.id.clone();
			let semaphore = semaphore.clone();

			tasks.spawn(async move {
				// The semaphore is never closed, so acquisition cannot fail.
				let _permit = semaphore.acquire_owned().await.ok();
				let outcome = catalog.fetch_client_details(&headers, &id).await;

				(id, outcome)
			});
		}

		let mut details = HashMap::new();

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok((id, Ok(detail))) => {
					details.insert(id, detail);
				},
				Ok((id, Err(err))) => tracing::warn!(
					client = %id,
					error = %err,
					"client detail fetch failed; treating client as unrestricted"
				),
				Err(err) => tracing::warn!(error = %err, "client detail task failed"),
			}
		}

		details
	}
}
