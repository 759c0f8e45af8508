//! Server-side OIDC client catalog — TTL-cached aggregation of an identity provider's
//! client registry with group-based visibility filtering.
//!
//! The catalog sits between a web portal and the provider's administrative API and
//! answers one question for an authenticated caller: which registered client
//! applications may I see, and with what display metadata? Upstream responses are
//! normalized from several historical JSON shapes into one canonical [`Client`],
//! cached per entry with a TTL, and filtered against the caller's group memberships.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod access;
pub mod auth;
pub mod cache;
pub mod model;
pub mod normalize;
pub mod upstream;

mod catalog;
mod config;
mod error;
mod _prelude {
	pub use std::{sync::Arc, time::Duration};

	pub use tokio::time::Instant;

	pub use crate::{Error, Result};
}
#[cfg(test)]
mod _test {
	use tracing_subscriber as _;
	use wiremock as _;
}

pub use crate::{
	auth::SessionState,
	catalog::ClientCatalog,
	config::{
		CatalogConfig, DEFAULT_CLIENT_DETAIL_TTL, DEFAULT_CLIENT_LIST_TTL,
		DEFAULT_DETAIL_CONCURRENCY, LogoUrlFn,
	},
	error::{Error, Result},
	model::{Client, ClientDetail, UserGroup},
};
