//! Single-flight cache for Spotify client-credentials app tokens: fetch once, refresh ahead of
//! expiry, and never hand a stale bearer to concurrent callers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod ext;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod source;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ClientIdentity,
		cache::{CredentialCache, ReqwestCredentialCache},
		clock::ManualClock,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		source::{ClientCredentialsSource, TokenEndpoint},
	};

	/// Source type alias used by reqwest-backed integration tests.
	pub type ReqwestTestSource =
		ClientCredentialsSource<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a client-credentials source pointed at `token_url` using the insecure test client.
	pub fn build_reqwest_test_source(token_url: &str) -> ReqwestTestSource {
		let endpoint = TokenEndpoint::new(
			Url::parse(token_url).expect("Mock token endpoint should parse successfully."),
		)
		.expect("Mock token endpoint should be accepted.");

		ClientCredentialsSource::with_http_client(
			endpoint,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Constructs a [`CredentialCache`] driven by a [`ManualClock`] and the reqwest transport used
	/// across integration tests.
	pub fn build_reqwest_test_cache(
		token_url: &str,
		client_id: &str,
		client_secret: &str,
	) -> (ReqwestCredentialCache, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::default());
		let cache = CredentialCache::new(
			build_reqwest_test_source(token_url),
			ClientIdentity::new(client_id, client_secret),
		)
		.with_clock(clock.clone());

		(cache, clock)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
