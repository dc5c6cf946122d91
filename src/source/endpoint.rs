//! Token endpoint description consumed by the client-credentials source.

// self
use crate::{_prelude::*, error::ConfigError};

/// Client authentication modes for the token endpoint call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Validated token endpoint plus the client authentication mode it expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEndpoint {
	/// HTTPS URL receiving `grant_type=client_credentials` requests.
	pub url: Url,
	/// Client authentication mechanism.
	pub auth_method: ClientAuthMethod,
}
impl TokenEndpoint {
	/// Spotify Accounts service token endpoint.
	pub const SPOTIFY: &'static str = "https://accounts.spotify.com/api/token";

	/// Creates an endpoint, rejecting non-HTTPS URLs.
	pub fn new(url: Url) -> Result<Self, ConfigError> {
		if url.scheme() != "https" {
			return Err(ConfigError::InsecureEndpoint { url: url.to_string() });
		}

		Ok(Self { url, auth_method: ClientAuthMethod::default() })
	}

	/// Parses and validates an endpoint URL string.
	pub fn parse(raw: &str) -> Result<Self, ConfigError> {
		let url =
			Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { key: "token_url", source })?;

		Self::new(url)
	}

	/// Returns the Spotify Accounts token endpoint.
	pub fn spotify() -> Self {
		Self::parse(Self::SPOTIFY)
			.expect("Spotify token endpoint constant must be a valid HTTPS URL.")
	}

	/// Overrides the client authentication method.
	pub fn with_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.auth_method = method;

		self
	}
}
impl Default for TokenEndpoint {
	fn default() -> Self {
		Self::spotify()
	}
}
