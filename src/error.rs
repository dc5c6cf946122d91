//! Crate-level error types shared by the cache, the credential source, and configuration.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Errors are cheap to clone so a single failed refresh can be handed to every caller that was
/// waiting on it.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Client identity is incomplete; no upstream call was attempted.
	#[error(
		"Spotify client credentials are missing ({fields}). Provide client_id/client_secret overrides, set SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET, or add them to config.properties."
	)]
	MissingCredentials {
		/// Comma-separated list of blank identity fields.
		fields: &'static str,
	},
	/// The token endpoint exchange failed.
	#[error(transparent)]
	UpstreamAuth(#[from] UpstreamAuthError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns `true` when the error came from the upstream exchange (a later call may succeed).
	pub fn is_upstream(&self) -> bool {
		matches!(self, Self::UpstreamAuth(_))
	}
}

/// Configuration and validation failures raised locally.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// HTTP request construction failed.
	#[error("HTTP request could not be constructed.")]
	HttpRequest {
		/// Underlying request builder failure.
		#[source]
		source: SharedError,
	},
	/// A configured URL could not be parsed.
	#[error("Configuration key `{key}` does not contain a valid URL.")]
	InvalidUrl {
		/// Configuration key that produced the value.
		key: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token endpoints must use HTTPS.
	#[error("The token endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// A configured number could not be parsed.
	#[error("Configuration key `{key}` must be a whole number of seconds, got `{value}`.")]
	InvalidNumber {
		/// Configuration key that produced the value.
		key: &'static str,
		/// Raw value that failed to parse.
		value: String,
	},
	/// The local configuration file exists but could not be read.
	#[error("Failed to load configuration file {path}.")]
	ConfigFile {
		/// Path of the offending file.
		path: String,
		/// Underlying loader failure.
		#[source]
		source: SharedError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}

	/// Wraps a request construction failure inside [`ConfigError`].
	pub fn http_request(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpRequest { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
impl From<oauth2::http::Error> for ConfigError {
	fn from(e: oauth2::http::Error) -> Self {
		Self::http_request(e)
	}
}

/// Failures of the client-credentials exchange against the token endpoint.
///
/// None of these are retried internally; the cache leaves its state untouched and the next
/// `get_credential` call attempts a fresh exchange.
#[derive(Clone, Debug, ThisError)]
pub enum UpstreamAuthError {
	/// Token endpoint rejected the request with an OAuth error body.
	#[error("Token endpoint rejected the client credentials: {error}{}.", describe(.description))]
	Rejected {
		/// OAuth `error` code (e.g. `invalid_client`).
		error: String,
		/// OAuth `error_description`, when supplied.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned an unexpected but well-formed failure.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with a body that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned an empty `access_token`.
	#[error("Token endpoint returned an empty access_token.")]
	EmptyAccessToken,
	/// The exchange did not finish within the configured timeout.
	#[error("Request timed out while calling the token endpoint.")]
	Timeout,
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io {
		/// Underlying IO failure.
		#[source]
		source: Arc<std::io::Error>,
	},
	/// The outbound request could not be built from the configured endpoint.
	#[error(transparent)]
	Request(#[from] ConfigError),
}
impl UpstreamAuthError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Arc::new(src) }
	}

	/// Returns the HTTP status reported by the token endpoint, when known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. }
			| Self::TokenEndpoint { status, .. }
			| Self::MalformedResponse { status, .. } => *status,
			_ => None,
		}
	}
}
impl From<std::io::Error> for UpstreamAuthError {
	fn from(e: std::io::Error) -> Self {
		Self::Io { source: Arc::new(e) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for UpstreamAuthError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

fn describe(description: &Option<String>) -> String {
	description.as_deref().map(|value| format!(" ({value})")).unwrap_or_default()
}
