//! Layered configuration lookup for identity material, endpoints, and timeouts.
//!
//! Every key resolves through the same precedence:
//!
//! 1. runtime override ([`Config::set_override`]),
//! 2. environment variable (mapped names such as `SPOTIFY_CLIENT_ID`, see [`env_name`]),
//! 3. the local Java-style properties file (`config.properties` by default, loaded once),
//! 4. the built-in default, which only exists for URLs and the timeout.
//!
//! Blank values at any layer fall through to the next one. Identity keys have no default, so
//! an unset identity resolves to empty strings and the cache reports
//! [`Error::MissingCredentials`](crate::error::Error::MissingCredentials).

// std
use std::{
	borrow::Cow,
	fs::File,
	io::BufReader,
	path::{Path, PathBuf},
	time::Duration as StdDuration,
};
// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, IdentitySource, TokenSecret},
	error::{ConfigError, SharedError},
	source::TokenEndpoint,
};

/// Client identifier key.
pub const CLIENT_ID: &str = "client_id";
/// Client secret key.
pub const CLIENT_SECRET: &str = "client_secret";
/// User-delegated token key (consumed by callers, never refreshed here).
pub const USER_TOKEN: &str = "user_token";
/// Web API base URL key.
pub const BASE_URL: &str = "base_url";
/// Token endpoint URL key.
pub const TOKEN_URL: &str = "token_url";
/// Per-request token exchange timeout key, in whole seconds.
pub const HTTP_TIMEOUT_SECS: &str = "http_timeout_secs";

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_FILE: &str = "config.properties";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Maps a logical key to its conventional environment variable name.
pub fn env_name(key: &str) -> Cow<'static, str> {
	match key {
		CLIENT_ID => "SPOTIFY_CLIENT_ID".into(),
		CLIENT_SECRET => "SPOTIFY_CLIENT_SECRET".into(),
		USER_TOKEN => "SPOTIFY_USER_TOKEN".into(),
		BASE_URL => "SPOTIFY_BASE_URL".into(),
		TOKEN_URL => "SPOTIFY_TOKEN_URL".into(),
		HTTP_TIMEOUT_SECS => "SPOTIFY_HTTP_TIMEOUT_SECS".into(),
		other => other.to_uppercase().into(),
	}
}

/// Built-in default for `key`, if any.
pub fn default_value(key: &str) -> Option<&'static str> {
	match key {
		BASE_URL => Some("https://api.spotify.com/v1"),
		TOKEN_URL => Some(TokenEndpoint::SPOTIFY),
		HTTP_TIMEOUT_SECS => Some("10"),
		_ => None,
	}
}

/// Layered key/value configuration.
pub struct Config {
	overrides: RwLock<HashMap<String, String>>,
	env: Option<EnvLookup>,
	file: HashMap<String, String>,
	file_path: Option<PathBuf>,
}
impl Config {
	/// Returns a builder with process environment lookups enabled and no file.
	pub fn builder() -> ConfigBuilder {
		ConfigBuilder::default()
	}

	/// Loads the standard layers: process environment plus `config.properties` if present.
	pub fn load() -> Result<Self, ConfigError> {
		Self::builder().file(DEFAULT_FILE).build()
	}

	/// Resolves `key` through overrides, environment, file, and defaults.
	///
	/// Returns an empty string when no layer supplies a non-blank value.
	pub fn resolve(&self, key: &str) -> String {
		if let Some(value) = self.overrides.read().get(key).filter(|v| !is_blank(v)) {
			return value.clone();
		}
		if let Some(value) =
			self.env.as_ref().and_then(|env| (**env)(env_name(key).as_ref())).filter(|v| !is_blank(v))
		{
			return value;
		}
		if let Some(value) = self.file.get(key).filter(|v| !is_blank(v)) {
			return value.clone();
		}

		default_value(key).unwrap_or_default().to_owned()
	}

	/// Sets a runtime override that takes precedence over every other layer.
	pub fn set_override(&self, key: impl Into<String>, value: impl Into<String>) {
		self.overrides.write().insert(key.into(), value.into());
	}

	/// Removes a runtime override, returning the previous value.
	pub fn clear_override(&self, key: &str) -> Option<String> {
		self.overrides.write().remove(key)
	}

	/// Path of the loaded configuration file, if one was read.
	pub fn file_path(&self) -> Option<&Path> {
		self.file_path.as_deref()
	}

	/// Resolved client identifier (empty when unset).
	pub fn client_id(&self) -> String {
		self.resolve(CLIENT_ID)
	}

	/// Resolved client secret (blank when unset).
	pub fn client_secret(&self) -> TokenSecret {
		TokenSecret::new(self.resolve(CLIENT_SECRET))
	}

	/// Resolved user-delegated token, if configured.
	pub fn user_token(&self) -> Option<TokenSecret> {
		Some(TokenSecret::new(self.resolve(USER_TOKEN))).filter(|token| !token.is_blank())
	}

	/// Resolved Web API base URL.
	pub fn base_url(&self) -> Result<Url, ConfigError> {
		Url::parse(&self.resolve(BASE_URL))
			.map_err(|source| ConfigError::InvalidUrl { key: BASE_URL, source })
	}

	/// Resolved and validated token endpoint.
	pub fn token_endpoint(&self) -> Result<TokenEndpoint, ConfigError> {
		let url = Url::parse(&self.resolve(TOKEN_URL))
			.map_err(|source| ConfigError::InvalidUrl { key: TOKEN_URL, source })?;

		TokenEndpoint::new(url)
	}

	/// Resolved per-request timeout for the token exchange.
	pub fn http_timeout(&self) -> Result<StdDuration, ConfigError> {
		let raw = self.resolve(HTTP_TIMEOUT_SECS);
		let secs = raw
			.trim()
			.parse::<u64>()
			.map_err(|_| ConfigError::InvalidNumber { key: HTTP_TIMEOUT_SECS, value: raw.clone() })?;

		Ok(StdDuration::from_secs(secs))
	}
}
impl IdentitySource for Config {
	fn client_identity(&self) -> ClientIdentity {
		ClientIdentity { client_id: self.client_id(), client_secret: self.client_secret() }
	}
}
impl Debug for Config {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut override_keys = self.overrides.read().keys().cloned().collect::<Vec<_>>();

		override_keys.sort();

		f.debug_struct("Config")
			.field("override_keys", &override_keys)
			.field("env", &self.env.is_some())
			.field("file_path", &self.file_path)
			.finish()
	}
}

/// Builder for [`Config`].
pub struct ConfigBuilder {
	overrides: HashMap<String, String>,
	env: Option<EnvLookup>,
	file: Option<PathBuf>,
}
impl ConfigBuilder {
	/// Reads the file at `path` as the file layer; a missing file is skipped.
	pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
		self.file = Some(path.into());

		self
	}

	/// Replaces the environment lookup (for example with a fixed map in tests).
	pub fn env<F>(mut self, lookup: F) -> Self
	where
		F: 'static + Fn(&str) -> Option<String> + Send + Sync,
	{
		self.env = Some(Arc::new(lookup));

		self
	}

	/// Disables the environment layer entirely.
	pub fn without_env(mut self) -> Self {
		self.env = None;

		self
	}

	/// Seeds a runtime override.
	pub fn override_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.overrides.insert(key.into(), value.into());

		self
	}

	/// Loads the file layer and produces a [`Config`].
	pub fn build(self) -> Result<Config, ConfigError> {
		let (file, file_path) = match self.file {
			Some(path) if path.exists() => (load_file(&path)?, Some(path)),
			Some(_path) => {
				#[cfg(feature = "tracing")]
				tracing::debug!(path = %_path.display(), "configuration file not found; skipping");

				(HashMap::new(), None)
			},
			None => (HashMap::new(), None),
		};

		Ok(Config { overrides: RwLock::new(self.overrides), env: self.env, file, file_path })
	}
}
impl Default for ConfigBuilder {
	fn default() -> Self {
		Self {
			overrides: HashMap::new(),
			env: Some(Arc::new(|name: &str| std::env::var(name).ok())),
			file: None,
		}
	}
}

fn load_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
	let to_error = |source: SharedError| ConfigError::ConfigFile {
		path: path.display().to_string(),
		source,
	};
	let file = File::open(path).map_err(|e| to_error(Arc::new(e)))?;
	let entries =
		java_properties::read(BufReader::new(file)).map_err(|e| to_error(Arc::new(e)))?;

	#[cfg(feature = "tracing")]
	tracing::debug!(path = %path.display(), keys = entries.len(), "configuration file loaded");

	Ok(entries)
}

fn is_blank(value: &str) -> bool {
	value.trim().is_empty()
}
