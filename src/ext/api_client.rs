//! Thin reqwest wrapper that signs Web API requests with the cached app token.

// self
use crate::{
	_prelude::*,
	cache::CredentialCache,
	config::Config,
	error::ConfigError,
	ext::{BearerSigner, RequestSigner},
	source::CredentialSource,
};

/// Builds Web API requests against a base URL, authorized with the app token.
pub struct ApiClient<S>
where
	S: ?Sized + CredentialSource,
{
	http: ReqwestClient,
	base_url: Url,
	cache: Arc<CredentialCache<S>>,
}
impl<S> ApiClient<S>
where
	S: ?Sized + CredentialSource,
{
	/// Creates a client for `base_url` using `cache` for authorization.
	pub fn new(http: ReqwestClient, base_url: Url, cache: Arc<CredentialCache<S>>) -> Self {
		Self { http, base_url, cache }
	}

	/// Creates a client whose base URL comes from `config`.
	pub fn from_config(
		http: ReqwestClient,
		config: &Config,
		cache: Arc<CredentialCache<S>>,
	) -> Result<Self> {
		Ok(Self::new(http, config.base_url()?, cache))
	}

	/// Returns the base URL requests are joined onto.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Joins `path` onto the base URL, keeping any path prefix such as `/v1`.
	pub fn url(&self, path: &str) -> Result<Url, ConfigError> {
		let joined = format!(
			"{}/{}",
			self.base_url.as_str().trim_end_matches('/'),
			path.trim_start_matches('/')
		);

		Url::parse(&joined).map_err(|source| ConfigError::InvalidUrl { key: "base_url", source })
	}

	/// Starts a request for `path`, signed with a currently valid app token.
	///
	/// Fails without sending anything when no credential can be obtained.
	pub async fn request(
		&self,
		method: reqwest::Method,
		path: &str,
	) -> Result<reqwest::RequestBuilder> {
		let url = self.url(path)?;
		let token = self.cache.get_credential().await?;
		let Ok(builder) = BearerSigner.attach_token(self.http.request(method, url), &token);

		Ok(builder)
	}

	/// Shorthand for a signed `GET`.
	pub async fn get(&self, path: &str) -> Result<reqwest::RequestBuilder> {
		self.request(reqwest::Method::GET, path).await
	}
}
impl<S> Debug for ApiClient<S>
where
	S: ?Sized + CredentialSource,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient").field("base_url", &self.base_url).finish()
	}
}
