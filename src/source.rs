//! Credential sources: one stateless exchange of a client identity for a fresh app token.
//!
//! [`CredentialSource`] is the seam the cache refreshes through. The bundled
//! [`ClientCredentialsSource`] performs the OAuth 2.0 `client_credentials` grant: a single
//! `POST` to the token endpoint with the identity encoded as HTTP Basic credentials (or form
//! fields, see [`ClientAuthMethod`]) and `grant_type=client_credentials` as the form body.
//! Failures are never retried here; they surface as [`UpstreamAuthError`].

mod endpoint;

pub use endpoint::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, TokenSecret},
	error::UpstreamAuthError,
	http::{ResponseMetadataSlot, TokenHttpClient},
	oauth::{self, TransportErrorMapper},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Boxed future returned by [`CredentialSource::fetch_credential`].
pub type SourceFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, UpstreamAuthError>> + 'a + Send>>;

#[cfg(feature = "reqwest")]
/// Source specialized for the crate's default reqwest transport stack.
pub type ReqwestCredentialSource =
	ClientCredentialsSource<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Exchanges a client identity for a fresh credential.
///
/// Implementations hold no credential state and perform exactly one upstream round trip per
/// call. The caller guarantees the identity is complete.
pub trait CredentialSource
where
	Self: Send + Sync,
{
	/// Requests a fresh token for `identity`.
	fn fetch_credential<'a>(&'a self, identity: &'a ClientIdentity) -> SourceFuture<'a, IssuedToken>;
}

/// Token value and lifetime returned by a [`CredentialSource`].
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
	/// Bearer value; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type reported upstream.
	pub token_type: String,
	/// Declared validity (`expires_in`), never negative.
	pub lifetime: Duration,
}
impl IssuedToken {
	/// Creates a bearer token with the provided lifetime in seconds.
	pub fn bearer(access_token: impl Into<String>, lifetime_secs: i64) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			token_type: "Bearer".into(),
			lifetime: Duration::seconds(lifetime_secs.max(0)),
		}
	}
}
impl Debug for IssuedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IssuedToken")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("lifetime", &self.lifetime)
			.finish()
	}
}

/// [`CredentialSource`] performing the OAuth 2.0 client-credentials grant over a pluggable
/// [`TokenHttpClient`].
pub struct ClientCredentialsSource<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Token endpoint and client authentication mode.
	pub endpoint: TokenEndpoint,
	/// HTTP client wrapper used for every token request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
}
impl<C, M> ClientCredentialsSource<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a source that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		endpoint: TokenEndpoint,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self { endpoint, http_client: http_client.into(), transport_mapper: mapper.into() }
	}
}
#[cfg(feature = "reqwest")]
impl ClientCredentialsSource<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a source backed by a default reqwest transport with the standard timeout.
	pub fn new(endpoint: TokenEndpoint) -> Self {
		Self::with_http_client(
			endpoint,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> CredentialSource for ClientCredentialsSource<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fetch_credential<'a>(&'a self, identity: &'a ClientIdentity) -> SourceFuture<'a, IssuedToken> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let client = oauth::build_client(&self.endpoint, identity);
			let response = client
				.exchange_client_credentials()
				.request_async(&instrumented)
				.await
				.map_err(|err| {
					oauth::map_request_error(meta.take(), err, self.transport_mapper.as_ref())
				})?;

			oauth::map_token_response(response)
		})
	}
}
impl<C, M> Debug for ClientCredentialsSource<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentialsSource").field("endpoint", &self.endpoint).finish()
	}
}
