//! `oauth2` crate glue: client construction, transport error mapping, and response mapping.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenType},
};
// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, TokenSecret},
	error::{ConfigError, UpstreamAuthError},
	http::ResponseMetadata,
	source::{ClientAuthMethod, IssuedToken, TokenEndpoint},
};

pub(crate) type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;

/// Maps HTTP transport failures into [`UpstreamAuthError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an upstream error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> UpstreamAuthError;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> UpstreamAuthError {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => inner.into(),
			HttpClientError::Other(message) => map_generic_transport_error(meta, message),
			_ => map_unknown_transport_error(meta),
		}
	}
}

/// Builds an `oauth2` client bound to the token endpoint and the freshly resolved identity.
pub(crate) fn build_client(
	endpoint: &TokenEndpoint,
	identity: &ClientIdentity,
) -> ConfiguredBasicClient {
	let mut client = BasicClient::new(ClientId::new(identity.client_id.clone()))
		.set_client_secret(ClientSecret::new(identity.client_secret.expose().to_owned()))
		.set_token_uri(TokenUrl::from_url(endpoint.url.clone()));

	if matches!(endpoint.auth_method, ClientAuthMethod::ClientSecretPost) {
		client = client.set_auth_type(AuthType::RequestBody);
	}

	client
}

/// Converts a successful token response into an [`IssuedToken`].
pub(crate) fn map_token_response(
	response: FacadeTokenResponse,
) -> Result<IssuedToken, UpstreamAuthError> {
	let expires_in = response.expires_in().ok_or(UpstreamAuthError::MissingExpiresIn)?.as_secs();
	let expires_in =
		i64::try_from(expires_in).map_err(|_| UpstreamAuthError::ExpiresInOutOfRange)?;
	let access_token = TokenSecret::new(response.access_token().secret().to_owned());

	if access_token.is_blank() {
		return Err(UpstreamAuthError::EmptyAccessToken);
	}

	let token_type = match response.token_type() {
		BasicTokenType::Bearer => "Bearer".to_owned(),
		other => other.as_ref().to_owned(),
	};

	Ok(IssuedToken { access_token, token_type, lifetime: Duration::seconds(expires_in) })
}

/// Classifies a failed `oauth2` request, consulting the captured response metadata.
pub(crate) fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> UpstreamAuthError
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, meta_ref),
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		RequestTokenError::Parse(error, _body) => UpstreamAuthError::MalformedResponse {
			source: Arc::new(error),
			status: meta_status(meta_ref),
		},
		RequestTokenError::Other(message) => UpstreamAuthError::TokenEndpoint {
			message,
			status: meta_status(meta_ref),
			retry_after: meta_retry_after(meta_ref),
		},
	}
}

fn map_server_response_error(
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> UpstreamAuthError {
	UpstreamAuthError::Rejected {
		error: response.error().as_ref().to_owned(),
		description: response.error_description().cloned(),
		status: meta_status(meta),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> UpstreamAuthError {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return UpstreamAuthError::Timeout;
	}
	if let Some(status) = meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())) {
		return UpstreamAuthError::TokenEndpoint {
			message: err.to_string(),
			status: Some(status),
			retry_after: meta_retry_after(meta),
		};
	}

	UpstreamAuthError::network(err)
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> UpstreamAuthError {
	UpstreamAuthError::TokenEndpoint {
		message: format!("HTTP client error occurred while calling the token endpoint: {message}"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
}

#[cfg(feature = "reqwest")]
fn map_unknown_transport_error(meta: Option<&ResponseMetadata>) -> UpstreamAuthError {
	UpstreamAuthError::TokenEndpoint {
		message: "HTTP client error occurred while calling the token endpoint".into(),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
