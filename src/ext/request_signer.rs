//! Request signing contracts that let callers attach cache-issued bearer values to arbitrary
//! HTTP clients.

// std
use std::convert::Infallible;
// self
use crate::auth::TokenSecret;

/// Describes how to attach a bearer value to an outbound request without constraining the
/// HTTP client type.
pub trait RequestSigner<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the provided request and injects `Authorization: Bearer <token>`.
	fn attach_token(&self, request: Request, token: &TokenSecret) -> Result<Request, Error>;
}

/// Signer for reqwest request builders.
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerSigner;
#[cfg(feature = "reqwest")]
impl RequestSigner<reqwest::RequestBuilder, Infallible> for BearerSigner {
	fn attach_token(
		&self,
		request: reqwest::RequestBuilder,
		token: &TokenSecret,
	) -> Result<reqwest::RequestBuilder, Infallible> {
		Ok(request.bearer_auth(token.expose()))
	}
}
impl RequestSigner<Vec<(String, String)>, Infallible> for BearerSigner {
	fn attach_token(
		&self,
		mut headers: Vec<(String, String)>,
		token: &TokenSecret,
	) -> Result<Vec<(String, String)>, Infallible> {
		headers.retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
		headers.push(("Authorization".into(), token.bearer()));

		Ok(headers)
	}
}
