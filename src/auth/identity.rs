//! Client identity (id + secret) used to request app tokens.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Supplies the client identity each time the cache decides to refresh.
///
/// Implementations are consulted on every refresh rather than once at startup, so a value
/// changed at runtime is picked up by the next exchange without rebuilding the cache.
pub trait IdentitySource
where
	Self: Send + Sync,
{
	/// Resolves the current identity. Blank fields are reported by the caller, not here.
	fn client_identity(&self) -> ClientIdentity;
}

/// OAuth 2.0 client id/secret pair.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
	/// Public client identifier.
	pub client_id: String,
	/// Confidential client secret; callers must avoid logging it.
	pub client_secret: TokenSecret,
}
impl ClientIdentity {
	/// Creates an identity from raw id and secret strings.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: TokenSecret::new(client_secret) }
	}

	/// Returns `true` when both halves are non-blank.
	pub fn is_complete(&self) -> bool {
		self.missing_fields().is_none()
	}

	/// Fails with [`Error::MissingCredentials`] when either half is blank.
	pub fn ensure_complete(&self) -> Result<()> {
		match self.missing_fields() {
			Some(fields) => Err(Error::MissingCredentials { fields }),
			None => Ok(()),
		}
	}

	fn missing_fields(&self) -> Option<&'static str> {
		match (self.client_id.trim().is_empty(), self.client_secret.is_blank()) {
			(true, true) => Some("client_id, client_secret"),
			(true, false) => Some("client_id"),
			(false, true) => Some("client_secret"),
			(false, false) => None,
		}
	}
}
impl IdentitySource for ClientIdentity {
	fn client_identity(&self) -> ClientIdentity {
		self.clone()
	}
}
impl<T> IdentitySource for Arc<T>
where
	T: ?Sized + IdentitySource,
{
	fn client_identity(&self) -> ClientIdentity {
		(**self).client_identity()
	}
}
impl Debug for ClientIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientIdentity")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.finish()
	}
}
