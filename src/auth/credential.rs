//! Cached app-token credential, its lifecycle helpers, and builder.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Lifecycle status of a cached credential from the cache's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
	/// The credential may still be handed to callers.
	Valid,
	/// The safety window has been reached; the next caller must refresh.
	Expired,
}

/// Errors produced by [`CredentialBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialBuilderError {
	/// Issued when no access token value (or a blank one) was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no lifetime was configured.
	#[error("Credential lifetime must be supplied.")]
	MissingLifetime,
	/// Issued when `issued_at + lifetime` is not a representable instant.
	#[error("Credential lifetime exceeds the supported time range.")]
	LifetimeOutOfRange,
}

/// Bearer credential obtained through the client-credentials grant.
///
/// `valid_until` is always `issued_at + max(0, lifetime - safety_margin)`, so a credential handed
/// out by the cache keeps a grace window before `expires_at`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Bearer value; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type reported upstream (normally `Bearer`).
	pub token_type: String,
	/// Instant the exchange started.
	pub issued_at: OffsetDateTime,
	/// Upstream-declared expiry (`issued_at + expires_in`).
	pub expires_at: OffsetDateTime,
	/// Instant after which the cache stops serving this credential.
	pub valid_until: OffsetDateTime,
}
impl Credential {
	/// Default margin subtracted from the declared lifetime.
	pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::seconds(30);

	/// Returns a builder seeded with the default safety margin.
	pub fn builder() -> CredentialBuilder {
		CredentialBuilder::default()
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> CredentialStatus {
		if instant >= self.valid_until { CredentialStatus::Expired } else { CredentialStatus::Valid }
	}

	/// Returns `true` if the credential may be served at the provided instant.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), CredentialStatus::Valid)
	}

	/// Time left before the cache stops serving the credential, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.valid_until - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("valid_until", &self.valid_until)
			.finish()
	}
}

/// Builder for [`Credential`].
#[derive(Clone, Debug)]
pub struct CredentialBuilder {
	access_token: Option<TokenSecret>,
	token_type: Option<String>,
	issued_at: Option<OffsetDateTime>,
	lifetime: Option<Duration>,
	safety_margin: Duration,
}
impl CredentialBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the token type (defaults to `Bearer`).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets the upstream-declared lifetime (`expires_in`).
	pub fn lifetime(mut self, lifetime: Duration) -> Self {
		self.lifetime = Some(lifetime);

		self
	}

	/// Overrides the safety margin; negative values clamp to zero.
	pub fn safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Consumes the builder and produces a [`Credential`].
	pub fn build(self) -> Result<Credential, CredentialBuilderError> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_blank())
			.ok_or(CredentialBuilderError::MissingAccessToken)?;
		let lifetime = self.lifetime.ok_or(CredentialBuilderError::MissingLifetime)?;
		let lifetime = if lifetime.is_negative() { Duration::ZERO } else { lifetime };
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let usable = lifetime.checked_sub(self.safety_margin).unwrap_or(Duration::ZERO);
		let usable = if usable.is_negative() { Duration::ZERO } else { usable };

		let expires_at =
			issued_at.checked_add(lifetime).ok_or(CredentialBuilderError::LifetimeOutOfRange)?;
		let valid_until =
			issued_at.checked_add(usable).ok_or(CredentialBuilderError::LifetimeOutOfRange)?;

		Ok(Credential {
			access_token,
			token_type: self.token_type.unwrap_or_else(|| "Bearer".into()),
			issued_at,
			expires_at,
			valid_until,
		})
	}
}
impl Default for CredentialBuilder {
	fn default() -> Self {
		Self {
			access_token: None,
			token_type: None,
			issued_at: None,
			lifetime: None,
			safety_margin: Credential::DEFAULT_SAFETY_MARGIN,
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn margin_is_subtracted_from_lifetime() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let credential = Credential::builder()
			.access_token("T1")
			.issued_at(issued)
			.lifetime(Duration::seconds(3600))
			.build()
			.expect("Credential builder should succeed for a standard lifetime.");

		assert_eq!(credential.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert_eq!(credential.valid_until, issued + Duration::seconds(3570));
		assert_eq!(credential.token_type, "Bearer");
		assert!(credential.valid_until < credential.expires_at);
	}

	#[test]
	fn short_lifetimes_never_go_negative() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);

		for secs in [0, 1, 29, 30] {
			let credential = Credential::builder()
				.access_token("short")
				.issued_at(issued)
				.lifetime(Duration::seconds(secs))
				.build()
				.expect("Credential builder should accept short lifetimes.");

			assert_eq!(credential.valid_until, issued, "lifetime {secs}s");
			assert_eq!(credential.status_at(issued), CredentialStatus::Expired);
		}
	}

	#[test]
	fn status_flips_exactly_at_valid_until() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let credential = Credential::builder()
			.access_token("T1")
			.issued_at(issued)
			.lifetime(Duration::seconds(3600))
			.build()
			.expect("Credential builder should succeed.");

		assert!(credential.is_valid_at(issued + Duration::seconds(3569)));
		assert_eq!(
			credential.status_at(issued + Duration::seconds(3570)),
			CredentialStatus::Expired
		);
		assert_eq!(credential.remaining_at(issued + Duration::seconds(3569)), Duration::SECOND);
		assert_eq!(credential.remaining_at(issued + Duration::hours(2)), Duration::ZERO);
	}

	#[test]
	fn builder_rejects_missing_fields() {
		let err = Credential::builder()
			.access_token("  ")
			.lifetime(Duration::seconds(60))
			.build()
			.expect_err("Blank access tokens should be rejected.");

		assert_eq!(err, CredentialBuilderError::MissingAccessToken);

		let err = Credential::builder()
			.access_token("T1")
			.build()
			.expect_err("Missing lifetimes should be rejected.");

		assert_eq!(err, CredentialBuilderError::MissingLifetime);
	}

	#[test]
	fn unrepresentable_expiry_is_an_error() {
		let err = Credential::builder()
			.access_token("T1")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.lifetime(Duration::seconds(1 << 45))
			.build()
			.expect_err("Expiry instants past the supported range should be rejected.");

		assert_eq!(err, CredentialBuilderError::LifetimeOutOfRange);
	}

	#[test]
	fn custom_margin_applies() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let credential = Credential::builder()
			.access_token("T1")
			.issued_at(issued)
			.lifetime(Duration::seconds(100))
			.safety_margin(Duration::seconds(-5))
			.build()
			.expect("Negative margins should clamp to zero.");

		assert_eq!(credential.valid_until, credential.expires_at);
	}
}
