//! Process-wide app-token cache with single-flight refresh.
//!
//! [`CredentialCache::get_credential`] serves the cached credential while the clock is before
//! its `valid_until` instant and otherwise refreshes through a [`CredentialSource`]. The whole
//! check-and-maybe-refresh sequence runs under one async mutex, so concurrent callers that find
//! the cache empty or stale queue behind a single exchange and then observe its result: the new
//! credential on success, or the same error on failure. A failed refresh leaves the previously
//! stored entry untouched, and the next caller to arrive after the failure retries from
//! scratch. Nothing here retries or backs off on its own.

mod metrics;

pub use metrics::CacheMetrics;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, Credential, CredentialBuilderError, IdentitySource, TokenSecret},
	clock::{Clock, SystemClock},
	error::UpstreamAuthError,
	obs::{self, CacheOp, CacheOutcome, CacheSpan},
	source::CredentialSource,
};
#[cfg(feature = "reqwest")]
use crate::{
	config::Config,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	source::{ClientCredentialsSource, ReqwestCredentialSource},
};

#[cfg(feature = "reqwest")]
/// Cache specialized for the crate's default reqwest-backed client-credentials source.
pub type ReqwestCredentialCache = CredentialCache<ReqwestCredentialSource>;

/// Owns the single cached credential and refreshes it on demand.
///
/// Share one instance (behind an [`Arc`] or a `static` `OnceLock`) across every caller that
/// needs the app token; separate instances do not coordinate with each other.
pub struct CredentialCache<S>
where
	S: ?Sized + CredentialSource,
{
	source: Arc<S>,
	identity: Arc<dyn IdentitySource>,
	clock: Arc<dyn Clock>,
	safety_margin: Duration,
	state: AsyncMutex<CacheState>,
	completed: AtomicU64,
	metrics: Arc<CacheMetrics>,
}
impl<S> CredentialCache<S>
where
	S: ?Sized + CredentialSource,
{
	/// Creates an empty cache refreshing through `source` with identities from `identity`.
	pub fn new(source: impl Into<Arc<S>>, identity: impl 'static + IdentitySource) -> Self {
		Self {
			source: source.into(),
			identity: Arc::new(identity),
			clock: Arc::new(SystemClock),
			safety_margin: Credential::DEFAULT_SAFETY_MARGIN,
			state: AsyncMutex::new(CacheState::default()),
			completed: AtomicU64::new(0),
			metrics: Default::default(),
		}
	}

	/// Replaces the clock used for validity checks and issued-at stamps.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Overrides the safety margin (30 seconds by default); negative values clamp to zero.
	pub fn with_safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Returns the credential source.
	pub fn source(&self) -> &Arc<S> {
		&self.source
	}

	/// Returns the shared activity counters.
	pub fn metrics(&self) -> &Arc<CacheMetrics> {
		&self.metrics
	}

	/// Returns a currently valid bearer value, refreshing first when the cache is empty or
	/// stale.
	///
	/// # Errors
	///
	/// - [`Error::MissingCredentials`] when the identity source yields a blank id or secret; the
	///   credential source is not contacted.
	/// - [`Error::UpstreamAuth`] when the exchange fails; the cached entry is left unchanged.
	pub async fn get_credential(&self) -> Result<TokenSecret> {
		const OP: CacheOp = CacheOp::GetCredential;

		let span = CacheSpan::new(OP, "get_credential");

		obs::record_cache_outcome(OP, CacheOutcome::Attempt);

		span.instrument(async {
			let ticket = self.completed.load(Ordering::Acquire);
			let mut state = self.state.lock().await;
			let now = self.clock.now();

			if let Some(current) = state.credential.as_ref().filter(|c| c.is_valid_at(now)) {
				self.metrics.record_hit();
				obs::record_cache_outcome(OP, CacheOutcome::Hit);

				return Ok(current.access_token.clone());
			}
			// A refresh finished while this caller was queued on the lock; share its outcome even
			// when the new credential is already inside its safety window.
			if let Some(outcome) = state.outcome_since(ticket) {
				match &outcome {
					Ok(_) => {
						self.metrics.record_hit();
						obs::record_cache_outcome(OP, CacheOutcome::Hit);
					},
					Err(_) => obs::record_cache_outcome(OP, CacheOutcome::Failure),
				}

				return outcome;
			}

			let sequence = self.completed.load(Ordering::Acquire) + 1;
			let result = self.refresh_locked(now).await.map(|credential| {
				let value = credential.access_token.clone();

				state.credential = Some(credential);

				value
			});

			state.last_refresh = Some(CompletedRefresh { sequence, result: result.clone() });
			self.completed.store(sequence, Ordering::Release);

			match &result {
				Ok(_) => obs::record_cache_outcome(OP, CacheOutcome::Success),
				Err(_) => obs::record_cache_outcome(OP, CacheOutcome::Failure),
			}

			result
		})
		.await
	}

	/// Convenience wrapper returning `Bearer <value>` for an `Authorization` header.
	pub async fn bearer_header(&self) -> Result<String> {
		Ok(self.get_credential().await?.bearer())
	}

	/// Returns a snapshot of the stored credential without refreshing it.
	pub async fn cached(&self) -> Option<Credential> {
		self.state.lock().await.credential.clone()
	}

	// Must only run while the state lock is held.
	async fn refresh_locked(&self, issued_at: OffsetDateTime) -> Result<Credential> {
		const OP: CacheOp = CacheOp::Refresh;

		let span = CacheSpan::new(OP, "refresh");

		obs::record_cache_outcome(OP, CacheOutcome::Attempt);

		let identity = self.identity.client_identity();
		let result = span.instrument(self.exchange(&identity, issued_at)).await;

		match &result {
			Ok(credential) => {
				self.metrics.record_refresh();
				span.record_refreshed(credential.remaining_at(issued_at));
				obs::record_cache_outcome(OP, CacheOutcome::Success);
			},
			Err(err) => {
				self.metrics.record_failure();
				span.record_failure(err);
				obs::record_cache_outcome(OP, CacheOutcome::Failure);
			},
		}

		result
	}

	async fn exchange(
		&self,
		identity: &ClientIdentity,
		issued_at: OffsetDateTime,
	) -> Result<Credential> {
		identity.ensure_complete()?;
		self.metrics.record_source_call();

		let issued = self.source.fetch_credential(identity).await?;

		Credential::builder()
			.access_token(issued.access_token.expose())
			.token_type(issued.token_type)
			.issued_at(issued_at)
			.lifetime(issued.lifetime)
			.safety_margin(self.safety_margin)
			.build()
			.map_err(map_credential_builder_error)
	}
}
#[cfg(feature = "reqwest")]
impl CredentialCache<ReqwestCredentialSource> {
	/// Builds a cache whose endpoint, timeout, and identity all come from `config`.
	///
	/// The identity is re-resolved from `config` on every refresh, so overrides set later are
	/// honored without rebuilding the cache.
	pub fn from_config(config: Arc<Config>) -> Result<Self> {
		let endpoint = config.token_endpoint()?;
		let http_client = ReqwestHttpClient::default().with_timeout(config.http_timeout()?);
		let source = ClientCredentialsSource::with_http_client(
			endpoint,
			http_client,
			Arc::new(ReqwestTransportErrorMapper),
		);

		Ok(Self::new(source, config))
	}
}
impl<S> Debug for CredentialCache<S>
where
	S: ?Sized + CredentialSource,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialCache")
			.field("safety_margin", &self.safety_margin)
			.field("metrics", &self.metrics)
			.finish()
	}
}

#[derive(Default)]
struct CacheState {
	credential: Option<Credential>,
	last_refresh: Option<CompletedRefresh>,
}
impl CacheState {
	fn outcome_since(&self, ticket: u64) -> Option<Result<TokenSecret>> {
		self.last_refresh
			.as_ref()
			.filter(|refresh| refresh.sequence > ticket)
			.map(|refresh| refresh.result.clone())
	}
}

struct CompletedRefresh {
	sequence: u64,
	result: Result<TokenSecret>,
}

fn map_credential_builder_error(err: CredentialBuilderError) -> Error {
	match err {
		CredentialBuilderError::MissingAccessToken => UpstreamAuthError::EmptyAccessToken.into(),
		CredentialBuilderError::MissingLifetime => UpstreamAuthError::MissingExpiresIn.into(),
		CredentialBuilderError::LifetimeOutOfRange => UpstreamAuthError::ExpiresInOutOfRange.into(),
	}
}
