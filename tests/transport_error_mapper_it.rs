// self
use spotify_app_token::{
	_preludet::*,
	auth::ClientIdentity,
	cache::CredentialCache,
	error::{ConfigError, Error, UpstreamAuthError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	source::{ClientCredentialsSource, CredentialSource, TokenEndpoint},
};

type FakeSource = ClientCredentialsSource<FakeHttpClient, RecordingTransportErrorMapper>;

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient {
	retry_after: Duration,
}
impl FakeHttpClient {
	fn throttled(retry_after: Duration) -> Self {
		Self { retry_after }
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, retry_after: self.retry_after }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	retry_after: Duration,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let retry_after = self.retry_after;

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);
			assert_eq!(request.uri().path(), "/api/token");
			slot.store(ResponseMetadata { status: Some(429), retry_after: Some(retry_after) });

			Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Throttled)))
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	metadata: Arc<Mutex<Vec<Option<ResponseMetadata>>>>,
}
impl RecordingTransportErrorMapper {
	fn recorded_metadata(&self) -> Vec<Option<ResponseMetadata>> {
		self.metadata.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> UpstreamAuthError {
		let status = meta.and_then(|value| value.status);
		let retry_after = meta.and_then(|value| value.retry_after);

		self.metadata.lock().push(meta.cloned());

		match err {
			HttpClientError::Reqwest(inner) => UpstreamAuthError::TokenEndpoint {
				message: format!("Fake transport error: {inner}"),
				status,
				retry_after,
			},
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => inner.into(),
			other => UpstreamAuthError::TokenEndpoint {
				message: format!("Unhandled HTTP client error variant: {other:?}"),
				status,
				retry_after,
			},
		}
	}
}

fn build_endpoint() -> TokenEndpoint {
	TokenEndpoint::parse("https://accounts.example.com/api/token")
		.expect("Failed to parse mock token endpoint URL.")
}

#[tokio::test]
async fn fake_token_http_client_surfaces_metadata() {
	let http_client = Arc::new(FakeHttpClient::throttled(Duration::seconds(5)));
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let source: FakeSource =
		ClientCredentialsSource::with_http_client(build_endpoint(), http_client, mapper);
	let identity = ClientIdentity::new("throttled-client", "throttled-secret");
	let err = source
		.fetch_credential(&identity)
		.await
		.expect_err("Request should be throttled with HTTP 429.");

	match err {
		UpstreamAuthError::TokenEndpoint { status, retry_after, .. } => {
			assert_eq!(status, Some(429));
			assert_eq!(retry_after, Some(Duration::seconds(5)));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn fake_mapper_captures_response_metadata_through_cache() {
	let http_client = Arc::new(FakeHttpClient::throttled(Duration::seconds(30)));
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let source: FakeSource =
		ClientCredentialsSource::with_http_client(build_endpoint(), http_client, mapper.clone());
	let identity = ClientIdentity::new("metadata-client", "metadata-secret");
	let cache: CredentialCache<FakeSource> = CredentialCache::new(source, identity);
	let err = cache.get_credential().await.expect_err("Throttled exchanges should fail.");

	match err {
		Error::UpstreamAuth(UpstreamAuthError::TokenEndpoint { message, status, .. }) => {
			assert_eq!(message, "Fake transport error: Transport throttled.");
			assert_eq!(status, Some(429));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
	assert!(cache.cached().await.is_none());

	let recorded = mapper.recorded_metadata();

	assert_eq!(recorded.len(), 1);
	assert_eq!(
		recorded[0].as_ref().and_then(|meta| meta.retry_after),
		Some(Duration::seconds(30))
	);
}
