// crates.io
use httpmock::prelude::*;
// self
use spotify_app_token::{
	_preludet::*,
	cache::ReqwestCredentialCache,
	config::{self, Config},
	error::{ConfigError, Error},
	ext::ApiClient,
};

#[tokio::test]
async fn api_requests_carry_cached_bearer() {
	let server = MockServer::start_async().await;
	let (cache, _clock) =
		build_reqwest_test_cache(&server.url("/api/token"), "api-client", "api-secret");
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"T1\",\"token_type\":\"Bearer\",\"expires_in\":3600}");
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/search").header("authorization", "Bearer T1");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let base_url = Url::parse(&server.url("/v1")).expect("Mock base URL should parse.");
	let api = ApiClient::new((*test_reqwest_http_client()).clone(), base_url, Arc::new(cache));

	for _ in 0..2 {
		let response = api
			.get("/search")
			.await
			.expect("Signed request should be built.")
			.send()
			.await
			.expect("Mock API should respond.");

		assert_eq!(response.status().as_u16(), 200);
	}

	token_mock.assert_calls_async(1).await;
	api_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn config_driven_cache_reports_missing_secret_without_network() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200).body("{}");
		})
		.await;
	let config = Arc::new(
		Config::builder()
			.without_env()
			.override_value(config::TOKEN_URL, server.url("/api/token"))
			.override_value(config::CLIENT_ID, "configured-client")
			.build()
			.expect("Override-only configuration should build."),
	);
	let cache = ReqwestCredentialCache::from_config(config.clone())
		.expect("Valid endpoint configuration should build a cache.");
	let err = cache.get_credential().await.expect_err("Blank secrets should be reported.");

	assert!(matches!(err, Error::MissingCredentials { fields: "client_secret" }));

	let api = ApiClient::from_config(ReqwestClient::new(), &config, Arc::new(cache))
		.expect("Default base URL should parse.");
	let err = api.get("me").await.expect_err("Unsigned requests should never be produced.");

	assert!(matches!(err, Error::MissingCredentials { .. }));
	assert_eq!(
		api.url("me").expect("Paths should join onto the base URL.").as_str(),
		"https://api.spotify.com/v1/me"
	);

	mock.assert_calls_async(0).await;
}

#[test]
fn insecure_token_url_is_a_config_error() {
	let config = Config::builder()
		.without_env()
		.override_value(config::TOKEN_URL, "http://accounts.example.com/api/token")
		.build()
		.expect("Override-only configuration should build.");
	let err = ReqwestCredentialCache::from_config(Arc::new(config))
		.expect_err("Plain HTTP token endpoints should be refused.");

	assert!(matches!(err, Error::Config(ConfigError::InsecureEndpoint { .. })));
}
