//! Demonstrates the app-token cache against a mock Accounts service: the first call exchanges
//! the client identity, later calls reuse the cached bearer until it nears expiry.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use spotify_app_token::{
	auth::ClientIdentity,
	cache::ReqwestCredentialCache,
	ext::ApiClient,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	reqwest::Client,
	source::{ReqwestCredentialSource, TokenEndpoint},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/browse/new-releases")
				.header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body("{\"albums\":{}}");
		})
		.await;
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()?;
	let source = ReqwestCredentialSource::with_http_client(
		TokenEndpoint::new(Url::parse(&server.url("/api/token"))?)?,
		ReqwestHttpClient::with_client(client.clone()),
		Arc::new(ReqwestTransportErrorMapper),
	);
	let identity = ClientIdentity::new("demo-client", "demo-secret");
	let cache = Arc::new(ReqwestCredentialCache::new(source, identity));
	let first = cache.get_credential().await?;
	let second = cache.get_credential().await?;

	println!("Reusable access token: {}.", first.expose());
	println!("Served from cache: {}.", first == second);

	let api = ApiClient::new(client, Url::parse(&server.url("/v1"))?, cache.clone());
	let response = api.get("browse/new-releases").await?.send().await?;

	println!("New releases responded with {}.", response.status());
	println!("Cache metrics: {:?}.", cache.metrics());

	token_mock.assert_async().await;
	api_mock.assert_async().await;

	Ok(())
}
