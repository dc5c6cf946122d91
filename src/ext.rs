//! Downstream helpers that attach cached app tokens to Web API requests.
//!
//! The crate stops at the `Authorization` header and base URL; endpoint workflows (search,
//! playlists, …) are left to callers.

pub mod request_signer;
#[cfg(feature = "reqwest")] pub mod api_client;

#[cfg(feature = "reqwest")] pub use api_client::*;
pub use request_signer::*;
