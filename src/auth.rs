//! Auth-domain models: client identity, redacted secrets, and cached credentials.

pub mod credential;
pub mod identity;
pub mod secret;

pub use credential::*;
pub use identity::*;
pub use secret::*;
