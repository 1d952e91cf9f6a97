//! Non-interactive OAuth 2.0 token relay for outbound HTTP: cached, deduplicated bearer
//! tokens for the client-credentials, password, refresh-token, and delegation grants.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod events;
#[cfg(feature = "reqwest")] pub mod ext;
pub mod http;
pub mod obs;
pub mod provider;
pub mod singleflight;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::ReqwestTokenTransport,
		provider::{TokenClientOptions, TokenClientOptionsBuilder},
	};

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTokenTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTokenTransport::with_client(client)
	}

	/// Starts an options builder prefilled with test client credentials and a static token
	/// endpoint, the setup shared across integration tests.
	pub fn test_options(token_endpoint: &str) -> TokenClientOptionsBuilder {
		TokenClientOptions::builder().client_id("test-client").client_secret("test-secret").token_endpoint(
			Url::parse(token_endpoint).expect("Mock token endpoint should parse successfully."),
		)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")] pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
