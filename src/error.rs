//! Relay-level error types shared across providers, the engine, and discovery.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Discovery document resolution failed; always fatal and never retried.
	#[error(transparent)]
	Discovery(#[from] crate::discovery::DiscoveryError),

	/// Token endpoint rejected the grant while the engine runs in
	/// [`FailurePolicy::Propagate`](crate::engine::FailurePolicy) mode.
	#[error("Token retrieval failed: {error} {description}")]
	Retrieval {
		/// OAuth error code returned by the token endpoint.
		error: String,
		/// Error description returned by the token endpoint, empty when absent.
		description: String,
	},
}

/// Configuration and validation failures raised when building providers.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// A client identifier is required for every grant.
	#[error("Client id must be set.")]
	MissingClientId,
	/// A client secret is required for every grant.
	#[error("Client secret must be set.")]
	MissingClientSecret,
	/// Without an endpoint the relay has nowhere to send token requests.
	#[error("Either an authority or a static token endpoint must be set.")]
	MissingEndpoint,
	/// Caching cannot be enabled without somewhere to store tokens.
	#[error("Caching is enabled but no cache backend was configured.")]
	MissingCacheBackend,
}
