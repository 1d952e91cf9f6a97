//! Lazy token endpoint resolution from OIDC discovery metadata.
//!
//! A statically configured token endpoint always wins and the authority is
//! ignored. Otherwise the resolver fetches the authority's discovery document
//! once per resolver instance and caches the successful resolution for the
//! instance's lifetime; authority metadata changes require a new instance.
//! Failures are fatal, never retried within a call, and never cached.

// crates.io
use async_lock::OnceCell;
// self
use crate::_prelude::*;

/// Boxed future returned by [`DiscoveryFetcher`].
pub type DiscoveryFuture<'a> =
	Pin<Box<dyn Future<Output = Result<DiscoveryDocument, DiscoveryError>> + 'a + Send>>;

/// Subset of an OIDC discovery document the relay consumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDocument {
	/// Issuer advertised by the document.
	pub issuer: Option<String>,
	/// Token endpoint advertised by the document.
	pub token_endpoint: Option<Url>,
}

/// Discovery failure classification.
///
/// Failures are never cached by the resolver, so the next acquisition retries
/// the discovery request.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DiscoveryError {
	/// The discovery endpoint could not be reached or answered with an HTTP error.
	#[error("Discovery endpoint {authority} is unavailable: {reason}")]
	Unavailable {
		/// Authority whose discovery endpoint was queried.
		authority: String,
		/// Transport- or HTTP-level failure summary.
		reason: String,
	},
	/// The document violates the configured [`DiscoveryPolicy`].
	#[error("Policy error while contacting the discovery endpoint {authority}: {reason}")]
	PolicyViolation {
		/// Authority whose discovery endpoint was queried.
		authority: String,
		/// Violated policy rule.
		reason: String,
	},
	/// The document could not be parsed or is missing required fields.
	#[error("Error parsing discovery document from {authority}: {reason}")]
	Parse {
		/// Authority whose discovery endpoint was queried.
		authority: String,
		/// Parse failure summary.
		reason: String,
	},
}

/// Validation rules applied to a fetched discovery document.
#[derive(Clone, Debug)]
pub struct DiscoveryPolicy {
	/// Requires HTTPS for the advertised token endpoint; loopback hosts are
	/// exempt so local development setups keep working.
	pub require_https: bool,
	/// Requires the advertised issuer to match the configured authority.
	pub validate_issuer: bool,
}
impl Default for DiscoveryPolicy {
	fn default() -> Self {
		Self { require_https: true, validate_issuer: true }
	}
}

/// Wire-level discovery document fetcher; a thin external collaborator.
pub trait DiscoveryFetcher
where
	Self: Send + Sync,
{
	/// Fetches and deserializes the authority's discovery document.
	///
	/// Implementations classify transport and HTTP failures as
	/// [`DiscoveryError::Unavailable`] and malformed bodies as
	/// [`DiscoveryError::Parse`]; policy validation belongs to the resolver.
	fn fetch_discovery<'a>(&'a self, authority: &'a Url) -> DiscoveryFuture<'a>;
}

enum Endpoint {
	Static(Url),
	Discovered { authority: Url, policy: DiscoveryPolicy, resolved: OnceCell<Url> },
}

/// Lazily resolves and caches the token endpoint for one configuration instance.
pub struct TokenEndpointResolver(Endpoint);
impl TokenEndpointResolver {
	/// Creates a resolver that always returns the provided endpoint.
	pub fn static_endpoint(endpoint: Url) -> Self {
		Self(Endpoint::Static(endpoint))
	}

	/// Creates a resolver that discovers the endpoint from the authority.
	pub fn from_authority(authority: Url, policy: DiscoveryPolicy) -> Self {
		Self(Endpoint::Discovered { authority, policy, resolved: OnceCell::new() })
	}

	/// Resolves the token endpoint, fetching the discovery document at most
	/// once per resolver instance.
	pub async fn resolve(&self, fetcher: &dyn DiscoveryFetcher) -> Result<Url, DiscoveryError> {
		match &self.0 {
			Endpoint::Static(endpoint) => Ok(endpoint.clone()),
			Endpoint::Discovered { authority, policy, resolved } => resolved
				.get_or_try_init(|| async {
					let document = fetcher.fetch_discovery(authority).await?;

					validate_document(authority, policy, document)
				})
				.await
				.cloned(),
		}
	}
}
impl Debug for TokenEndpointResolver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match &self.0 {
			Endpoint::Static(endpoint) =>
				f.debug_struct("TokenEndpointResolver").field("static_endpoint", endpoint).finish(),
			Endpoint::Discovered { authority, resolved, .. } => f
				.debug_struct("TokenEndpointResolver")
				.field("authority", authority)
				.field("resolved", &resolved.get())
				.finish(),
		}
	}
}

fn validate_document(
	authority: &Url,
	policy: &DiscoveryPolicy,
	document: DiscoveryDocument,
) -> Result<Url, DiscoveryError> {
	let Some(token_endpoint) = document.token_endpoint else {
		return Err(DiscoveryError::Parse {
			authority: authority.to_string(),
			reason: "the document does not advertise a token_endpoint".into(),
		});
	};

	if policy.require_https && token_endpoint.scheme() != "https" && !is_loopback(&token_endpoint) {
		return Err(DiscoveryError::PolicyViolation {
			authority: authority.to_string(),
			reason: format!("token endpoint {token_endpoint} is not using HTTPS"),
		});
	}
	if policy.validate_issuer {
		let expected = authority.as_str().trim_end_matches('/');
		let advertised = document.issuer.as_deref().unwrap_or_default().trim_end_matches('/');

		if expected != advertised {
			return Err(DiscoveryError::PolicyViolation {
				authority: authority.to_string(),
				reason: format!("issuer `{advertised}` does not match the authority"),
			});
		}
	}

	Ok(token_endpoint)
}

fn is_loopback(url: &Url) -> bool {
	matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]" | "::1"))
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	struct StubFetcher {
		calls: AtomicUsize,
		response: Box<dyn Fn() -> Result<DiscoveryDocument, DiscoveryError> + Send + Sync>,
	}
	impl StubFetcher {
		fn new(
			response: impl 'static + Fn() -> Result<DiscoveryDocument, DiscoveryError> + Send + Sync,
		) -> Self {
			Self { calls: AtomicUsize::new(0), response: Box::new(response) }
		}
	}
	impl DiscoveryFetcher for StubFetcher {
		fn fetch_discovery<'a>(&'a self, _: &'a Url) -> DiscoveryFuture<'a> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			Box::pin(async { (self.response)() })
		}
	}

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	fn document(authority: &str, endpoint: &str) -> DiscoveryDocument {
		DiscoveryDocument {
			issuer: Some(authority.to_owned()),
			token_endpoint: Some(url(endpoint)),
		}
	}

	#[tokio::test]
	async fn static_endpoint_wins_without_fetching() {
		let resolver = TokenEndpointResolver::static_endpoint(url("https://idp.example/token"));
		let fetcher =
			StubFetcher::new(|| panic!("Static endpoints must never trigger discovery."));
		let endpoint =
			resolver.resolve(&fetcher).await.expect("Static resolution should succeed.");

		assert_eq!(endpoint.as_str(), "https://idp.example/token");
		assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn discovery_runs_once_per_resolver() {
		let resolver = TokenEndpointResolver::from_authority(
			url("https://idp.example"),
			DiscoveryPolicy::default(),
		);
		let fetcher = StubFetcher::new(|| {
			Ok(document("https://idp.example", "https://idp.example/connect/token"))
		});

		for _ in 0..3 {
			let endpoint =
				resolver.resolve(&fetcher).await.expect("Discovery resolution should succeed.");

			assert_eq!(endpoint.as_str(), "https://idp.example/connect/token");
		}

		assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn failures_are_not_cached() {
		let resolver = TokenEndpointResolver::from_authority(
			url("https://idp.example"),
			DiscoveryPolicy::default(),
		);
		let fetcher = StubFetcher::new(|| {
			Err(DiscoveryError::Unavailable {
				authority: "https://idp.example/".into(),
				reason: "connection refused".into(),
			})
		});

		for _ in 0..2 {
			let error = resolver
				.resolve(&fetcher)
				.await
				.expect_err("Unavailable discovery should fail resolution.");

			assert!(matches!(error, DiscoveryError::Unavailable { .. }));
		}

		assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2, "Failures must be retried.");
	}

	#[tokio::test]
	async fn policy_rejects_plain_http_and_foreign_issuers() {
		let authority = url("https://idp.example");
		let insecure = DiscoveryDocument {
			issuer: Some("https://idp.example".into()),
			token_endpoint: Some(url("http://idp.example/token")),
		};
		let error = validate_document(&authority, &DiscoveryPolicy::default(), insecure)
			.expect_err("Plain HTTP endpoints should violate the default policy.");

		assert!(matches!(error, DiscoveryError::PolicyViolation { .. }));
		assert!(error.to_string().contains("not using HTTPS"));

		let foreign = document("https://evil.example", "https://idp.example/token");
		let error = validate_document(&authority, &DiscoveryPolicy::default(), foreign)
			.expect_err("Issuer mismatches should violate the default policy.");

		assert!(error.to_string().contains("does not match the authority"));
	}

	#[tokio::test]
	async fn loopback_endpoints_are_exempt_from_https() {
		let authority = url("http://127.0.0.1:8080");
		let local = document("http://127.0.0.1:8080", "http://127.0.0.1:8080/token");
		let endpoint = validate_document(&authority, &DiscoveryPolicy::default(), local)
			.expect("Loopback endpoints should pass the default policy.");

		assert_eq!(endpoint.port(), Some(8080));
	}

	#[test]
	fn missing_token_endpoint_is_a_parse_failure() {
		let authority = url("https://idp.example");
		let empty = DiscoveryDocument { issuer: None, token_endpoint: None };
		let error = validate_document(&authority, &DiscoveryPolicy::default(), empty)
			.expect_err("A document without a token endpoint cannot resolve.");

		assert!(matches!(error, DiscoveryError::Parse { .. }));
	}
}
