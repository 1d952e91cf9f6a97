//! Identity retrieval contracts feeding the grant providers.
//!
//! Retrievers answer `None` when the ambient identity is absent; providers
//! turn that into an unauthenticated outcome without touching the engine.
//! Implementations typically bridge a web framework's request context
//! (task-locals, extensions) to the relay; the `Static*` implementations
//! cover fixed-identity setups and tests.

// self
use crate::{_prelude::*, token::secret::TokenSecret};

/// Boxed future returned by retriever implementations.
pub type RetrievalFuture<'a, T> = Pin<Box<dyn Future<Output = Option<T>> + 'a + Send>>;

/// Resource owner credentials consumed by the password grant.
#[derive(Clone, Debug)]
pub struct UserCredentials {
	/// Resource owner username.
	pub username: String,
	/// Resource owner password.
	pub password: TokenSecret,
}
impl UserCredentials {
	/// Bundles a username/password pair.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self { username: username.into(), password: TokenSecret::new(password) }
	}
}

/// Supplies the resource owner credentials for the password grant.
pub trait UserCredentialsRetriever
where
	Self: Send + Sync,
{
	/// Returns the ambient resource owner credentials, if any.
	fn user_credentials(&self) -> RetrievalFuture<'_, UserCredentials>;
}

/// Supplies the refresh token for the refresh-token grant.
pub trait RefreshTokenRetriever
where
	Self: Send + Sync,
{
	/// Returns the ambient refresh token, if any.
	fn refresh_token(&self) -> RetrievalFuture<'_, TokenSecret>;
}

/// Supplies the inbound bearer token for delegation and pass-through.
pub trait InboundTokenRetriever
where
	Self: Send + Sync,
{
	/// Returns the inbound request's bearer token, if any.
	fn inbound_token(&self) -> RetrievalFuture<'_, TokenSecret>;
}

/// Fixed resource owner credentials.
#[derive(Clone, Debug)]
pub struct StaticUserCredentials(pub UserCredentials);
impl UserCredentialsRetriever for StaticUserCredentials {
	fn user_credentials(&self) -> RetrievalFuture<'_, UserCredentials> {
		Box::pin(async move { Some(self.0.clone()) })
	}
}

/// Fixed refresh token.
#[derive(Clone, Debug)]
pub struct StaticRefreshToken(pub TokenSecret);
impl RefreshTokenRetriever for StaticRefreshToken {
	fn refresh_token(&self) -> RetrievalFuture<'_, TokenSecret> {
		Box::pin(async move { Some(self.0.clone()) })
	}
}

/// Fixed inbound bearer token.
#[derive(Clone, Debug)]
pub struct StaticInboundToken(pub TokenSecret);
impl InboundTokenRetriever for StaticInboundToken {
	fn inbound_token(&self) -> RetrievalFuture<'_, TokenSecret> {
		Box::pin(async move { Some(self.0.clone()) })
	}
}

/// Extracts the token from an `Authorization` header value under the given
/// scheme; the scheme comparison is case-insensitive per RFC 7235.
pub fn token_from_header<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
	let (found, token) = value.split_once(' ')?;
	let token = token.trim();

	(found.eq_ignore_ascii_case(scheme) && !token.is_empty()).then_some(token)
}

/// Extracts a `Bearer` token from an `Authorization` header value.
pub fn bearer_from_header(value: &str) -> Option<&str> {
	token_from_header(value, "Bearer")
}
