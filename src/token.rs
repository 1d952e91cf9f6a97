//! Token endpoint response model shared by transports, the cache, and the engine.
//!
//! A [`TokenResult`] is produced either by the wire transport (success, OAuth
//! protocol error, or transport failure folded into the error fields) or by
//! deserializing the raw payload bytes stored in the distributed cache. It is
//! immutable once constructed.

pub mod secret;
pub use secret::TokenSecret;

// self
use crate::_prelude::*;

/// Parse failure raised when a token payload cannot be deserialized.
#[derive(Debug, ThisError)]
#[error("Token payload is not valid JSON.")]
pub struct TokenParseError(#[from] serde_path_to_error::Error<serde_json::Error>);

/// Wire-level fields of a token endpoint response body.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct TokenPayload {
	#[serde(skip_serializing_if = "Option::is_none")]
	access_token: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	token_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	expires_in: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error_description: Option<String>,
}

/// Outcome of one token acquisition, protocol errors included.
///
/// OAuth errors and transport failures both surface through [`error`](Self::error)
/// rather than as a `Result::Err`, matching the token endpoint contract where an
/// error response is still a well-formed response. [`raw`](Self::raw) keeps the
/// exact payload bytes so the cache can round-trip the response without
/// re-serializing it.
#[derive(Clone)]
pub struct TokenResult {
	/// Access token secret; callers must avoid logging it.
	pub access_token: Option<TokenSecret>,
	/// Token type reported by the endpoint (usually `Bearer`).
	pub token_type: Option<String>,
	/// Reported lifetime in seconds, when present.
	pub expires_in: Option<i64>,
	/// OAuth error code, or a transport failure summary.
	pub error: Option<String>,
	/// Human-readable error detail supplied by the endpoint.
	pub error_description: Option<String>,
	/// Raw payload bytes as received from the endpoint or the cache.
	pub raw: Vec<u8>,
}
impl TokenResult {
	/// Deserializes a raw token payload, as received from the endpoint or read
	/// back from the cache.
	pub fn from_payload(raw: &[u8]) -> Result<Self, TokenParseError> {
		let mut deserializer = serde_json::Deserializer::from_slice(raw);
		let payload: TokenPayload = serde_path_to_error::deserialize(&mut deserializer)?;

		Ok(Self {
			access_token: payload.access_token.map(TokenSecret::new),
			token_type: payload.token_type,
			expires_in: payload.expires_in,
			error: payload.error,
			error_description: payload.error_description,
			raw: raw.to_vec(),
		})
	}

	/// Builds a successful bearer result with a synthesized payload.
	pub fn bearer(access_token: impl Into<String>, expires_in: Option<i64>) -> Self {
		let access_token = access_token.into();
		let payload = TokenPayload {
			access_token: Some(access_token.clone()),
			token_type: Some("Bearer".into()),
			expires_in,
			..TokenPayload::default()
		};
		let raw = serde_json::to_vec(&payload).unwrap_or_default();

		Self {
			access_token: Some(TokenSecret::new(access_token)),
			token_type: Some("Bearer".into()),
			expires_in,
			error: None,
			error_description: None,
			raw,
		}
	}

	/// Builds a protocol-error result with a synthesized payload.
	pub fn oauth_error(error: impl Into<String>, description: Option<String>) -> Self {
		let error = error.into();
		let payload = TokenPayload {
			error: Some(error.clone()),
			error_description: description.clone(),
			..TokenPayload::default()
		};
		let raw = serde_json::to_vec(&payload).unwrap_or_default();

		Self {
			access_token: None,
			token_type: None,
			expires_in: None,
			error: Some(error),
			error_description: description,
			raw,
		}
	}

	/// Folds a transport-level failure into an error result with no payload.
	pub fn failure(message: impl Into<String>) -> Self {
		Self {
			access_token: None,
			token_type: None,
			expires_in: None,
			error: Some(message.into()),
			error_description: None,
			raw: Vec::new(),
		}
	}

	/// Returns `true` when the result carries an error instead of a token.
	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}
}
impl Debug for TokenResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResult")
			.field("access_token", &self.access_token)
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("error", &self.error)
			.field("error_description", &self.error_description)
			.field("raw_len", &self.raw.len())
			.finish()
	}
}
