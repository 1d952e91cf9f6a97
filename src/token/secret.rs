//! Redacted wrapper for relayed bearer material.

// self
use crate::_prelude::*;

/// A bearer token or client credential whose formatters never print the value.
///
/// Every secret the relay handles travels in this wrapper: the configured
/// client secret, retrieved resource owner passwords, inbound and refresh
/// tokens, and the access tokens handed back to callers. Attaching one to an
/// outbound request goes through [`expose`](Self::expose); `Debug` and
/// `Display` only ever emit a placeholder, so request and acquisition logs
/// cannot leak it.
#[derive(Clone)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps the secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw secret for use in a request; never log the result.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
