//! Acquisition event hooks.
//!
//! Events fire exactly once per settled fetch wave, not once per coalesced
//! caller, and never for cache hits. Both hooks default to no-ops.

// self
use crate::{_prelude::*, token::TokenResult};

type EventFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type EventHandler = Arc<dyn Fn(TokenResult) -> EventFuture + Send + Sync>;

/// Fire-and-observe callbacks invoked when a token fetch settles.
#[derive(Clone, Default)]
pub struct TokenEvents {
	on_token_acquired: Option<EventHandler>,
	on_token_request_failed: Option<EventHandler>,
}
impl TokenEvents {
	/// Creates event hooks with both callbacks unset.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the callback invoked after a successful token fetch.
	pub fn on_token_acquired<F, Fut>(mut self, handler: F) -> Self
	where
		F: 'static + Fn(TokenResult) -> Fut + Send + Sync,
		Fut: 'static + Future<Output = ()> + Send,
	{
		self.on_token_acquired = Some(Arc::new(move |token| Box::pin(handler(token))));

		self
	}

	/// Sets the callback invoked after the token endpoint returns an error.
	pub fn on_token_request_failed<F, Fut>(mut self, handler: F) -> Self
	where
		F: 'static + Fn(TokenResult) -> Fut + Send + Sync,
		Fut: 'static + Future<Output = ()> + Send,
	{
		self.on_token_request_failed = Some(Arc::new(move |token| Box::pin(handler(token))));

		self
	}

	/// Notifies the acquired hook, if set.
	pub async fn token_acquired(&self, token: &TokenResult) {
		if let Some(handler) = &self.on_token_acquired {
			handler(token.clone()).await;
		}
	}

	/// Notifies the failure hook, if set.
	pub async fn token_request_failed(&self, token: &TokenResult) {
		if let Some(handler) = &self.on_token_request_failed {
			handler(token.clone()).await;
		}
	}
}
impl Debug for TokenEvents {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEvents")
			.field("on_token_acquired_set", &self.on_token_acquired.is_some())
			.field("on_token_request_failed_set", &self.on_token_request_failed.is_some())
			.finish()
	}
}
