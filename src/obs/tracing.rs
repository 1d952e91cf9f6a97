// self
use crate::{_prelude::*, obs::GrantKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedAcquisition<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedAcquisition<F> = F;

/// A span builder used by acquisition waves.
#[derive(Clone, Debug)]
pub struct AcquisitionSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl AcquisitionSpan {
	/// Creates a new span tagged with the provided grant kind + stage.
	pub fn new(kind: GrantKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("token_relay.acquisition", grant = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedAcquisition<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a swallowed cache failure (when tracing is enabled).
pub(crate) fn warn_cache(op: &'static str, message: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(op, message, "token cache operation failed");

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (op, message);
	}
}
