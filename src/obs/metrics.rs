// self
use crate::obs::{AcquisitionOutcome, CacheLookup, GrantKind};

/// Records an acquisition outcome via the global metrics recorder (when enabled).
pub fn record_acquisition_outcome(kind: GrantKind, outcome: AcquisitionOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"token_relay_acquisition_total",
			"grant" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a cache lookup result via the global metrics recorder (when enabled).
pub fn record_cache_lookup(result: CacheLookup) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("token_relay_cache_total", "result" => result.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = result;
	}
}
