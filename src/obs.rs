//! Optional observability helpers for token acquisition.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `token_relay.acquisition` with the `grant`
//!   and `stage` fields, plus warnings for swallowed cache failures.
//! - Enable `metrics` to increment the `token_relay_acquisition_total` counter for every
//!   attempt/success/failure, labeled by `grant` + `outcome`, and the
//!   `token_relay_cache_total` counter for every cache lookup, labeled by `result`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Grant kinds observed by the relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantKind {
	/// Client Credentials grant.
	ClientCredentials,
	/// Resource Owner Password grant.
	Password,
	/// Refresh token grant.
	RefreshToken,
	/// Delegation (token exchange) grant.
	Delegation,
}
impl GrantKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantKind::ClientCredentials => "client_credentials",
			GrantKind::Password => "password",
			GrantKind::RefreshToken => "refresh_token",
			GrantKind::Delegation => "delegation",
		}
	}
}
impl Display for GrantKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each acquisition wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AcquisitionOutcome {
	/// Entry to an acquisition wave.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the waiters.
	Failure,
}
impl AcquisitionOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AcquisitionOutcome::Attempt => "attempt",
			AcquisitionOutcome::Success => "success",
			AcquisitionOutcome::Failure => "failure",
		}
	}
}
impl Display for AcquisitionOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result labels recorded for each cache lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheLookup {
	/// A fresh entry was served.
	Hit,
	/// No usable entry was found.
	Miss,
	/// The backend failed or returned a malformed entry.
	Error,
}
impl CacheLookup {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheLookup::Hit => "hit",
			CacheLookup::Miss => "miss",
			CacheLookup::Error => "error",
		}
	}
}
impl Display for CacheLookup {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
