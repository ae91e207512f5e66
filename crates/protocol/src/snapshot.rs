use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Capability;

/// Lifecycle state of one viewport session.
///
/// Transitions are `idle → scheduled → active` and (for refresh)
/// `active → scheduled → active`; a scheduled session only returns to
/// `idle` when the master URL is cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
	/// Nothing to display.
	#[default]
	Idle,
	/// Staged for activation by the scheduler.
	Scheduled,
	/// Displaying its current URL.
	Active,
}

impl fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SessionStatus::Idle => write!(f, "idle"),
			SessionStatus::Scheduled => write!(f, "scheduled"),
			SessionStatus::Active => write!(f, "active"),
		}
	}
}

/// URL rewrite applied before loading when the mode is proxied.
///
/// The engine only constructs the rewritten URL string; it does not
/// operate a proxy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
	/// Prefix the percent-encoded target URL is appended to.
	pub prefix: String,
}

/// Immutable per-session view delivered to subscribers after a mutation.
///
/// A host reloads a session's surface if and only if `generation` changed
/// since the last render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
	/// Stable slot index, `0..n-1` for a pool of size `n`.
	pub id: usize,
	/// URL the surface should load; empty means nothing to load.
	pub effective_url: String,
	/// Sandbox capabilities to grant the surface.
	pub capabilities: Vec<Capability>,
	pub status: SessionStatus,
	/// Monotonic reload signal.
	pub generation: u64,
}
