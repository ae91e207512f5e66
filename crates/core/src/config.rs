//! Pool-wide configuration owned by [`FramePool`](crate::FramePool).

use framewall_protocol::{IsolationMode, ProxyConfig};
use serde::{Deserialize, Serialize};

/// Schema version for persisted pool configuration.
pub const POOL_CONFIG_SCHEMA_VERSION: u32 = 1;

/// Default spacing between successive activations in a batch.
pub const DEFAULT_STAGGER_DELAY_MS: u64 = 500;

/// Process-wide pool settings.
///
/// The engine never persists this itself; the serde shape exists so a host
/// can save and restore it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolConfig {
	pub schema: u32,
	/// URL broadcast to all unlocked sessions. May be empty.
	pub master_url: String,
	/// When true, master URL changes propagate to unlocked sessions.
	pub sync_enabled: bool,
	pub mode: IsolationMode,
	/// Spacing between successive activations in a batch.
	pub stagger_delay_ms: u64,
	/// URL rewrite applied before loading when the mode is proxied.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub proxy: Option<ProxyConfig>,
}

impl Default for PoolConfig {
	fn default() -> Self {
		Self {
			schema: POOL_CONFIG_SCHEMA_VERSION,
			master_url: String::new(),
			sync_enabled: true,
			mode: IsolationMode::default(),
			stagger_delay_ms: DEFAULT_STAGGER_DELAY_MS,
			proxy: None,
		}
	}
}
