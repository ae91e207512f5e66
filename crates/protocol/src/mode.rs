use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pool-wide isolation flags.
///
/// Flags combine freely. The default (all flags off) is standard
/// shared-profile browsing: sessions keep persistent storage and load the
/// master URL directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IsolationMode {
	/// Append a cache-defeating `_cb` parameter to every load.
	pub cache_bust: bool,
	/// Withhold persistent storage and same-origin access from the surface.
	pub stateless: bool,
	/// Mint a fresh per-session identity token and tag loads with it.
	///
	/// Implies the storage isolation of `stateless`.
	pub unique_identity: bool,
	/// Rewrite loads through the configured proxy prefix.
	pub proxied: bool,
}

impl IsolationMode {
	/// No isolation: shared profile, direct loads.
	pub const NONE: Self = Self {
		cache_bust: false,
		stateless: false,
		unique_identity: false,
		proxied: false,
	};

	/// True when sessions must carry a regenerable per-session identity.
	pub fn requires_unique_identity(&self) -> bool {
		self.unique_identity
	}

	/// True when the sandbox must withhold same-origin/persistent storage.
	pub fn storage_isolated(&self) -> bool {
		self.stateless || self.unique_identity
	}

	/// True when no flag is set.
	pub fn is_none(&self) -> bool {
		*self == Self::NONE
	}
}

impl fmt::Display for IsolationMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_none() {
			return f.write_str("none");
		}
		let mut first = true;
		let mut push = |f: &mut fmt::Formatter<'_>, flag: &str| -> fmt::Result {
			if !first {
				f.write_str(",")?;
			}
			first = false;
			f.write_str(flag)
		};
		if self.cache_bust {
			push(f, "cache-bust")?;
		}
		if self.stateless {
			push(f, "stateless")?;
		}
		if self.unique_identity {
			push(f, "unique-identity")?;
		}
		if self.proxied {
			push(f, "proxied")?;
		}
		Ok(())
	}
}

impl FromStr for IsolationMode {
	type Err = ParseIsolationModeError;

	/// Parses a comma-separated flag list, e.g. `"cache-bust,stateless"`.
	///
	/// `"none"` and the empty string parse to [`IsolationMode::NONE`].
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut mode = Self::NONE;
		for token in s.split(',') {
			match token.trim() {
				"" | "none" => {}
				"cache-bust" => mode.cache_bust = true,
				"stateless" => mode.stateless = true,
				"unique-identity" => mode.unique_identity = true,
				"proxied" => mode.proxied = true,
				other => {
					return Err(ParseIsolationModeError {
						flag: other.to_string(),
					});
				}
			}
		}
		Ok(mode)
	}
}

/// Error returned when an isolation-mode string contains an unknown flag.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown isolation flag: {flag}")]
pub struct ParseIsolationModeError {
	flag: String,
}

impl ParseIsolationModeError {
	/// Returns the flag token that failed to parse.
	pub fn flag(&self) -> &str {
		&self.flag
	}
}
