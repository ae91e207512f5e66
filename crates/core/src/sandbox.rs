//! Capability derivation for rendering surfaces.

use framewall_protocol::{Capability, IsolationMode};

/// Capabilities granted to every session regardless of mode.
const BASE: [Capability; 5] = [
	Capability::Scripts,
	Capability::Forms,
	Capability::Popups,
	Capability::PopupsEscapeSandbox,
	Capability::Downloads,
];

/// Derives the ordered, deduplicated capability set for a mode.
///
/// Same-origin access (and with it persistent storage) is withheld when
/// the mode is stateless or unique-identity: an isolated session must not
/// see or retain cookies from any other session or from a prior load.
pub fn capabilities(mode: IsolationMode) -> Vec<Capability> {
	let mut granted = BASE.to_vec();
	if !mode.storage_isolated() {
		granted.push(Capability::SameOrigin);
	}
	granted
}
