use std::fmt;

use serde::{Deserialize, Serialize};

/// Sandbox capability granted to a rendering surface.
///
/// The engine only decides which capabilities a session gets; enforcement
/// belongs to the embedding host. [`Capability::as_token`] yields the
/// attribute token understood by iframe-style surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
	/// Script execution.
	Scripts,
	/// Form submission.
	Forms,
	/// Popup creation.
	Popups,
	/// Popups escape the sandbox of their opener.
	PopupsEscapeSandbox,
	/// File downloads.
	Downloads,
	/// Same-origin access and persistent storage.
	///
	/// The sole capability distinguishing standard from isolated sessions.
	SameOrigin,
}

impl Capability {
	/// Sandbox attribute token for iframe-style hosts.
	pub fn as_token(&self) -> &'static str {
		match self {
			Capability::Scripts => "allow-scripts",
			Capability::Forms => "allow-forms",
			Capability::Popups => "allow-popups",
			Capability::PopupsEscapeSandbox => "allow-popups-to-escape-sandbox",
			Capability::Downloads => "allow-downloads",
			Capability::SameOrigin => "allow-same-origin",
		}
	}
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_token())
	}
}

/// Joins a capability set into a sandbox attribute value.
pub fn sandbox_attr(capabilities: &[Capability]) -> String {
	capabilities
		.iter()
		.map(Capability::as_token)
		.collect::<Vec<_>>()
		.join(" ")
}
