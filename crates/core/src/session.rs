//! Per-slot session records.

use framewall_protocol::SessionStatus;
use uuid::Uuid;

/// One slot in the fixed-size pool.
///
/// Records are owned and mutated exclusively by the pool; hosts see them
/// through [`ViewSnapshot`](framewall_protocol::ViewSnapshot)s or cloned
/// copies.
#[derive(Clone, Debug)]
pub struct FrameSession {
	/// Stable slot index, assigned at pool creation. Never reused.
	pub id: usize,
	/// User- or master-supplied URL, untransformed.
	pub raw_url: String,
	/// Detached from master-URL synchronization.
	pub locked: bool,
	pub status: SessionStatus,
	/// Opaque per-session token; regenerated when the isolation mode
	/// demands a fresh identity.
	pub identity: String,
	/// Monotonic reload signal for the rendering surface.
	pub generation: u64,
}

impl FrameSession {
	pub(crate) fn new(id: usize) -> Self {
		Self {
			id,
			raw_url: String::new(),
			locked: false,
			status: SessionStatus::Idle,
			identity: mint_identity(),
			generation: 0,
		}
	}

	/// Swaps in a fresh identity token ("new visitor" semantics).
	///
	/// Callers decide whether the change also bumps `generation`.
	pub(crate) fn regenerate_identity(&mut self) {
		self.identity = mint_identity();
	}
}

fn mint_identity() -> String {
	Uuid::new_v4().simple().to_string()
}
