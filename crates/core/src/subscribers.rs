//! Snapshot subscriber infrastructure.
//!
//! Pool mutations notify subscribers synchronously with the full
//! post-mutation snapshot list, using [`IndexMap`] storage for O(1)
//! removal with stable insertion order. Registration returns an RAII
//! [`Subscription`] that unregisters on drop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use framewall_protocol::ViewSnapshot;
use indexmap::IndexMap;
use parking_lot::Mutex;

/// Unique identifier for snapshot subscribers.
pub type SubscriberId = u64;

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a new globally-unique subscriber ID.
pub(crate) fn next_subscriber_id() -> SubscriberId {
	NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::SeqCst)
}

/// Subscriber callback: receives the full post-mutation snapshot list.
pub type SnapshotFn = Arc<dyn Fn(&[ViewSnapshot]) + Send + Sync>;

/// Subscriber storage.
pub(crate) type SubscriberMap = Arc<Mutex<IndexMap<SubscriberId, SnapshotFn>>>;

/// RAII handle that unregisters a snapshot subscriber on drop.
///
/// Holds a weak reference to the subscriber map, so dropping after the
/// owning pool is gone is safe (becomes a no-op).
pub struct Subscription {
	id: SubscriberId,
	dropper: Option<Arc<dyn Fn(SubscriberId) + Send + Sync>>,
}

impl Subscription {
	/// Creates a subscription from a subscriber map using a weak reference.
	pub(crate) fn from_map(id: SubscriberId, subscribers: &SubscriberMap) -> Self {
		let weak: Weak<Mutex<IndexMap<SubscriberId, SnapshotFn>>> = Arc::downgrade(subscribers);
		let dropper = Arc::new(move |id: SubscriberId| {
			if let Some(map) = weak.upgrade() {
				map.lock().shift_remove(&id);
			}
		});
		Self {
			id,
			dropper: Some(dropper),
		}
	}

	/// Returns this subscription's ID.
	pub fn id(&self) -> SubscriberId {
		self.id
	}

	/// Explicitly unsubscribes. Equivalent to dropping.
	pub fn unsubscribe(mut self) {
		if let Some(dropper) = self.dropper.take() {
			(dropper)(self.id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(dropper) = self.dropper.take() {
			(dropper)(self.id);
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("active", &self.dropper.is_some())
			.finish()
	}
}
