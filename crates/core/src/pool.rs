//! The session pool: state transitions, master-URL synchronization, and
//! subscriber notification.

use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use framewall_protocol::{IsolationMode, ProxyConfig, SessionStatus, ViewSnapshot};
use parking_lot::Mutex;
use tracing::debug;

use crate::config::PoolConfig;
use crate::effective_url::effective_url;
use crate::sandbox::capabilities;
use crate::scheduler::{ActivationSink, BatchToken, Scheduler};
use crate::session::FrameSession;
use crate::subscribers::{SnapshotFn, SubscriberMap, Subscription, next_subscriber_id};

/// Fixed-size pool of viewport sessions mirroring a master URL.
///
/// All mutations are synchronous and serialize on one internal lock; the
/// only asynchronous effect is staged activation through the internal
/// scheduler. Every mutation ends with a synchronous notification
/// delivering the full current snapshot list to all subscribers.
///
/// Per-session operations with an out-of-range id are silent no-ops, and
/// no operation fails: malformed URLs are normalized, stale activations
/// are dropped at fire time, and re-scheduling supersedes rather than
/// queues.
///
/// Dropping the pool cancels all pending activations.
pub struct FramePool {
	inner: Arc<PoolInner>,
}

struct PoolInner {
	state: Mutex<PoolState>,
	subscribers: SubscriberMap,
	scheduler: Scheduler,
}

struct PoolState {
	sessions: Vec<FrameSession>,
	config: PoolConfig,
}

impl FramePool {
	/// Creates an empty pool; call [`initialize`](Self::initialize) to
	/// populate it.
	pub fn new(config: PoolConfig) -> Self {
		Self {
			inner: Arc::new(PoolInner {
				state: Mutex::new(PoolState {
					sessions: Vec::new(),
					config,
				}),
				subscribers: SubscriberMap::default(),
				scheduler: Scheduler::new(),
			}),
		}
	}

	/// Replaces the pool with `n` fresh sessions.
	///
	/// All idle, unlocked, empty URL, freshly minted identities. Cancels
	/// any pending scheduling from the previous pool.
	pub fn initialize(&self, n: usize) {
		{
			let mut state = self.inner.state.lock();
			self.inner.scheduler.cancel_all();
			state.sessions = (0..n).map(FrameSession::new).collect();
		}
		debug!(target = "fw.pool", count = n, "pool initialized");
		self.inner.notify();
	}

	/// Stores the master URL and propagates it to unlocked sessions.
	///
	/// With sync enabled and a non-empty URL, every unlocked session is
	/// stamped with the URL, marked scheduled, and submitted (in id order)
	/// for staggered activation. With sync enabled and an empty URL,
	/// unlocked sessions are reset to idle with no URL and nothing is
	/// scheduled. With sync disabled the value is stored and nothing else
	/// happens.
	pub fn set_master_url(&self, url: &str) {
		{
			let mut state = self.inner.state.lock();
			state.config.master_url = url.to_string();

			if state.config.sync_enabled {
				if url.is_empty() {
					for session in state.sessions.iter_mut().filter(|s| !s.locked) {
						session.raw_url.clear();
						session.status = SessionStatus::Idle;
					}
				} else {
					let mut staged = Vec::new();
					for session in state.sessions.iter_mut().filter(|s| !s.locked) {
						session.raw_url = url.to_string();
						session.status = SessionStatus::Scheduled;
						staged.push(session.id);
					}
					debug!(
						target = "fw.pool",
						url,
						count = staged.len(),
						"master url changed; staging unlocked sessions"
					);
					self.stage(&state, staged);
				}
			}
		}
		self.inner.notify();
	}

	/// Toggles master-URL synchronization.
	///
	/// A pure flag change: propagation happens on the next
	/// [`set_master_url`](Self::set_master_url) call, not here.
	pub fn set_sync_enabled(&self, enabled: bool) {
		self.inner.state.lock().config.sync_enabled = enabled;
		self.inner.notify();
	}

	/// Switches the pool-wide isolation mode.
	///
	/// When the new mode requires unique identities, every session gets a
	/// fresh identity and a generation bump immediately. No scheduling:
	/// this is a local capability/URL recompute, not a reload sequence.
	pub fn set_isolation_mode(&self, mode: IsolationMode) {
		{
			let mut state = self.inner.state.lock();
			state.config.mode = mode;
			if mode.requires_unique_identity() {
				for session in &mut state.sessions {
					session.regenerate_identity();
					session.generation += 1;
				}
			}
		}
		debug!(target = "fw.pool", mode = %mode, "isolation mode changed");
		self.inner.notify();
	}

	/// Sets the spacing between successive activations in a batch.
	///
	/// Takes effect for the next staged batch; a pending batch keeps the
	/// spacing it was staged with.
	pub fn set_stagger_delay_ms(&self, delay_ms: u64) {
		self.inner.state.lock().config.stagger_delay_ms = delay_ms;
		self.inner.notify();
	}

	/// Configures (or clears) the proxy rewrite.
	pub fn set_proxy(&self, proxy: Option<ProxyConfig>) {
		self.inner.state.lock().config.proxy = proxy;
		self.inner.notify();
	}

	/// Manually points one session at a URL, detaching it from the master.
	///
	/// The session becomes locked and active immediately with a bumped
	/// generation; a manual edit is never staggered. Out-of-range `id` is
	/// a no-op.
	pub fn set_url(&self, id: usize, url: &str) {
		{
			let mut state = self.inner.state.lock();
			let Some(session) = state.sessions.get_mut(id) else {
				return;
			};
			session.raw_url = url.to_string();
			session.locked = true;
			session.status = SessionStatus::Active;
			session.generation += 1;
		}
		debug!(target = "fw.pool", id, url, "session url edited");
		self.inner.notify();
	}

	/// Flips one session's lock. No status or URL change.
	pub fn toggle_lock(&self, id: usize) {
		{
			let mut state = self.inner.state.lock();
			let Some(session) = state.sessions.get_mut(id) else {
				return;
			};
			session.locked = !session.locked;
		}
		self.inner.notify();
	}

	/// Forces one session to reload its current URL.
	///
	/// Bumps the generation without touching status; regenerates the
	/// identity when the mode requires unique identities. Out-of-range
	/// `id` is a no-op.
	pub fn refresh_one(&self, id: usize) {
		{
			let mut state = self.inner.state.lock();
			let regenerate = state.config.mode.requires_unique_identity();
			let Some(session) = state.sessions.get_mut(id) else {
				return;
			};
			if regenerate {
				session.regenerate_identity();
			}
			session.generation += 1;
		}
		self.inner.notify();
	}

	/// Reloads every displayable session with staggered activation.
	///
	/// Selects sessions with a non-empty URL that are unlocked or already
	/// active, marks them scheduled, regenerates identities when the mode
	/// requires, and submits them in id order. Supersedes any pending
	/// batch even when the selection is empty.
	pub fn refresh_all(&self) {
		{
			let mut state = self.inner.state.lock();
			let regenerate = state.config.mode.requires_unique_identity();
			let mut staged = Vec::new();
			for session in &mut state.sessions {
				if session.raw_url.is_empty() {
					continue;
				}
				if session.locked && session.status != SessionStatus::Active {
					continue;
				}
				if regenerate {
					session.regenerate_identity();
				}
				session.status = SessionStatus::Scheduled;
				staged.push(session.id);
			}
			debug!(target = "fw.pool", count = staged.len(), "refreshing all sessions");
			self.stage(&state, staged);
		}
		self.inner.notify();
	}

	/// Registers a snapshot subscriber.
	///
	/// The callback runs synchronously after every mutation with the full
	/// current snapshot list. Dropping the returned [`Subscription`]
	/// unregisters it.
	pub fn subscribe(&self, subscriber: impl Fn(&[ViewSnapshot]) + Send + Sync + 'static) -> Subscription {
		let id = next_subscriber_id();
		let callback: SnapshotFn = Arc::new(subscriber);
		self.inner.subscribers.lock().insert(id, callback);
		Subscription::from_map(id, &self.inner.subscribers)
	}

	/// Returns the current snapshot list on demand.
	pub fn snapshot(&self) -> Vec<ViewSnapshot> {
		let state = self.inner.state.lock();
		state.snapshots(now_ms())
	}

	/// Returns copies of the raw session records.
	///
	/// Snapshots carry only the render inputs; toolbar-style hosts also
	/// need lock state and raw URLs.
	pub fn sessions(&self) -> Vec<FrameSession> {
		self.inner.state.lock().sessions.clone()
	}

	/// Returns a copy of the current configuration.
	pub fn config(&self) -> PoolConfig {
		self.inner.state.lock().config.clone()
	}

	/// Stages `ids` for staggered activation, superseding any pending
	/// batch. Runs with the state lock held so a stale batch can never
	/// interleave between the store mutation and its superseding call.
	fn stage(&self, state: &PoolState, ids: Vec<usize>) {
		let delay = Duration::from_millis(state.config.stagger_delay_ms);
		let inner: Arc<dyn ActivationSink> = self.inner.clone();
		let sink: Weak<dyn ActivationSink> = Arc::downgrade(&inner);
		self.inner.scheduler.schedule(ids, delay, sink);
	}
}

impl Drop for FramePool {
	fn drop(&mut self) {
		// No timer may fire against freed session state.
		self.inner.scheduler.cancel_all();
	}
}

impl PoolInner {
	/// Delivers the current snapshot list to all subscribers, outside the
	/// state lock so callbacks may re-enter the pool.
	fn notify(&self) {
		let snapshots = {
			let state = self.state.lock();
			state.snapshots(now_ms())
		};
		let subscribers: Vec<SnapshotFn> = self.subscribers.lock().values().cloned().collect();
		for subscriber in subscribers {
			subscriber(&snapshots);
		}
	}
}

impl ActivationSink for PoolInner {
	fn activate(&self, id: usize, token: BatchToken) {
		let fired = {
			let mut state = self.state.lock();
			if self.scheduler.current_batch() != token {
				// Superseded while this activation slept.
				return;
			}
			match state.sessions.get_mut(id) {
				Some(session) if session.status == SessionStatus::Scheduled => {
					session.status = SessionStatus::Active;
					session.generation += 1;
					true
				}
				// Destroyed or redefined since staging.
				_ => false,
			}
		};
		if fired {
			debug!(target = "fw.pool", id, "session activated");
			self.notify();
		}
	}
}

impl PoolState {
	fn snapshots(&self, now_ms: u64) -> Vec<ViewSnapshot> {
		let granted = capabilities(self.config.mode);
		self.sessions
			.iter()
			.map(|session| ViewSnapshot {
				id: session.id,
				effective_url: effective_url(
					&session.raw_url,
					self.config.mode,
					&session.identity,
					self.config.proxy.as_ref(),
					now_ms,
				),
				capabilities: granted.clone(),
				status: session.status,
				generation: session.generation,
			})
			.collect()
	}
}

/// Milliseconds since the Unix epoch, for cache-bust parameters.
fn now_ms() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_millis() as u64
}
