//! Staggered activation scheduling.
//!
//! One batch is pending at a time: a new [`Scheduler::schedule`] call
//! supersedes any earlier batch before staging its own activations ("last
//! call wins"). Supersession is silent: superseded callbacks never fire.
//!
//! Revocation is a single incrementing batch token. The running batch task
//! is aborted on supersession, and the token is re-checked by the
//! activation sink at fire time under the pool state lock, so a task that
//! already woke cannot act against a newer batch.

use std::sync::Weak;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Batch revocation token. Monotonic; only the latest token may act.
pub(crate) type BatchToken = u64;

/// Applies one staged activation.
///
/// Implementors must re-validate at fire time: the issuing batch must
/// still be current and the target session must still exist and be
/// scheduled. Anything else is silently dropped.
pub(crate) trait ActivationSink: Send + Sync + 'static {
	fn activate(&self, id: usize, token: BatchToken);
}

pub(crate) struct Scheduler {
	batch: AtomicU64,
	task: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
	pub(crate) fn new() -> Self {
		Self {
			batch: AtomicU64::new(0),
			task: Mutex::new(None),
		}
	}

	/// Token of the batch currently allowed to fire.
	pub(crate) fn current_batch(&self) -> BatchToken {
		self.batch.load(Ordering::SeqCst)
	}

	/// Supersedes any pending batch and stages `ids` at `delay` spacing.
	///
	/// Position in `ids` determines the delay multiple: `ids[0]` fires
	/// without sleeping, `ids[i]` after `i * delay`. Callers pass the
	/// desired order explicitly. An empty list is a valid no-op that still
	/// cancels the previous batch.
	///
	/// Must be called inside a Tokio runtime.
	pub(crate) fn schedule(&self, ids: Vec<usize>, delay: Duration, sink: Weak<dyn ActivationSink>) {
		let token = self.batch.fetch_add(1, Ordering::SeqCst) + 1;
		let mut slot = self.task.lock();
		if let Some(previous) = slot.take() {
			previous.abort();
		}

		if ids.is_empty() {
			debug!(target = "fw.schedule", token, "empty batch; previous cancelled");
			return;
		}

		debug!(
			target = "fw.schedule",
			token,
			count = ids.len(),
			delay_ms = delay.as_millis() as u64,
			"staging batch"
		);

		let handle = tokio::spawn(async move {
			for (position, id) in ids.into_iter().enumerate() {
				if position > 0 {
					tokio::time::sleep(delay).await;
				}
				let Some(sink) = sink.upgrade() else {
					return;
				};
				trace!(target = "fw.schedule", token, id, position, "activation due");
				sink.activate(id, token);
			}
		});
		*slot = Some(handle);
	}

	/// Releases every pending activation without firing.
	///
	/// Called on pool teardown and re-initialization.
	pub(crate) fn cancel_all(&self) {
		self.batch.fetch_add(1, Ordering::SeqCst);
		if let Some(task) = self.task.lock().take() {
			task.abort();
		}
	}
}
