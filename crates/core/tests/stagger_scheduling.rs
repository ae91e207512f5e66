//! Staggered activation timing: batch ordering, supersession, and
//! teardown cancellation, driven on a paused clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use framewall::{FramePool, PoolConfig, SessionStatus};

fn pool_with_delay(n: usize, delay_ms: u64) -> FramePool {
	let pool = FramePool::new(PoolConfig {
		stagger_delay_ms: delay_ms,
		..Default::default()
	});
	pool.initialize(n);
	pool
}

fn statuses(pool: &FramePool) -> Vec<SessionStatus> {
	pool.sessions().iter().map(|s| s.status).collect()
}

fn generations(pool: &FramePool) -> Vec<u64> {
	pool.sessions().iter().map(|s| s.generation).collect()
}

/// Lets spawned batch tasks run up to their next timer.
async fn settle() {
	for _ in 0..4 {
		tokio::task::yield_now().await;
	}
}

async fn advance(ms: u64) {
	tokio::time::advance(Duration::from_millis(ms)).await;
	settle().await;
}

/// Records each session's transition into `active`, in delivery order.
fn track_activations(pool: &FramePool, n: usize) -> (Arc<Mutex<Vec<usize>>>, framewall::Subscription) {
	let order = Arc::new(Mutex::new(Vec::new()));
	let previous = Mutex::new(vec![SessionStatus::Idle; n]);
	let subscription = pool.subscribe({
		let order = Arc::clone(&order);
		move |snapshots| {
			let mut previous = previous.lock().unwrap();
			for snapshot in snapshots {
				if snapshot.status == SessionStatus::Active
					&& previous[snapshot.id] != SessionStatus::Active
				{
					order.lock().unwrap().push(snapshot.id);
				}
				previous[snapshot.id] = snapshot.status;
			}
		}
	});
	(order, subscription)
}

#[tokio::test(start_paused = true)]
async fn master_url_staggers_unlocked_sessions_in_order() {
	let pool = pool_with_delay(3, 100);
	let (order, _sub) = track_activations(&pool, 3);

	pool.set_master_url("example.com");
	assert!(pool.sessions().iter().all(|s| s.raw_url == "example.com"));

	settle().await;
	assert_eq!(
		statuses(&pool),
		vec![SessionStatus::Active, SessionStatus::Scheduled, SessionStatus::Scheduled]
	);

	advance(100).await;
	assert_eq!(
		statuses(&pool),
		vec![SessionStatus::Active, SessionStatus::Active, SessionStatus::Scheduled]
	);

	advance(100).await;
	assert!(statuses(&pool).iter().all(|s| *s == SessionStatus::Active));
	assert_eq!(generations(&pool), vec![1, 1, 1]);
	assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn locked_session_is_untouched_by_master_sync() {
	let pool = pool_with_delay(3, 100);
	pool.toggle_lock(1);

	pool.set_master_url("a.com");
	settle().await;

	// Only ids 0 and 2 were staged; position in the batch determines the
	// delay, so session 2 activates at t=100, not t=200.
	let session = &pool.sessions()[1];
	assert!(session.raw_url.is_empty());
	assert_eq!(session.status, SessionStatus::Idle);
	assert_eq!(pool.sessions()[0].status, SessionStatus::Active);
	assert_eq!(pool.sessions()[2].status, SessionStatus::Scheduled);

	advance(100).await;
	assert_eq!(pool.sessions()[2].status, SessionStatus::Active);
	assert_eq!(pool.sessions()[1].status, SessionStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn rapid_refresh_all_keeps_only_the_second_batch() {
	let pool = pool_with_delay(3, 100);
	pool.set_master_url("a.com");
	settle().await;
	advance(100).await;
	advance(100).await;
	assert_eq!(generations(&pool), vec![1, 1, 1]);

	// Two refreshes inside the stagger window: the first batch must never
	// be observed.
	pool.refresh_all();
	pool.refresh_all();
	settle().await;
	advance(100).await;
	advance(100).await;

	assert!(statuses(&pool).iter().all(|s| *s == SessionStatus::Active));
	// Exactly one activation per session after the refreshes; a surviving
	// first batch would have double-bumped.
	assert_eq!(generations(&pool), vec![2, 2, 2]);
}

#[tokio::test(start_paused = true)]
async fn set_url_is_independent_of_a_pending_batch() {
	let pool = pool_with_delay(4, 100);
	pool.set_master_url("a.com");
	settle().await;

	pool.set_url(3, "b.com");
	let session = &pool.sessions()[3];
	assert!(session.locked);
	assert_eq!(session.status, SessionStatus::Active);
	assert_eq!(session.generation, 1);

	// The pending batch still activates sessions 1 and 2, and its stale
	// entry for session 3 is dropped at fire time.
	advance(100).await;
	advance(100).await;
	advance(100).await;

	assert_eq!(pool.sessions()[1].status, SessionStatus::Active);
	assert_eq!(pool.sessions()[2].status, SessionStatus::Active);
	let session = &pool.sessions()[3];
	assert_eq!(session.raw_url, "b.com");
	assert_eq!(session.generation, 1);
}

#[tokio::test(start_paused = true)]
async fn reinitialize_cancels_pending_activations() {
	let pool = pool_with_delay(3, 100);
	pool.set_master_url("a.com");
	settle().await;

	pool.initialize(3);
	advance(1_000).await;

	assert!(statuses(&pool).iter().all(|s| *s == SessionStatus::Idle));
	assert_eq!(generations(&pool), vec![0, 0, 0]);
}

#[tokio::test(start_paused = true)]
async fn clearing_master_resets_unlocked_sessions_only() {
	let pool = pool_with_delay(3, 100);
	pool.set_master_url("a.com");
	settle().await;
	advance(100).await;
	advance(100).await;

	pool.toggle_lock(1);
	pool.set_master_url("");

	let sessions = pool.sessions();
	assert!(sessions[0].raw_url.is_empty());
	assert_eq!(sessions[0].status, SessionStatus::Idle);
	assert_eq!(sessions[1].raw_url, "a.com");
	assert_eq!(sessions[1].status, SessionStatus::Active);
	assert!(sessions[2].raw_url.is_empty());
	assert_eq!(sessions[2].status, SessionStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn refresh_all_selects_displayable_sessions() {
	let pool = pool_with_delay(3, 100);
	pool.set_master_url("a.com");
	settle().await;
	advance(100).await;
	advance(100).await;

	// Session 1 stays locked but active ("a.com"); 0 and 2 are reset to
	// idle with no URL by clearing the master.
	pool.toggle_lock(1);
	pool.set_master_url("");

	pool.refresh_all();
	settle().await;
	advance(500).await;

	let sessions = pool.sessions();
	// Only the locked-but-active session had a URL to reload.
	assert_eq!(sessions[1].status, SessionStatus::Active);
	assert_eq!(sessions[1].generation, 2);
	assert_eq!(sessions[0].status, SessionStatus::Idle);
	assert_eq!(sessions[0].generation, 1);
	assert_eq!(sessions[2].status, SessionStatus::Idle);
	assert_eq!(sessions[2].generation, 1);
}

#[tokio::test(start_paused = true)]
async fn stagger_delay_applies_to_the_next_batch() {
	let pool = pool_with_delay(2, 100);
	pool.set_master_url("a.com");
	settle().await;
	assert_eq!(pool.sessions()[1].status, SessionStatus::Scheduled);

	pool.set_stagger_delay_ms(300);
	// The pending batch keeps its original spacing.
	advance(100).await;
	assert_eq!(pool.sessions()[1].status, SessionStatus::Active);

	pool.refresh_all();
	settle().await;
	advance(100).await;
	assert_eq!(pool.sessions()[1].status, SessionStatus::Scheduled);
	advance(200).await;
	assert_eq!(pool.sessions()[1].status, SessionStatus::Active);
}
