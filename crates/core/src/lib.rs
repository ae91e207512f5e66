//! Staggered multi-viewport session engine.
//!
//! A [`FramePool`] owns a fixed-size pool of viewport sessions that mirror
//! a single master URL. Sessions can be individually detached ("locked")
//! to browse independently. When the master URL changes, unlocked sessions
//! are reactivated one at a time with a fixed stagger delay rather than
//! all at once, and any still-pending batch is silently superseded.
//!
//! Each session carries an isolation mode controlling whether it gets a
//! unique cookie-less identity, a cache-defeating URL, and a reduced
//! capability sandbox. The engine derives what a surface should load
//! ([`effective_url`]) and what it may do ([`capabilities`]); actually
//! loading content and enforcing the sandbox belongs to the embedding
//! host, which observes the pool through [`FramePool::subscribe`].
//!
//! Operations that stage activations (`set_master_url`, `refresh_all`)
//! must run inside a Tokio runtime.

mod config;
mod effective_url;
mod pool;
mod sandbox;
mod scheduler;
mod session;
mod subscribers;

pub use config::{DEFAULT_STAGGER_DELAY_MS, POOL_CONFIG_SCHEMA_VERSION, PoolConfig};
pub use effective_url::effective_url;
pub use framewall_protocol::{
	Capability, IsolationMode, ParseIsolationModeError, ProxyConfig, SessionStatus, ViewSnapshot,
	sandbox_attr,
};
pub use pool::FramePool;
pub use sandbox::capabilities;
pub use session::FrameSession;
pub use subscribers::{SnapshotFn, SubscriberId, Subscription};
