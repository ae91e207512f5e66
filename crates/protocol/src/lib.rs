//! Shared session-state types for the framewall engine.
//!
//! These are the types exchanged between the engine and an embedding host:
//! the lifecycle status of each viewport session, the pool-wide isolation
//! mode, the sandbox capabilities a rendering surface may be granted, and
//! the per-session [`ViewSnapshot`] delivered to subscribers after every
//! mutation.

mod capability;
mod mode;
mod snapshot;

pub use capability::{Capability, sandbox_attr};
pub use mode::{IsolationMode, ParseIsolationModeError};
pub use snapshot::{ProxyConfig, SessionStatus, ViewSnapshot};
