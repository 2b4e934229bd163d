//! Waypoint batch router engine.
//!
//! A caller assembles an ordered batch of value-moving commands off-line (see
//! `waypoint-router-planner`), producing one compact command stream plus an
//! index-aligned array of operand blobs. This crate is the executing side:
//!
//! - [`decoder`] turns each `(command byte, blob)` pair back into a typed
//!   [`waypoint_router_types::Command`], rejecting anything malformed;
//! - [`dispatch`] walks the stream strictly in order, applying the
//!   per-command allow-revert policy (a tolerated failure restores the
//!   pre-command snapshot of the host, so the failed command leaves no
//!   partial mutations behind);
//! - the handler set mutates balances at the single custody point through the
//!   [`host::HostEnvironment`] collaborator trait;
//! - [`router::Router`] wraps one batch execution with the deadline check and
//!   the reentrancy lock.
//!
//! The engine performs no rollback bookkeeping of its own: a fatal failure is
//! surfaced as one terminal [`errors::BatchError`] and the committing
//! environment (see [`router::execute_committed`]) discards every mutation the
//! batch made.

pub mod context;
pub mod decoder;
pub mod dispatch;
pub mod errors;
pub mod host;
pub mod lock;
pub mod router;

mod handlers;

pub use context::ExecutionContext;
pub use dispatch::{BatchReceipt, ToleratedFailure};
pub use errors::{BatchError, DecodeError, HandlerError, HostError};
pub use host::{HostEnvironment, MemoryHost, RecordedPermit};
pub use lock::ReentrancyLock;
pub use router::{execute_committed, Router};
