//! Connection lifecycle handling.
//!
//! One [`ConnectionLifecycle`] is instantiated per accepted connection and
//! mediates between transport events and the application processor:
//!
//! - answers `Expect: 100-continue` requests with an interim response before
//!   any application code runs,
//! - decides per response whether the connection stays open (keep-alive) or
//!   closes once the write has completed,
//! - contains the teardown policy for transport errors, including the benign
//!   "already closed" disconnect race and suppression during service
//!   shutdown.

mod lifecycle;

pub use lifecycle::CloseDecision;
pub use lifecycle::ConnectionLifecycle;
