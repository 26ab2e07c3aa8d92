//! Protocol-level types shared by the lifecycle handler.
//!
//! This module holds everything the handler needs to reason about HTTP/1.1
//! continuation and persistence semantics without owning any parsing:
//!
//! - **Request snapshot** ([`request`]): [`RequestHead`], the bodiless copy
//!   of the last received request stored per connection, together with the
//!   `is_keep_alive` / `expects_continue` predicates.
//! - **Interim responses** ([`response`]): [`continue_response`] builds the
//!   `100 Continue` reply for the expect-continue handshake.
//! - **Error taxonomy** ([`error`]): [`TransportError`] for faults surfaced
//!   by the channel (with the benign "already closed" classification) and
//!   [`LifecycleError`] as the top-level error of a request cycle.
//!
//! Decoding raw bytes into requests and encoding responses back into bytes
//! belong to the codec, which stays outside this crate.

mod request;
pub use request::RequestHead;

mod response;
pub use response::continue_response;

mod error;
pub use error::LifecycleError;
pub use error::TransportError;
