//! The transport seam.
//!
//! [`Channel`] is the write side of one accepted connection as the lifecycle
//! handler sees it: responses go out, the channel can be closed, and the
//! remote peer address is known. The read side (accept loop, decoding,
//! timeouts) never appears here; the transport delivers decoded requests and
//! errors to the handler instead.
//!
//! [`ChannelWriter`] is the provided implementation over any tokio
//! `AsyncWrite`, with the response-to-bytes codec injected as a
//! `tokio_util::codec::Encoder`.

use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;

use crate::protocol::TransportError;

mod writer;
pub use writer::ChannelWriter;

/// Write side of one accepted connection.
///
/// # Contract
///
/// - `write` resolves only once the response has been handed to the
///   underlying transport in full (flushed), so that a close scheduled after
///   it can never truncate the response.
/// - Events for one connection are delivered to its handler strictly one at
///   a time; implementations are never called concurrently for the same
///   connection.
#[async_trait]
pub trait Channel {
    /// Writes a complete response and flushes it.
    async fn write(&mut self, response: Response<Bytes>) -> Result<(), TransportError>;

    /// Actively closes the connection.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// The address of the remote peer.
    fn remote_addr(&self) -> SocketAddr;
}
