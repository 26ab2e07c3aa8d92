use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::Response;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

use crate::channel::Channel;
use crate::protocol::TransportError;

/// Buffered [`Channel`] implementation over an `AsyncWrite`.
///
/// The response-to-bytes conversion is delegated to an injected encoder, so
/// the wire format stays with the codec. `close` shuts the writer down after
/// any buffered bytes have been flushed by the preceding `write`.
#[derive(Debug)]
pub struct ChannelWriter<W, E> {
    writer: W,
    encoder: E,
    buffer: BytesMut,
    remote_addr: SocketAddr,
}

impl<W, E> ChannelWriter<W, E>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W, encoder: E, remote_addr: SocketAddr) -> Self {
        Self::with_capacity(writer, encoder, remote_addr, 8 * 1024)
    }

    pub fn with_capacity(writer: W, encoder: E, remote_addr: SocketAddr, buffer_size: usize) -> Self {
        Self { writer, encoder, buffer: BytesMut::with_capacity(buffer_size), remote_addr }
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W, E> Channel for ChannelWriter<W, E>
where
    W: AsyncWrite + Unpin + Send,
    E: Encoder<Response<Bytes>> + Send,
    E::Error: Into<TransportError>,
{
    async fn write(&mut self, response: Response<Bytes>) -> Result<(), TransportError> {
        self.encoder.encode(response, &mut self.buffer).map_err(Into::into)?;

        self.writer.write_all(self.buffer.as_ref()).await?;
        self.writer.flush().await?;
        self.buffer.clear();
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(self.writer.shutdown().await?)
    }

    fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}
