use std::error::Error;
use std::io;
use std::io::ErrorKind;
use thiserror::Error;

/// Errors surfaced by the transport channel.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel already closed")]
    ChannelClosed,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl TransportError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true when this error only says the channel is gone already.
    ///
    /// These errors are the expected outcome of a race between peer-initiated
    /// close and local error detection, and must not trigger another close.
    pub fn is_channel_closed(&self) -> bool {
        match self {
            Self::ChannelClosed => true,
            Self::Io { source } => matches!(
                source.kind(),
                ErrorKind::NotConnected | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
            ),
        }
    }
}

/// Top-level error for a connection lifecycle cycle.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("transport error: {source}")]
    Transport {
        #[from]
        source: TransportError,
    },

    #[error("processor error: {source}")]
    Processor { source: Box<dyn Error + Send + Sync> },
}

impl LifecycleError {
    pub fn processor<E: Into<Box<dyn Error + Send + Sync>>>(e: E) -> Self {
        Self::Processor { source: e.into() }
    }

    pub fn is_channel_closed(&self) -> bool {
        matches!(self, Self::Transport { source } if source.is_channel_closed())
    }
}
