//! Server-side HTTP/1.1 connection lifecycle handling
//!
//! This crate provides the piece of an HTTP server that sits between a raw
//! byte-stream transport and application-level request processing. It owns
//! the protocol-level concerns of one accepted connection:
//!
//! - the `Expect: 100-continue` handshake
//! - keep-alive negotiation and protocol-correct channel closure
//! - teardown policy for abnormal transport errors
//!
//! It deliberately does **not** parse HTTP, pool connections, terminate TLS
//! or route requests. The transport delivers decoded requests and errors as
//! events; the codec that produced them (and that turns responses back into
//! bytes) stays outside the crate.
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::io;
//! use std::sync::Arc;
//!
//! use bytes::{Bytes, BytesMut};
//! use http::{Request, Response, StatusCode};
//! use tokio::net::TcpListener;
//! use tokio_util::codec::Encoder;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! use micro_lifecycle::binding::ResponseBinding;
//! use micro_lifecycle::channel::ChannelWriter;
//! use micro_lifecycle::connection::ConnectionLifecycle;
//! use micro_lifecycle::processor::{make_processor, Exchange};
//! use micro_lifecycle::service::ServiceState;
//!
//! struct TextBinding;
//!
//! impl ResponseBinding for TextBinding {
//!     type Message = String;
//!
//!     fn to_response(&self, message: &String) -> Response<Bytes> {
//!         let body = Bytes::from(message.clone());
//!         Response::builder()
//!             .status(StatusCode::OK)
//!             .header(http::header::CONTENT_LENGTH, body.len())
//!             .body(body)
//!             .unwrap()
//!     }
//! }
//!
//! // stand-in for your codec's response encoder
//! struct PlainEncoder;
//!
//! impl Encoder<Response<Bytes>> for PlainEncoder {
//!     type Error = io::Error;
//!
//!     fn encode(&mut self, response: Response<Bytes>, dst: &mut BytesMut) -> Result<(), io::Error> {
//!         dst.extend_from_slice(format!("HTTP/1.1 {}\r\n\r\n", response.status()).as_bytes());
//!         dst.extend_from_slice(response.body());
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let processor = Arc::new(make_processor(hello_world));
//!     let binding = Arc::new(TextBinding);
//!     let state = Arc::new(ServiceState::new());
//!
//!     loop {
//!         let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let processor = processor.clone();
//!         let binding = binding.clone();
//!         let state = state.clone();
//!
//!         tokio::spawn(async move {
//!             let (_reader, writer) = tcp_stream.into_split();
//!             let channel = ChannelWriter::new(writer, PlainEncoder, remote_addr);
//!             let mut lifecycle = ConnectionLifecycle::new(channel, processor, binding, state);
//!
//!             // your codec decodes `_reader` into requests; deliver each one:
//!             let request = Request::builder().uri("/").body(Bytes::new()).unwrap();
//!             if let Err(e) = lifecycle.on_message(request).await {
//!                 lifecycle.on_error(e).await;
//!             }
//!             info!("request cycle finished");
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request<Bytes>) -> Result<Exchange<String>, Infallible> {
//!     Ok(Exchange::new(format!("Hello from {}!\r\n", request.uri().path())))
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into small modules, one per seam:
//!
//! - [`connection`]: the per-connection [`connection::ConnectionLifecycle`]
//!   handler, the core of the crate
//! - [`channel`]: the transport write/close seam and the provided
//!   [`channel::ChannelWriter`]
//! - [`processor`]: the application seam and the
//!   [`processor::Exchange`] result context
//! - [`binding`]: the pluggable message-to-response conversion
//! - [`protocol`]: request head snapshot, predicates and error types
//! - [`service`]: the shared runnable flag consulted during shutdown
//!
//! # Concurrency model
//!
//! One handler instance is bound to exactly one connection for that
//! connection's lifetime, and the transport must deliver events for a given
//! connection strictly one at a time. Handler state is therefore
//! single-writer without locks, and no state is shared across connections.
//! Channel closure is always ordered after the response write it follows,
//! never concurrent with it.
//!
//! # Error handling
//!
//! Transport faults reach the handler through
//! [`connection::ConnectionLifecycle::on_error`], which is terminal: benign
//! "channel already closed" races are logged and ignored, other faults close
//! the connection exactly once, and nothing is re-raised. While the owning
//! [`service::ServiceState`] is shut down the error path is a no-op so it
//! cannot race an orderly teardown.

pub mod binding;
pub mod channel;
pub mod connection;
pub mod processor;
pub mod protocol;
pub mod service;
