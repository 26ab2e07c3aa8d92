use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};
use tracing::{debug, info, warn};

use crate::binding::ResponseBinding;
use crate::channel::Channel;
use crate::processor::{Exchange, Processor};
use crate::protocol::{LifecycleError, RequestHead, continue_response};
use crate::service::ServiceState;

/// Close policy attached to a response write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// The connection is persistent; leave it open for the next request.
    KeepOpen,
    /// Close the connection once the response write has completed.
    CloseAfterWrite,
}

/// Per-connection HTTP/1.1 lifecycle handler.
///
/// One `ConnectionLifecycle` is created for each accepted connection and
/// lives as long as the connection does. It sits between the transport and
/// the application [`Processor`] and owns three protocol concerns:
///
/// - the `Expect: 100-continue` handshake ([`on_message`](Self::on_message)),
/// - keep-alive negotiation ([`close_decision`](Self::close_decision),
///   applied by [`on_response_ready`](Self::on_response_ready)),
/// - teardown policy on transport errors ([`on_error`](Self::on_error)).
///
/// The handler stores the head of the most recently received request; that
/// stored head, and nothing else, drives the close decision for the response
/// it triggered. Before any request has arrived the connection is treated as
/// non-persistent.
///
/// # Dispatch contract
///
/// The transport must deliver events for one connection to its handler
/// strictly one at a time. Under that contract the stored request head is
/// single-writer single-reader and the handler needs no internal locking.
pub struct ConnectionLifecycle<C, P, B> {
    channel: C,
    processor: Arc<P>,
    binding: Arc<B>,
    state: Arc<ServiceState>,
    request: Option<RequestHead>,
}

impl<C, P, B> ConnectionLifecycle<C, P, B>
where
    C: Channel + Send,
    B: ResponseBinding,
{
    pub fn new(channel: C, processor: Arc<P>, binding: Arc<B>, state: Arc<ServiceState>) -> Self {
        Self { channel, processor, binding, state, request: None }
    }

    /// The head of the most recently received request, if any.
    pub fn request(&self) -> Option<&RequestHead> {
        self.request.as_ref()
    }

    #[inline]
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Handles an inbound request decoded by the codec.
    ///
    /// The request head replaces any previously stored one. If the request
    /// expects a continuation, exactly one interim `100 Continue` is written
    /// back (using the request's protocol version) and the processor is not
    /// invoked; the transport is expected to call [`forward`](Self::forward)
    /// once the body behind the continuation has arrived. Otherwise the
    /// request goes straight down the standard inbound path.
    ///
    /// Errors propagate to the caller so the transport can route them into
    /// [`on_error`](Self::on_error).
    pub async fn on_message<ReqBody>(&mut self, request: Request<ReqBody>) -> Result<(), LifecycleError>
    where
        P: Processor<ReqBody, Message = B::Message> + Send + Sync,
        ReqBody: Send + 'static,
    {
        let head = RequestHead::from(&request);
        debug!(keep_alive = head.is_keep_alive(), "message received");

        let expects_continue = head.expects_continue();
        let version = head.version();
        self.request = Some(head);

        if expects_continue {
            self.channel.write(continue_response(version)).await?;
            info!("expect header received, sent continue response");
            return Ok(());
        }

        self.forward(request).await
    }

    /// The standard inbound path, with the continuation check bypassed.
    ///
    /// Transports call this directly to deliver a request whose continuation
    /// handshake has already happened.
    pub async fn forward<ReqBody>(&mut self, request: Request<ReqBody>) -> Result<(), LifecycleError>
    where
        P: Processor<ReqBody, Message = B::Message> + Send + Sync,
        ReqBody: Send + 'static,
    {
        let exchange = self.processor.process(request).await.map_err(LifecycleError::processor)?;
        self.on_response_ready(exchange).await
    }

    /// Writes the response resolved from `exchange` and applies the close
    /// decision of the stored request.
    ///
    /// The close, when decided, runs only after the write has completed, so
    /// the response can never be truncated by it.
    pub async fn on_response_ready(&mut self, exchange: Exchange<B::Message>) -> Result<(), LifecycleError> {
        let response = self.resolve_response(&exchange);
        let decision = self.close_decision();

        self.channel.write(response).await?;

        if decision == CloseDecision::CloseAfterWrite {
            debug!("closing channel as not keep-alive");
            self.channel.close().await?;
        }
        Ok(())
    }

    /// Close policy for the response to the stored request.
    ///
    /// Only a recorded keep-alive request keeps the connection open; with a
    /// non-persistent request, or before any request has been recorded, the
    /// connection closes after the write.
    pub fn close_decision(&self) -> CloseDecision {
        match &self.request {
            Some(head) if head.is_keep_alive() => CloseDecision::KeepOpen,
            _ => CloseDecision::CloseAfterWrite,
        }
    }

    /// Terminal handler for transport faults. Never re-raises.
    ///
    /// While the owning service is shutting down this is a no-op: teardown is
    /// already in progress and must not be raced. An error that only reports
    /// the channel as already closed is the benign disconnect race and gets
    /// logged without another close attempt. Anything else closes the
    /// connection.
    pub async fn on_error(&mut self, error: LifecycleError) {
        if !self.state.is_run_allowed() {
            return;
        }

        if error.is_channel_closed() {
            warn!("channel already closed, ignoring this error");
        } else {
            warn!(cause = %error, "closing channel after connection error");
            if let Err(e) = self.channel.close().await {
                warn!(cause = %e, "closing channel failed");
            }
        }
    }

    fn resolve_response(&self, exchange: &Exchange<B::Message>) -> Response<Bytes> {
        match exchange.output() {
            Some(output) => self.binding.to_response(output),
            None => self.binding.to_response(exchange.input()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::make_processor;
    use crate::protocol::TransportError;

    use std::convert::Infallible;
    use std::io;
    use std::io::ErrorKind;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use http::{Method, StatusCode, Version};
    use mockall::Sequence;
    use mockall::mock;

    mock! {
        pub Chan {}

        #[async_trait]
        impl Channel for Chan {
            async fn write(&mut self, response: Response<Bytes>) -> Result<(), TransportError>;
            async fn close(&mut self) -> Result<(), TransportError>;
            fn remote_addr(&self) -> SocketAddr;
        }
    }

    struct CountingProcessor {
        calls: AtomicUsize,
    }

    impl CountingProcessor {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Processor<()> for CountingProcessor {
        type Message = String;
        type Error = Infallible;

        async fn process(&self, request: Request<()>) -> Result<Exchange<String>, Infallible> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Exchange::new(request.uri().path().to_string()))
        }
    }

    struct TextBinding;

    impl ResponseBinding for TextBinding {
        type Message = String;

        fn to_response(&self, message: &String) -> Response<Bytes> {
            let mut response = Response::new(Bytes::from(message.clone()));
            *response.status_mut() = StatusCode::OK;
            response
        }
    }

    fn request(version: Version, headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().method(Method::GET).uri("/hello").version(version);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    fn lifecycle(
        channel: MockChan,
    ) -> (ConnectionLifecycle<MockChan, CountingProcessor, TextBinding>, Arc<CountingProcessor>, Arc<ServiceState>) {
        let processor = Arc::new(CountingProcessor::new());
        let state = Arc::new(ServiceState::new());
        let handler =
            ConnectionLifecycle::new(channel, processor.clone(), Arc::new(TextBinding), state.clone());
        (handler, processor, state)
    }

    #[tokio::test]
    async fn expect_continue_writes_interim_and_skips_processor() {
        let mut channel = MockChan::new();
        channel
            .expect_write()
            .withf(|response| {
                response.status() == StatusCode::CONTINUE
                    && response.version() == Version::HTTP_11
                    && response.body().is_empty()
            })
            .times(1)
            .returning(|_| Ok(()));

        let (mut handler, processor, _state) = lifecycle(channel);
        handler.on_message(request(Version::HTTP_11, &[("expect", "100-continue")])).await.unwrap();

        assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
        assert!(handler.request().is_some());
    }

    #[tokio::test]
    async fn plain_request_is_forwarded_unchanged() {
        let mut channel = MockChan::new();
        channel
            .expect_write()
            .withf(|response| response.status() == StatusCode::OK && response.body() == "/hello")
            .times(1)
            .returning(|_| Ok(()));

        let (mut handler, processor, _state) = lifecycle(channel);
        handler
            .on_message(request(Version::HTTP_11, &[("connection", "keep-alive")]))
            .await
            .unwrap();

        assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn close_decision_without_request_is_close() {
        let (handler, _processor, _state) = lifecycle(MockChan::new());
        assert_eq!(handler.close_decision(), CloseDecision::CloseAfterWrite);
    }

    #[tokio::test]
    async fn close_decision_follows_stored_request() {
        let mut channel = MockChan::new();
        channel.expect_write().returning(|_| Ok(()));
        channel.expect_close().times(1).returning(|| Ok(()));

        let (mut handler, _processor, _state) = lifecycle(channel);

        handler.on_message(request(Version::HTTP_11, &[])).await.unwrap();
        assert_eq!(handler.close_decision(), CloseDecision::KeepOpen);

        handler.on_message(request(Version::HTTP_11, &[("connection", "close")])).await.unwrap();
        assert_eq!(handler.close_decision(), CloseDecision::CloseAfterWrite);
    }

    #[tokio::test]
    async fn response_ready_closes_only_after_write() {
        let mut channel = MockChan::new();
        let mut seq = Sequence::new();
        channel
            .expect_write()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        channel.expect_close().times(1).in_sequence(&mut seq).returning(|| Ok(()));

        let (mut handler, _processor, _state) = lifecycle(channel);
        // no request recorded: non-persistent by definition
        handler.on_response_ready(Exchange::new("body".to_string())).await.unwrap();
    }

    #[tokio::test]
    async fn populated_output_wins_over_default_message() {
        let mut channel = MockChan::new();
        channel
            .expect_write()
            .withf(|response| response.body() == "out message")
            .times(1)
            .returning(|_| Ok(()));
        channel.expect_close().times(1).returning(|| Ok(()));

        let (mut handler, _processor, _state) = lifecycle(channel);
        let exchange = Exchange::with_output("in message".to_string(), "out message".to_string());
        handler.on_response_ready(exchange).await.unwrap();
    }

    #[tokio::test]
    async fn benign_closed_race_is_not_closed_again() {
        // no close expectation: any close call fails the test
        let channel = MockChan::new();
        let (mut handler, _processor, _state) = lifecycle(channel);

        handler.on_error(TransportError::ChannelClosed.into()).await;
        handler
            .on_error(TransportError::io(io::Error::from(ErrorKind::ConnectionReset)).into())
            .await;
    }

    #[tokio::test]
    async fn transport_fault_closes_exactly_once() {
        let mut channel = MockChan::new();
        channel.expect_close().times(1).returning(|| Ok(()));

        let (mut handler, _processor, _state) = lifecycle(channel);
        handler
            .on_error(TransportError::io(io::Error::from(ErrorKind::InvalidData)).into())
            .await;
    }

    #[tokio::test]
    async fn processor_fault_closes_the_connection() {
        let mut channel = MockChan::new();
        channel.expect_close().times(1).returning(|| Ok(()));

        let (mut handler, _processor, _state) = lifecycle(channel);
        handler.on_error(LifecycleError::processor("application blew up")).await;
    }

    #[tokio::test]
    async fn shutdown_suppresses_error_handling() {
        let channel = MockChan::new();
        let (mut handler, _processor, state) = lifecycle(channel);

        state.shutdown();
        handler
            .on_error(TransportError::io(io::Error::from(ErrorKind::InvalidData)).into())
            .await;
        // no close happened and no state changed
        assert!(handler.request().is_none());
    }

    #[tokio::test]
    async fn close_failure_is_swallowed() {
        let mut channel = MockChan::new();
        channel
            .expect_close()
            .times(1)
            .returning(|| Err(TransportError::io(io::Error::from(ErrorKind::BrokenPipe))));

        let (mut handler, _processor, _state) = lifecycle(channel);
        handler
            .on_error(TransportError::io(io::Error::from(ErrorKind::InvalidData)).into())
            .await;
    }

    #[tokio::test]
    async fn keep_alive_cycle_with_continue_stays_open() {
        let mut channel = MockChan::new();
        let mut seq = Sequence::new();
        channel
            .expect_write()
            .withf(|response| response.status() == StatusCode::CONTINUE)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        channel
            .expect_write()
            .withf(|response| response.status() == StatusCode::OK && response.body() == "/hello")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        // no close expectation: the connection must stay open

        let (mut handler, processor, _state) = lifecycle(channel);

        let headers = [("expect", "100-continue"), ("connection", "keep-alive")];
        handler.on_message(request(Version::HTTP_11, &headers)).await.unwrap();
        assert_eq!(processor.calls.load(Ordering::SeqCst), 0);

        // body has arrived, the transport redelivers down the standard path
        handler.forward(request(Version::HTTP_11, &headers)).await.unwrap();
        assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(handler.close_decision(), CloseDecision::KeepOpen);
    }

    #[tokio::test]
    async fn connection_close_cycle_closes_after_final_write() {
        let mut channel = MockChan::new();
        let mut seq = Sequence::new();
        channel
            .expect_write()
            .withf(|response| response.status() == StatusCode::OK)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        channel.expect_close().times(1).in_sequence(&mut seq).returning(|| Ok(()));

        let (mut handler, _processor, _state) = lifecycle(channel);
        handler.on_message(request(Version::HTTP_11, &[("connection", "close")])).await.unwrap();
    }
}
