//! The application seam.
//!
//! A [`Processor`] turns a forwarded request into an [`Exchange`]: the
//! application-level result context from which the response body is later
//! resolved. Plain async functions can serve as processors through
//! [`make_processor`].

use std::error::Error;
use std::future::Future;

use async_trait::async_trait;
use http::Request;

/// Application-level request processing.
#[async_trait]
pub trait Processor<ReqBody> {
    /// The application message type carried by the exchange.
    type Message;
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn process(&self, request: Request<ReqBody>) -> Result<Exchange<Self::Message>, Self::Error>;
}

/// Result context of one processed request.
///
/// An exchange always carries the default ("in") message and may carry an
/// explicit output ("out") message. When the output is populated, it is the
/// one converted into the response; otherwise the default message is used.
#[derive(Debug)]
pub struct Exchange<M> {
    input: M,
    output: Option<M>,
}

impl<M> Exchange<M> {
    pub fn new(input: M) -> Self {
        Self { input, output: None }
    }

    pub fn with_output(input: M, output: M) -> Self {
        Self { input, output: Some(output) }
    }

    pub fn input(&self) -> &M {
        &self.input
    }

    pub fn output(&self) -> Option<&M> {
        self.output.as_ref()
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    pub fn set_output(&mut self, output: M) {
        self.output = Some(output);
    }
}

/// A [`Processor`] backed by a plain async function.
#[derive(Debug)]
pub struct ProcessorFn<F> {
    f: F,
}

#[async_trait]
impl<ReqBody, Msg, Err, F, Fut> Processor<ReqBody> for ProcessorFn<F>
where
    ReqBody: Send + 'static,
    F: Fn(Request<ReqBody>) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<Exchange<Msg>, Err>> + Send,
{
    type Message = Msg;
    type Error = Err;

    async fn process(&self, request: Request<ReqBody>) -> Result<Exchange<Self::Message>, Self::Error> {
        (self.f)(request).await
    }
}

pub fn make_processor<F, ReqBody, Msg, Err, Ret>(f: F) -> ProcessorFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Ret: Future<Output = Result<Exchange<Msg>, Err>>,
    F: Fn(Request<ReqBody>) -> Ret,
{
    ProcessorFn { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn exchange_output_selection_state() {
        let mut exchange = Exchange::new("in");
        assert!(!exchange.has_output());
        assert_eq!(exchange.input(), &"in");
        assert_eq!(exchange.output(), None);

        exchange.set_output("out");
        assert!(exchange.has_output());
        assert_eq!(exchange.output(), Some(&"out"));

        let prebuilt = Exchange::with_output("in", "out");
        assert_eq!(prebuilt.output(), Some(&"out"));
    }

    #[tokio::test]
    async fn processor_fn_adapts_async_functions() {
        let processor = make_processor(|request: Request<()>| async move {
            Ok::<_, Infallible>(Exchange::new(request.uri().path().to_string()))
        });

        let request = Request::builder().uri("/echo").body(()).unwrap();
        let exchange = processor.process(request).await.unwrap();
        assert_eq!(exchange.input(), "/echo");
    }
}
