//! Request head snapshot and the HTTP/1.1 predicates derived from it.
//!
//! The lifecycle handler never keeps a request body around. What it stores per
//! connection is a [`RequestHead`], a bodiless copy of the most recently
//! received request, which is enough to answer the two questions the protocol
//! layer asks later: does the client expect a `100 Continue`, and did it ask
//! for a persistent connection.

use http::header::{CONNECTION, EXPECT};
use http::{HeaderMap, HeaderValue, Method, Request, Uri, Version};

/// A bodiless snapshot of an HTTP request.
///
/// This struct wraps a `http::Request<()>` to provide:
/// - Access to standard HTTP header fields
/// - The keep-alive and expect-continue predicates
/// - Cheap construction from a full request without consuming it
#[derive(Debug)]
pub struct RequestHead {
    inner: Request<()>,
}

impl AsRef<Request<()>> for RequestHead {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl RequestHead {
    /// Consumes the head and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Whether the client asked for a persistent connection.
    ///
    /// HTTP/1.1 connections are persistent unless the request carries
    /// `Connection: close`. HTTP/1.0 (and 0.9) connections are persistent
    /// only when the request explicitly carries `Connection: keep-alive`.
    pub fn is_keep_alive(&self) -> bool {
        let connection = self.headers().get(CONNECTION);
        match self.version() {
            Version::HTTP_09 | Version::HTTP_10 => {
                connection.is_some_and(|value| connection_has_token(value, "keep-alive"))
            }
            _ => !connection.is_some_and(|value| connection_has_token(value, "close")),
        }
    }

    /// Whether the client expects an interim `100 Continue` before sending
    /// the request body.
    ///
    /// The `Expect` header is an HTTP/1.1 mechanism; on older protocol
    /// versions it is ignored per RFC 9110.
    pub fn expects_continue(&self) -> bool {
        if matches!(self.version(), Version::HTTP_09 | Version::HTTP_10) {
            return false;
        }
        self.headers()
            .get(EXPECT)
            .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"100-continue"))
    }
}

/// Scans a `Connection` header value for a token, case-insensitively.
///
/// The header is a comma-separated token list, e.g. `keep-alive, Upgrade`.
fn connection_has_token(value: &HeaderValue, token: &str) -> bool {
    value
        .to_str()
        .map(|s| s.split(',').any(|candidate| candidate.trim().eq_ignore_ascii_case(token)))
        .unwrap_or(false)
}

/// Snapshots the head of a request without consuming it, so the full request
/// can still be forwarded downstream afterwards.
impl<B> From<&Request<B>> for RequestHead {
    fn from(request: &Request<B>) -> Self {
        let mut inner = Request::new(());
        *inner.method_mut() = request.method().clone();
        *inner.uri_mut() = request.uri().clone();
        *inner.version_mut() = request.version();
        *inner.headers_mut() = request.headers().clone();
        Self { inner }
    }
}

impl From<Request<()>> for RequestHead {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}
