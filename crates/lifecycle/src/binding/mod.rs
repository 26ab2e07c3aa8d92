//! The response binding seam.
//!
//! How an application message becomes a wire response varies by deployment,
//! so the conversion is a capability injected into the lifecycle handler at
//! construction. The handler only picks which message of the exchange to
//! convert; it contains no conversion logic itself.

use bytes::Bytes;
use http::Response;

/// Converts an application message into a wire response.
pub trait ResponseBinding {
    /// The application message type this binding understands.
    type Message;

    fn to_response(&self, message: &Self::Message) -> Response<Bytes>;
}
