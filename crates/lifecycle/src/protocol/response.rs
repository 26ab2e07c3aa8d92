//! Interim response construction.

use bytes::Bytes;
use http::{Response, StatusCode, Version};

/// Builds the interim `100 Continue` response sent back when a request
/// carries `Expect: 100-continue`.
///
/// The response uses the protocol version of the request that asked for it
/// and carries no body.
pub fn continue_response(version: Version) -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = StatusCode::CONTINUE;
    *response.version_mut() = version;
    response
}
