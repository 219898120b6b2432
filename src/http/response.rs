//! Response handling and transformation.
//!
//! # Responsibilities
//! - Mark which origin served the response (`X-ILR-Proxy-Source`)
//! - Strip hop-by-hop headers from the upstream response
//! - Stream the upstream body back without buffering
//!
//! # Design Decisions
//! - The annotation always overwrites a value set upstream
//! - Annotating never fails and never blocks

use axum::body::Body;
use axum::http::Response;
use hyper::body::Incoming;

use crate::http::headers::{strip_hop_by_hop, X_ILR_PROXY_SOURCE};
use crate::upstream::Origin;

/// Set `X-ILR-Proxy-Source` to the host that was dialed.
pub fn annotate_response<B>(response: &mut Response<B>, origin: &Origin) {
    response
        .headers_mut()
        .insert(X_ILR_PROXY_SOURCE, origin.host_header().clone());
}

/// Turn an upstream response into the client response.
pub fn prepare_response(response: Response<Incoming>, origin: &Origin) -> Response<Body> {
    let mut response = response.map(Body::new);
    strip_hop_by_hop(response.headers_mut());
    annotate_response(&mut response, origin);
    response
}
