//! Per-client key resolution for the edge layer.
//!
//! The key is the peer IP address, the same value an IP-keyed rate limiter
//! buckets requests by. Every request is logged inside a span carrying it.

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::{Instrument, debug, info_span};

pub const UNKNOWN_CLIENT: &str = "unknown";

pub fn resolve_client_key(peer: Option<SocketAddr>) -> String {
    match peer {
        Some(addr) => addr.ip().to_canonical().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}

pub async fn trace_client_key(request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_key = resolve_client_key(peer);

    let span = info_span!(
        "request",
        client_key = %client_key,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let response = next.run(request).await;
        debug!(status = response.status().as_u16(), "request completed");
        response
    }
    .instrument(span)
    .await
}
