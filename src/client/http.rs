//! One-shot HTTP requests over the sidecar's Unix socket.
//!
//! Each call opens a fresh connection, performs a single GET, reads the
//! whole body, and lets the connection drop. No pooling and no retry —
//! callers that want another attempt call again, which re-enters the
//! (cheap, memoized) readiness check above this layer.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::client::conn::http1;
use hyper::{Method, Request, header};
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;

use crate::client::error::{RequestError, Result};

/// Perform `GET request_path` against the sidecar and parse the JSON body.
///
/// Bounded by `request_timeout` end to end (connect through body).
pub(crate) async fn get_json(
    socket_path: &Path,
    request_path: &str,
    request_timeout: Duration,
) -> Result<serde_json::Value> {
    match tokio::time::timeout(request_timeout, round_trip(socket_path, request_path)).await {
        Ok(result) => result,
        Err(_) => Err(RequestError::Timeout {
            timeout: request_timeout,
        }),
    }
}

async fn round_trip(socket_path: &Path, request_path: &str) -> Result<serde_json::Value> {
    let stream = UnixStream::connect(socket_path)
        .await
        .map_err(|e| transport(format!("connect to {}: {e}", socket_path.display())))?;

    let (mut sender, conn) = http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| transport(format!("handshake: {e}")))?;

    // The connection task finishes when the request completes or either
    // side drops; errors here also surface on send_request.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!(error = %e, "Sidecar connection closed with error");
        }
    });

    let request = Request::builder()
        .method(Method::GET)
        .uri(request_path)
        .header(header::HOST, "localhost")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Empty::<Bytes>::new())
        .map_err(|e| transport(format!("build request: {e}")))?;

    tracing::debug!(path = request_path, "Sidecar request");

    let response = sender
        .send_request(request)
        .await
        .map_err(|e| transport(format!("send request: {e}")))?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| transport(format!("read response body: {e}")))?
        .to_bytes();

    if !status.is_success() {
        return Err(RequestError::Remote {
            status: status.as_u16(),
        });
    }

    serde_json::from_slice(&body).map_err(|e| RequestError::ResponseParse {
        reason: e.to_string(),
    })
}

fn transport(reason: String) -> RequestError {
    RequestError::Transport { reason }
}
