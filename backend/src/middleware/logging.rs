use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::CONTENT_LENGTH, Request, StatusCode},
    middleware::Next,
    response::Response,
    Error as AxumError,
};
use std::time::Instant;

use crate::middleware::request_id::RequestId;

const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;
const MAX_LOGGED_BODY_BYTES: usize = 2048;

struct RequestSummary {
    method: String,
    uri: String,
    request_id: Option<String>,
    latency_ms: u64,
}

/// Logs every 4xx response at warn and every 5xx at error, with a preview of
/// the body. The body is buffered and forwarded unchanged.
pub async fn log_error_responses(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let request_id = req.extensions().get::<RequestId>().map(|id| id.0.clone());
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }
    let summary = RequestSummary {
        method,
        uri,
        request_id,
        latency_ms: start.elapsed().as_millis() as u64,
    };

    let (mut parts, body) = response.into_parts();
    match buffer_body(body).await {
        Ok((bytes, preview)) => {
            log_error_event(status, &summary, &preview, None);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            parts.headers.remove(CONTENT_LENGTH);
            log_error_event(status, &summary, "", Some(err));
            Response::from_parts(parts, Body::empty())
        }
    }
}

async fn buffer_body(body: Body) -> Result<(Bytes, String), AxumError> {
    let bytes = to_bytes(body, MAX_BUFFERED_BODY_BYTES).await?;
    Ok((bytes.clone(), body_preview(&bytes)))
}

fn body_preview(bytes: &Bytes) -> String {
    if bytes.len() > MAX_LOGGED_BODY_BYTES {
        format!(
            "{}... (truncated, {} bytes total)",
            String::from_utf8_lossy(&bytes[..MAX_LOGGED_BODY_BYTES]),
            bytes.len()
        )
    } else {
        String::from_utf8_lossy(bytes).to_string()
    }
}

fn log_error_event(
    status: StatusCode,
    summary: &RequestSummary,
    body_preview: &str,
    body_error: Option<AxumError>,
) {
    let status = status.as_u16();
    let request_id = summary.request_id.as_deref().unwrap_or("-");
    let message = if body_error.is_some() {
        "Failed to read error response body"
    } else {
        "Request completed with error status"
    };
    let error = body_error.map(|err| err.to_string());

    if status >= 500 {
        tracing::error!(
            status,
            method = %summary.method,
            uri = %summary.uri,
            request_id,
            latency_ms = summary.latency_ms,
            body = body_preview,
            error = ?error,
            "{}",
            message
        );
    } else {
        tracing::warn!(
            status,
            method = %summary.method,
            uri = %summary.uri,
            request_id,
            latency_ms = summary.latency_ms,
            body = body_preview,
            error = ?error,
            "{}",
            message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_bodies_are_truncated_in_the_preview() {
        let bytes = Bytes::from(vec![b'a'; MAX_LOGGED_BODY_BYTES + 10]);
        let preview = body_preview(&bytes);
        assert!(preview.ends_with(&format!("(truncated, {} bytes total)", bytes.len())));
    }

    #[test]
    fn short_bodies_are_logged_verbatim() {
        let bytes = Bytes::from_static(b"{\"error\":\"nope\"}");
        assert_eq!(body_preview(&bytes), "{\"error\":\"nope\"}");
    }
}
