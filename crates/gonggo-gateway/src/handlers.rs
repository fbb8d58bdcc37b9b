use axum::Json;
use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};

use super::proxy::forwarded_headers;
use super::server::AppState;

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Forward the request to the upstream owning its path.
pub(crate) async fn proxy_handler(State(state): State<AppState>, req: Request<Body>) -> Response {
    let (parts, body) = req.into_parts();
    let path = parts.uri.path();
    let Some(mut target) = state.upstreams.resolve(path) else {
        tracing::debug!(%path, "no upstream for path");
        return error_response(StatusCode::NOT_FOUND, format!("no route for {path}"));
    };
    if let Some(query) = parts.uri.query() {
        target.push('?');
        target.push_str(query);
    }

    let bytes = match to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(%path, "request body rejected: {e}");
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
        }
    };

    tracing::debug!(method = %parts.method, %path, %target, "proxying");
    let upstream = state
        .client
        .request(parts.method, &target)
        .headers(forwarded_headers(&parts.headers))
        .body(bytes)
        .send()
        .await;
    let upstream = match upstream {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(%target, "upstream request failed: {e}");
            return error_response(StatusCode::BAD_GATEWAY, "upstream unavailable");
        }
    };

    let status = upstream.status();
    let headers = forwarded_headers(upstream.headers());
    match upstream.bytes().await {
        Ok(body) => {
            let mut response = Response::new(Body::from(body));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Err(e) => {
            tracing::warn!(%target, "upstream body failed: {e}");
            error_response(StatusCode::BAD_GATEWAY, "upstream body unreadable")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok",
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }
}
