use crate::error::Rejection;
use crate::handler::{Handler, IngestRequest, IngestResponse};
use axum::body::{to_bytes, Body};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};

#[derive(Clone)]
struct AppState {
    handler: Handler,
    max_body_bytes: usize,
}

/// Build the HTTP router around `handler`.
///
/// - `POST /` and `POST /logs`: ingest one log event. The token is checked
///   before the body is read, so unauthenticated callers always get 403;
///   authenticated bodies over `max_body_bytes` get 400.
/// - `GET /_health`: liveness check.
pub fn router(handler: Handler, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", post(ingest))
        .route("/logs", post(ingest))
        .route("/_health", get(health))
        // `ingest` enforces `max_body_bytes` itself.
        .layer(DefaultBodyLimit::disable())
        .layer(
            TraceLayer::new_for_http()
                .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(AppState {
            handler,
            max_body_bytes,
        })
}

/// Bind `addr` and serve until the process receives Ctrl-C.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "log relay listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
}

async fn ingest(State(state): State<AppState>, headers: HeaderMap, body: Body) -> Response {
    let mut request = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name, v)))
        .fold(IngestRequest::default(), |req, (name, value)| {
            req.with_header(name, value)
        });

    if let Err(rejection) = state.handler.authenticate(&request) {
        return rejection.into_response().into_response();
    }

    let bytes = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, limit = state.max_body_bytes, "failed to read request body");
            return Rejection::BodyTooLarge.into_response().into_response();
        }
    };
    request.body = if bytes.is_empty() { None } else { Some(bytes) };

    state.handler.handle(&request).await.into_response()
}

async fn health() -> &'static str {
    "ok"
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn response_keeps_status_and_content_type() {
        let resp = IngestResponse::text(StatusCode::FORBIDDEN, "Unauthorized").into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
