//! Local HTTP surface over a [Session]. The axum layer only moves requests in and out;
//! all routing and payload work happens in [routes::route_request].

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tower_http::services::ServeDir;

use crate::session::Session;

pub mod api;
pub mod routes;

pub const STATIC_DIR: &str = "frontend/dist";

pub type SharedSession = Arc<Mutex<Session>>;

/// API routes under `/api`, static files from [STATIC_DIR] for everything else.
pub fn router(session: SharedSession) -> Router {
    Router::new()
        .route("/api", any(api_handler))
        .route("/api/*rest", any(api_handler))
        .fallback_service(ServeDir::new(STATIC_DIR))
        .with_state(session)
}

async fn api_handler(
    State(session): State<SharedSession>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let body = String::from_utf8_lossy(&body);

    // Mutations run to completion under the lock; no two events interleave.
    let response = match session.lock() {
        Ok(mut guard) => routes::route_request(&mut guard, method.as_str(), &target, &body),
        Err(err) => {
            tracing::error!("session lock poisoned: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "session unavailable").into_response();
        }
    };
    tracing::debug!(%method, path = %target, status = response.status_code, "api request");

    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, response.content_type)],
        response.body,
    )
        .into_response()
}

pub fn run_server(bind_addr: &str, session: Session) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(bind_addr, session))
}

async fn serve(bind_addr: &str, session: Session) -> std::io::Result<()> {
    let app = router(Arc::new(Mutex::new(session)));
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("muster server listening on http://{bind_addr}");
    axum::serve(listener, app).await
}
