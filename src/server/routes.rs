use crate::server::api;
use crate::session::Session;

pub struct HttpResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn ok(content_type: &'static str, body: String) -> Self {
        HttpResponse {
            status_code: 200,
            content_type,
            body,
        }
    }

    fn json(body: String) -> Self {
        Self::ok("application/json", body)
    }
}

pub fn route_request(session: &mut Session, method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, &err.to_string()),
        },
        ("GET", "/api/state") => match api::state_payload(session) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, &err.to_string()),
        },
        ("GET", "/api/catalog") => match api::catalog_payload(session) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, &err.to_string()),
        },
        ("POST", "/api/catalog") => match api::catalog_load_payload(session, body) {
            Ok(payload) => HttpResponse::json(payload),
            Err(api::CatalogPayloadError::Ingest(err)) => {
                tracing::warn!("catalog load rejected: {err}");
                error_response(400, &err.to_string())
            }
            Err(err) => error_response(500, &err.to_string()),
        },
        ("POST", "/api/events") => match api::event_payload(session, body) {
            Ok(payload) => HttpResponse::json(payload),
            Err(api::EventPayloadError::Parse(err)) => {
                error_response(400, &format!("Invalid event body: {err}"))
            }
            Err(err) => error_response(500, &err.to_string()),
        },
        ("GET", "/api/roster/export") => match api::export_payload(session, path) {
            Ok((content_type, document)) => HttpResponse::ok(content_type, document),
            Err(err @ api::ExportPayloadError::UnknownFormat(_)) => {
                error_response(400, &err.to_string())
            }
            Err(err) => {
                tracing::error!("roster export failed: {err}");
                error_response(500, &err.to_string())
            }
        },
        _ => error_response(404, "Route not found"),
    }
}

fn error_response(status_code: u16, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
