use serde::Serialize;
use thiserror::Error;

use crate::catalog::{IngestError, Unit};
use crate::roster::export::{exporter_for, ExportError};
use crate::session::{EventOutcome, Session, SessionSnapshot, UiEvent};

#[derive(Debug, Error)]
pub enum EventPayloadError {
    #[error("{0}")]
    Parse(serde_json::Error),
    #[error("failed to encode response: {0}")]
    Encode(serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CatalogPayloadError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ExportPayloadError {
    #[error("unknown export format '{0}' (expected csv or text)")]
    UnknownFormat(String),
    #[error(transparent)]
    Export(#[from] ExportError),
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "muster-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn state_payload(session: &Session) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&session.snapshot())
}

#[derive(Debug, Serialize)]
struct CatalogResponse<'a> {
    units: &'a [Unit],
    nations: Vec<String>,
}

/// Full catalog (unfiltered) plus nation filter options.
pub fn catalog_payload(session: &Session) -> Result<String, serde_json::Error> {
    let catalog = session.catalog();
    serde_json::to_string_pretty(&CatalogResponse {
        units: catalog.units(),
        nations: catalog.nations(),
    })
}

/// Replace the catalog from a raw unit table body.
pub fn catalog_load_payload(session: &mut Session, body: &str) -> Result<String, CatalogPayloadError> {
    let count = session.load_catalog(body)?;
    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "units": count,
        "nations": session.catalog().nations(),
    }))?)
}

#[derive(Debug, Serialize)]
struct EventResponse {
    #[serde(flatten)]
    outcome: EventOutcome,
    state: SessionSnapshot,
}

pub fn event_payload(session: &mut Session, body: &str) -> Result<String, EventPayloadError> {
    let event: UiEvent = serde_json::from_str(body).map_err(EventPayloadError::Parse)?;
    let outcome = session.handle(event);
    serde_json::to_string_pretty(&EventResponse {
        outcome,
        state: session.snapshot(),
    })
    .map_err(EventPayloadError::Encode)
}

/// Query value for `key` in a `/path?a=b&c=d` request target.
pub fn query_param<'a>(path: &'a str, key: &str) -> Option<&'a str> {
    let query = path.split('?').nth(1)?;
    query.split('&').find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let name = parts.next()?.trim();
        (name == key).then(|| parts.next().unwrap_or("").trim())
    })
}

/// Export the current roster. Returns (content type, document).
pub fn export_payload(session: &Session, path: &str) -> Result<(&'static str, String), ExportPayloadError> {
    let format = query_param(path, "format").unwrap_or("csv");
    let exporter =
        exporter_for(format).ok_or_else(|| ExportPayloadError::UnknownFormat(format.to_string()))?;
    let roster = session.roster();
    let document = exporter.export(roster.selected(), roster.total())?;
    Ok((exporter.content_type(), document))
}

#[cfg(test)]
mod tests {
    use super::query_param;

    #[test]
    fn query_param_extracts_values() {
        assert_eq!(query_param("/api/roster/export?format=text", "format"), Some("text"));
        assert_eq!(query_param("/api/roster/export?a=1&format=csv", "format"), Some("csv"));
        assert_eq!(query_param("/api/roster/export", "format"), None);
        assert_eq!(query_param("/api/roster/export?formats=x", "format"), None);
    }
}
