//! Roster export into printable artifacts. Exporters only borrow the selection, so a
//! failed export leaves roster state untouched.

use std::fmt::Write as _;

use thiserror::Error;

use crate::catalog::Unit;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("export buffer error: {0}")]
    Buffer(String),
}

pub trait ExportAdapter {
    /// MIME type of the produced document.
    fn content_type(&self) -> &'static str;

    fn export(&self, units: &[Unit], total: u32) -> Result<String, ExportError>;
}

/// Pick an exporter by name: "csv" or "text".
pub fn exporter_for(format: &str) -> Option<Box<dyn ExportAdapter + Send + Sync>> {
    match format.trim().to_ascii_lowercase().as_str() {
        "csv" => Some(Box::new(CsvExporter)),
        "text" | "txt" => Some(Box::new(TextExporter::default())),
        _ => None,
    }
}

/// One row per roster entry, then a TOTAL row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl ExportAdapter for CsvExporter {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn export(&self, units: &[Unit], total: u32) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["#", "Name", "Nation", "Points", "Special"])?;
        for (idx, unit) in units.iter().enumerate() {
            writer.write_record([
                (idx + 1).to_string(),
                unit.name.clone(),
                unit.nation.clone(),
                unit.points.to_string(),
                unit.special.clone(),
            ])?;
        }
        let total = total.to_string();
        writer.write_record(["", "TOTAL", "", total.as_str(), ""])?;
        let bytes = writer
            .into_inner()
            .map_err(|err| ExportError::Buffer(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| ExportError::Buffer(err.to_string()))
    }
}

/// Plain-text roster sheet.
#[derive(Debug, Clone)]
pub struct TextExporter {
    pub title: String,
}

impl Default for TextExporter {
    fn default() -> Self {
        Self {
            title: "Army Roster".to_string(),
        }
    }
}

fn format_stats(unit: &Unit) -> String {
    unit.stats
        .iter()
        .chain(unit.armor.iter())
        .map(|(name, value)| format!("{name} {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ExportAdapter for TextExporter {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn export(&self, units: &[Unit], total: u32) -> Result<String, ExportError> {
        let mut out = String::new();
        let generated = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
        let buffer_err = |err: std::fmt::Error| ExportError::Buffer(err.to_string());

        writeln!(out, "{}", self.title).map_err(buffer_err)?;
        writeln!(out, "Generated {generated}").map_err(buffer_err)?;
        writeln!(out).map_err(buffer_err)?;
        if units.is_empty() {
            writeln!(out, "(no units selected)").map_err(buffer_err)?;
        }
        for (idx, unit) in units.iter().enumerate() {
            let nation = if unit.nation.is_empty() { "-" } else { unit.nation.as_str() };
            writeln!(out, "{:>3}. {} [{}] {} pts", idx + 1, unit.name, nation, unit.points)
                .map_err(buffer_err)?;
            let stats = format_stats(unit);
            if !stats.is_empty() {
                writeln!(out, "     {stats}").map_err(buffer_err)?;
            }
            if !unit.special.is_empty() {
                writeln!(out, "     Special: {}", unit.special).map_err(buffer_err)?;
            }
        }
        writeln!(out).map_err(buffer_err)?;
        writeln!(out, "Total: {total} pts").map_err(buffer_err)?;
        Ok(out)
    }
}
