//! CSV report writer.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use csv::WriterBuilder;
use log::info;

use super::export_model::ReportRow;
use super::export_traits::ReportExporter;
use crate::errors::{Error, Result};
use crate::lifecycle::Event;

pub const REPORT_HEADERS: [&str; 4] = ["No.", "Name", "Amount", "Time"];

/// Writes `rows` as CSV into any writer, with a header line.
pub fn write_report_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer
        .write_record(REPORT_HEADERS)
        .map_err(|e| Error::Export(e.to_string()))?;

    for (index, row) in rows.iter().enumerate() {
        csv_writer
            .write_record([
                (index + 1).to_string(),
                row.donor_name.clone(),
                row.amount.to_string(),
                row.confirmed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ])
            .map_err(|e| Error::Export(e.to_string()))?;
    }

    csv_writer.flush().map_err(|e| Error::Export(e.to_string()))?;
    Ok(())
}

/// Renders the report into an in-memory CSV string.
pub fn render_report_csv(rows: &[ReportRow]) -> Result<String> {
    let mut buffer = Vec::new();
    write_report_csv(rows, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::Export(e.to_string()))
}

/// Exports final reports as CSV files under a directory.
#[derive(Debug, Clone)]
pub struct CsvReportExporter {
    report_dir: PathBuf,
}

impl CsvReportExporter {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }
}

impl ReportExporter for CsvReportExporter {
    fn export(&self, event: &Event, rows: &[ReportRow]) -> Result<String> {
        fs::create_dir_all(&self.report_dir).map_err(|e| {
            Error::Export(format!("{}: {}", self.report_dir.display(), e))
        })?;
        let file_name = format!(
            "donations_{}_{}.csv",
            event.id,
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.report_dir.join(file_name);
        let file = File::create(&path)
            .map_err(|e| Error::Export(format!("{}: {}", path.display(), e)))?;
        write_report_csv(rows, file)?;

        info!(
            "Wrote report for event {} with {} row(s) to {}",
            event.id,
            rows.len(),
            path.display()
        );
        Ok(path.to_string_lossy().into_owned())
    }
}
