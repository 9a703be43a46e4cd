use super::export_model::ReportRow;
use crate::errors::Result;
use crate::lifecycle::Event;

/// Turns a final ledger snapshot into a report file.
///
/// Returns a reference (path or URL) to the written report.
pub trait ReportExporter: Send + Sync {
    fn export(&self, event: &Event, rows: &[ReportRow]) -> Result<String>;
}
