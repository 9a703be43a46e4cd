//! Report export - rows of the final report and the exporter seam.

mod csv_exporter;
mod export_model;
mod export_traits;

pub use csv_exporter::{render_report_csv, write_report_csv, CsvReportExporter, REPORT_HEADERS};
pub use export_model::ReportRow;
pub use export_traits::ReportExporter;
