//! Report and chart output

pub mod charts;
pub mod formatter;
pub mod report;

pub use charts::ChartEmitter;
pub use formatter::{ReportEmitter, ReportGenerator};
pub use report::AnalysisReport;
