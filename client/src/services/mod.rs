//! Client services for the bean inspection workflow

pub mod feed;
pub mod inspection;
pub mod reports;

pub use feed::{ReportFeed, ReportListState};
pub use inspection::InspectionService;
pub use reports::{export_reports_csv, ReportAggregator};
