pub mod assessment;
pub mod report_summary;
pub mod suggestions;
