// Daily ledger
pub mod daily_summary;
pub mod vegetables;

// Reporting and analysis
pub mod analytics;
pub mod charts;
pub mod reports;
