pub mod daily_summary;
pub mod report_summary;
pub mod vegetable_report;
pub mod vegetable_sale;
