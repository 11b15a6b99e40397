pub mod charts;
pub mod common;
pub mod context;
pub mod monthly;
pub mod reports;
pub mod vegetables;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        analytics::AnalyticsService,
        charts::{ChartService, ChartSize},
        daily_summary::DailySummaryService,
        reports::ReportService,
        vegetables::VegetableService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub vegetables: Arc<VegetableService>,
    pub daily_summaries: Arc<DailySummaryService>,
    pub reports: Arc<ReportService>,
    pub charts: Arc<ChartService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        let chart_size = ChartSize::from(config);

        Self {
            vegetables: Arc::new(VegetableService::new(
                db_pool.clone(),
                config.default_vegetables.clone(),
            )),
            daily_summaries: Arc::new(DailySummaryService::new(db_pool.clone())),
            reports: Arc::new(ReportService::new(db_pool.clone(), chart_size)),
            charts: Arc::new(ChartService::new(db_pool.clone(), chart_size)),
            analytics: Arc::new(AnalyticsService::new(db_pool, chart_size)),
        }
    }
}
