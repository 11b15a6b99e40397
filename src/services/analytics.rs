use crate::{
    charts::{ChartKind, ChartSpec, Series, LIGHT_GREEN},
    db::DbPool,
    entities::vegetable_sale::{self, Entity as VegetableSale},
    errors::ServiceError,
    reports::{MonthlyAnalysis, MonthlySummary, VegetableMonthly, YearMonth},
    services::charts::{accompanying_chart, ChartSize},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

/// Monthly figures plus the quantity chart that accompanies them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyReport {
    pub vegetables: Vec<VegetableMonthly>,
    pub summary: MonthlySummary,
    /// `data:image/png;base64,` URI; `null` when the chart could not be drawn
    pub quantity_chart: Option<String>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    db_pool: Arc<DbPool>,
    chart_size: ChartSize,
}

impl AnalyticsService {
    pub fn new(db_pool: Arc<DbPool>, chart_size: ChartSize) -> Self {
        Self {
            db_pool,
            chart_size,
        }
    }

    /// Aggregates every record dated within `month`. An empty month is not an
    /// error: it yields no vegetables, a zero summary and a blank chart. A
    /// chart that cannot be drawn is left out without affecting the figures.
    #[instrument(skip(self, month), fields(month = %month))]
    pub async fn monthly(&self, month: YearMonth) -> Result<MonthlyReport, ServiceError> {
        let records = VegetableSale::find()
            .filter(vegetable_sale::Column::Date.between(month.first_day(), month.last_day()))
            .order_by_asc(vegetable_sale::Column::Date)
            .order_by_asc(vegetable_sale::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        let analysis = MonthlyAnalysis::from_records(&records);

        let spec = ChartSpec::new(
            ChartKind::Bar,
            format!("Vegetable Quantity Analysis - {}", month),
        )
        .axes("Vegetables", "Total Quantity")
        .categories(analysis.vegetables.iter().map(|v| v.vegetable.clone()))
        .series(Series::from_values(
            "Quantity",
            analysis.vegetables.iter().map(|v| v.quantity).collect(),
            LIGHT_GREEN,
        ))
        .size(self.chart_size.width, self.chart_size.height);

        let quantity_chart = accompanying_chart(&spec);

        info!(
            records = records.len(),
            vegetables = analysis.vegetables.len(),
            "Monthly analysis computed"
        );

        Ok(MonthlyReport {
            vegetables: analysis.vegetables,
            summary: analysis.summary,
            quantity_chart,
        })
    }
}
