use crate::{
    charts::{self, ChartKind, ChartSpec, Series, GREEN, ORANGE, RED},
    config::AppConfig,
    db::DbPool,
    entities::vegetable_sale::{self, Entity as VegetableSale},
    errors::ServiceError,
    reports::margin_split,
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const NO_DATA_FOR_DATE: &str = "No data found for selected date";

/// Pixel size every rendered chart uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
        }
    }
}

impl From<&AppConfig> for ChartSize {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            width: cfg.chart_width,
            height: cfg.chart_height,
        }
    }
}

/// Renders `spec` as a `data:` URI for charts that accompany computed figures.
/// A rendering failure is logged and yields `None`; the figures are returned
/// either way.
pub(crate) fn accompanying_chart(spec: &ChartSpec) -> Option<String> {
    match charts::render(spec) {
        Ok(png) => Some(charts::to_data_uri(&png)),
        Err(err) => {
            warn!(error = %err, title = %spec.title, "Chart skipped");
            None
        }
    }
}

/// Per-date charts drawn straight from the day's records.
#[derive(Clone)]
pub struct ChartService {
    db_pool: Arc<DbPool>,
    size: ChartSize,
}

impl ChartService {
    pub fn new(db_pool: Arc<DbPool>, size: ChartSize) -> Self {
        Self { db_pool, size }
    }

    async fn records_for(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<vegetable_sale::Model>, ServiceError> {
        let records = VegetableSale::find()
            .filter(vegetable_sale::Column::Date.eq(date))
            .order_by_asc(vegetable_sale::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        if records.is_empty() {
            return Err(ServiceError::NotFound(NO_DATA_FOR_DATE.to_string()));
        }
        Ok(records)
    }

    fn encode(&self, spec: ChartSpec) -> Result<String, ServiceError> {
        let png = charts::render(&spec.size(self.size.width, self.size.height))?;
        debug!(bytes = png.len(), "Chart rendered");
        Ok(charts::to_base64(&png))
    }

    /// Purchase and selling unit prices as two lines; missing prices leave gaps.
    #[instrument(skip(self))]
    pub async fn price_chart(&self, date: NaiveDate) -> Result<String, ServiceError> {
        let records = self.records_for(date).await?;
        self.encode(price_spec(date, &records))
    }

    /// Purchase and selling totals side by side per vegetable.
    #[instrument(skip(self))]
    pub async fn grouped_bar_chart(&self, date: NaiveDate) -> Result<String, ServiceError> {
        let records = self.records_for(date).await?;
        self.encode(grouped_bar_spec(date, &records))
    }

    /// Profit (green) with loss (red) stacked on top, per vegetable.
    #[instrument(skip(self))]
    pub async fn stacked_profit_loss_chart(&self, date: NaiveDate) -> Result<String, ServiceError> {
        let records = self.records_for(date).await?;
        self.encode(stacked_profit_loss_spec(date, &records))
    }
}

fn vegetable_axis(records: &[vegetable_sale::Model]) -> impl Iterator<Item = String> + '_ {
    records.iter().map(|r| r.vegetable.clone())
}

fn price_spec(date: NaiveDate, records: &[vegetable_sale::Model]) -> ChartSpec {
    ChartSpec::new(ChartKind::Line, format!("Price Analysis for {}", date))
        .axes("Vegetables", "Price (per kg)")
        .categories(vegetable_axis(records))
        .series(Series::new(
            "Purchase Price",
            records.iter().map(|r| r.purchase_price).collect(),
            GREEN,
        ))
        .series(Series::new(
            "Selling Price",
            records.iter().map(|r| r.selling_price).collect(),
            ORANGE,
        ))
}

fn grouped_bar_spec(date: NaiveDate, records: &[vegetable_sale::Model]) -> ChartSpec {
    let total = |price: Option<f64>, quantity: Option<f64>| {
        price.unwrap_or(0.0) * quantity.unwrap_or(0.0)
    };

    ChartSpec::new(
        ChartKind::GroupedBar,
        format!("Purchase vs Selling Price on {}", date),
    )
    .axes("Vegetables", "Price")
    .categories(vegetable_axis(records))
    .series(Series::from_values(
        "Purchase",
        records
            .iter()
            .map(|r| total(r.purchase_price, r.quantity))
            .collect(),
        ORANGE,
    ))
    .series(Series::from_values(
        "Selling",
        records
            .iter()
            .map(|r| total(r.selling_price, r.quantity))
            .collect(),
        GREEN,
    ))
}

fn stacked_profit_loss_spec(date: NaiveDate, records: &[vegetable_sale::Model]) -> ChartSpec {
    let (profits, losses): (Vec<f64>, Vec<f64>) = records.iter().map(margin_split).unzip();

    ChartSpec::new(
        ChartKind::StackedBar,
        format!("Stacked Profit and Loss Chart on {}", date),
    )
    .axes("Vegetables", "Amount")
    .categories(vegetable_axis(records))
    .series(Series::from_values("Profit", profits, GREEN))
    .series(Series::from_values("Loss", losses, RED))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(vegetable: &str, q: Option<f64>, pp: Option<f64>, sp: Option<f64>) -> vegetable_sale::Model {
        vegetable_sale::Model {
            id: 0,
            date: date(),
            vegetable: vegetable.to_string(),
            quantity: q,
            purchase_price: pp,
            selling_price: sp,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn sample() -> Vec<vegetable_sale::Model> {
        vec![
            record("Onion", Some(10.0), Some(5.0), Some(8.0)),
            record("Tomato", Some(10.0), Some(8.0), Some(6.0)),
            record("Carrot", None, Some(3.0), None),
        ]
    }

    #[test]
    fn accompanying_chart_is_dropped_when_rendering_fails() {
        let broken = ChartSpec::new(ChartKind::Bar, "Quantity")
            .categories(["Onion", "Tomato"])
            .series(Series::from_values("Quantity", vec![1.0, f64::INFINITY], GREEN));
        assert_eq!(accompanying_chart(&broken), None);

        let fine = ChartSpec::new(ChartKind::Bar, "Quantity")
            .categories(["Onion"])
            .series(Series::from_values("Quantity", vec![1.0], GREEN))
            .size(240, 200);
        let uri = accompanying_chart(&fine).expect("chart rendered");
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn price_spec_keeps_missing_prices_as_gaps() {
        let spec = price_spec(date(), &sample());

        assert_eq!(spec.title, "Price Analysis for 2024-05-01");
        assert_eq!(spec.y_label, "Price (per kg)");
        assert_eq!(spec.categories, ["Onion", "Tomato", "Carrot"]);
        assert_eq!(spec.series[0].values, [Some(5.0), Some(8.0), Some(3.0)]);
        assert_eq!(spec.series[1].values, [Some(8.0), Some(6.0), None]);
    }

    #[test]
    fn grouped_spec_counts_missing_fields_as_zero() {
        let spec = grouped_bar_spec(date(), &sample());

        assert_eq!(spec.title, "Purchase vs Selling Price on 2024-05-01");
        assert_eq!(spec.series[0].values, [Some(50.0), Some(80.0), Some(0.0)]);
        assert_eq!(spec.series[1].values, [Some(80.0), Some(60.0), Some(0.0)]);
    }

    #[test]
    fn stacked_spec_routes_whole_margin() {
        let spec = stacked_profit_loss_spec(date(), &sample());

        assert_eq!(spec.title, "Stacked Profit and Loss Chart on 2024-05-01");
        assert_eq!(spec.series[0].name, "Profit");
        assert_eq!(spec.series[0].values, [Some(30.0), Some(0.0), Some(0.0)]);
        assert_eq!(spec.series[1].values, [Some(0.0), Some(20.0), Some(0.0)]);
    }
}
