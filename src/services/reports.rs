use crate::{
    charts::{ChartKind, ChartSpec, Series, CATEGORY_CYCLE},
    db::DbPool,
    entities::{
        report_summary::{self, Entity as ReportSummary},
        vegetable_report::{self, Entity as VegetableReport},
        vegetable_sale::{self, Entity as VegetableSale},
    },
    errors::ServiceError,
    reports::{has_activity, ReportLine, ReportTotals},
    services::charts::{accompanying_chart, ChartSize},
};
use chrono::NaiveDate;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

pub const NOTHING_PURCHASED: &str = "No vegetables were purchased on this date.";

/// A regenerated per-date report, ready to render.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Report {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub lines: Vec<ReportLine>,
    pub summary: Option<ReportTotals>,
    pub message: Option<String>,
    /// `data:image/png;base64,` URI of the quantity chart, when requested and
    /// renderable.
    pub chart: Option<String>,
}

/// Service that rebuilds the stored report snapshot for a date.
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
    chart_size: ChartSize,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>, chart_size: ChartSize) -> Self {
        Self {
            db_pool,
            chart_size,
        }
    }

    /// Replaces the stored report for `date` with one derived from the
    /// current records. Records without any positive figure are left out;
    /// when none remain nothing is written and the report carries a message.
    #[instrument(skip(self))]
    pub async fn build(&self, date: NaiveDate, with_chart: bool) -> Result<Report, ServiceError> {
        let db = &*self.db_pool;

        let records = VegetableSale::find()
            .filter(vegetable_sale::Column::Date.eq(date))
            .order_by_asc(vegetable_sale::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let lines: Vec<ReportLine> = records
            .iter()
            .filter(|r| has_activity(r))
            .map(ReportLine::from_record)
            .collect();

        if lines.is_empty() {
            info!(date = %date, "No qualifying records for report");
            return Ok(Report {
                date,
                lines,
                summary: None,
                message: Some(NOTHING_PURCHASED.to_string()),
                chart: None,
            });
        }

        let totals = ReportTotals::from_lines(&lines);
        self.replace_snapshot(date, &lines, totals).await?;

        let chart = if with_chart {
            accompanying_chart(&self.quantity_spec(date, &lines))
        } else {
            None
        };

        info!(
            date = %date,
            rows = lines.len(),
            profit = totals.profit,
            loss = totals.loss,
            "Report regenerated"
        );

        Ok(Report {
            date,
            lines,
            summary: Some(totals),
            message: None,
            chart,
        })
    }

    /// Stored rows for `date`, as last written by [`Self::build`].
    pub async fn stored_rows(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<vegetable_report::Model>, ServiceError> {
        VegetableReport::find()
            .filter(vegetable_report::Column::Date.eq(date))
            .order_by_asc(vegetable_report::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn stored_summary(
        &self,
        date: NaiveDate,
    ) -> Result<Option<report_summary::Model>, ServiceError> {
        ReportSummary::find()
            .filter(report_summary::Column::Date.eq(date))
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    async fn replace_snapshot(
        &self,
        date: NaiveDate,
        lines: &[ReportLine],
        totals: ReportTotals,
    ) -> Result<(), ServiceError> {
        let rows: Vec<vegetable_report::ActiveModel> = lines
            .iter()
            .map(|line| vegetable_report::ActiveModel {
                date: Set(date),
                vegetable: Set(line.vegetable.clone()),
                quantity: Set(line.quantity),
                purchase_price: Set(line.purchase_price),
                selling_price: Set(line.selling_price),
                total_purchase: Set(line.total_purchase),
                total_selling: Set(line.total_selling),
                profit: Set(line.profit),
                loss: Set(line.loss),
                ..Default::default()
            })
            .collect();

        let summary = report_summary::ActiveModel {
            date: Set(date),
            total_purchase: Set(totals.total_purchase),
            total_selling: Set(totals.total_selling),
            profit: Set(totals.profit),
            loss: Set(totals.loss),
            ..Default::default()
        };

        self.db_pool
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    VegetableReport::delete_many()
                        .filter(vegetable_report::Column::Date.eq(date))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    VegetableReport::insert_many(rows)
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    ReportSummary::insert(summary)
                        .on_conflict(
                            OnConflict::column(report_summary::Column::Date)
                                .update_columns([
                                    report_summary::Column::TotalPurchase,
                                    report_summary::Column::TotalSelling,
                                    report_summary::Column::Profit,
                                    report_summary::Column::Loss,
                                ])
                                .to_owned(),
                        )
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })
    }

    fn quantity_spec(&self, date: NaiveDate, lines: &[ReportLine]) -> ChartSpec {
        ChartSpec::new(ChartKind::Bar, format!("Quantity Analysis for {}", date))
            .axes("Vegetables", "Quantity")
            .categories(lines.iter().map(|l| l.vegetable.clone()))
            .series(
                Series::from_values(
                    "Quantity",
                    lines.iter().map(|l| l.quantity).collect(),
                    CATEGORY_CYCLE[0],
                )
                .with_colors(&CATEGORY_CYCLE),
            )
            .size(self.chart_size.width, self.chart_size.height)
    }
}
