use crate::{
    db::DbPool,
    entities::{
        daily_summary::{self, Entity as DailySummary},
        vegetable_sale::{self, Entity as VegetableSale},
    },
    errors::ServiceError,
    reports::DailyTotals,
};
use chrono::NaiveDate;
use sea_orm::{sea_query::OnConflict, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument};

/// Computes a day's totals and keeps the stored daily summary in step.
#[derive(Clone)]
pub struct DailySummaryService {
    db_pool: Arc<DbPool>,
}

impl DailySummaryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Recomputes the totals for `date` and overwrites its summary row.
    #[instrument(skip(self))]
    pub async fn calculate(&self, date: NaiveDate) -> Result<DailyTotals, ServiceError> {
        let db = &*self.db_pool;

        let records = VegetableSale::find()
            .filter(vegetable_sale::Column::Date.eq(date))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let totals = DailyTotals::from_records(&records);

        let summary = daily_summary::ActiveModel {
            date: Set(date),
            total_purchase_price: Set(totals.total_purchase_price),
            total_selling_price: Set(totals.total_selling_price),
            total_profit: Set(totals.profit),
            total_loss: Set(totals.loss),
            ..Default::default()
        };

        DailySummary::insert(summary)
            .on_conflict(
                OnConflict::column(daily_summary::Column::Date)
                    .update_columns([
                        daily_summary::Column::TotalPurchasePrice,
                        daily_summary::Column::TotalSellingPrice,
                        daily_summary::Column::TotalProfit,
                        daily_summary::Column::TotalLoss,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(
            date = %date,
            records = records.len(),
            profit = totals.profit,
            loss = totals.loss,
            "Daily summary recalculated"
        );

        Ok(totals)
    }
}
