use crate::{
    db::DbPool,
    entities::vegetable_sale::{self, Entity as VegetableSale},
    errors::ServiceError,
};
use chrono::NaiveDate;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

/// Field values to write onto one record during a bulk save.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaleUpdate {
    pub id: i32,
    pub quantity: f64,
    pub purchase_price: f64,
    pub selling_price: f64,
}

impl SaleUpdate {
    /// Collects one update per `quantity_<id>` field. The matching
    /// `purchase_price_<id>` and `selling_price_<id>` fields default to zero
    /// when absent or blank. Any unparsable, negative or oversized number
    /// rejects the whole form.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Vec<Self>, ServiceError> {
        let mut updates = Vec::new();

        for (key, value) in form {
            let Some(raw_id) = key.strip_prefix("quantity_") else {
                continue;
            };
            let id = raw_id
                .parse::<i32>()
                .map_err(|_| ServiceError::InvalidInput(format!("Invalid record id: {}", raw_id)))?;

            updates.push(Self {
                id,
                quantity: parse_amount(key, Some(value))?,
                purchase_price: parse_amount(
                    &format!("purchase_price_{}", id),
                    form.get(&format!("purchase_price_{}", raw_id)),
                )?,
                selling_price: parse_amount(
                    &format!("selling_price_{}", id),
                    form.get(&format!("selling_price_{}", raw_id)),
                )?,
            });
        }

        updates.sort_by_key(|u| u.id);
        Ok(updates)
    }
}

/// Upper bound for a quantity or unit price. Keeps every `quantity * price`
/// product and its daily or monthly sum finite.
pub const MAX_AMOUNT: f64 = 1e12;

fn parse_amount(field: &str, value: Option<&String>) -> Result<f64, ServiceError> {
    let raw = value.map(|v| v.trim()).unwrap_or_default();
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(amount) if (0.0..=MAX_AMOUNT).contains(&amount) => Ok(amount),
        _ => Err(ServiceError::InvalidInput(format!(
            "Invalid value for {}: {}",
            field, raw
        ))),
    }
}

/// JSON echo of a record after it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VegetableView {
    pub name: String,
    pub quantity: Option<f64>,
    pub purchase_price: Option<f64>,
    pub selling_price: Option<f64>,
}

impl From<&vegetable_sale::Model> for VegetableView {
    fn from(model: &vegetable_sale::Model) -> Self {
        Self {
            name: model.vegetable.clone(),
            quantity: model.quantity,
            purchase_price: model.purchase_price,
            selling_price: model.selling_price,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub updated: usize,
    pub skipped: usize,
}

/// Daily per-vegetable records: seeding, add, delete and bulk edits.
#[derive(Clone)]
pub struct VegetableService {
    db_pool: Arc<DbPool>,
    default_vegetables: Arc<Vec<String>>,
}

impl VegetableService {
    pub fn new(db_pool: Arc<DbPool>, default_vegetables: Vec<String>) -> Self {
        Self {
            db_pool,
            default_vegetables: Arc::new(default_vegetables),
        }
    }

    /// Inserts an empty record for every default vegetable missing on `date`.
    /// Returns how many were created; calling it again creates none.
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self, date: NaiveDate) -> Result<usize, ServiceError> {
        let db = &*self.db_pool;

        let existing: HashSet<String> = VegetableSale::find()
            .filter(vegetable_sale::Column::Date.eq(date))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|m| m.vegetable)
            .collect();

        let mut created = 0;
        for name in self.default_vegetables.iter() {
            if existing.contains(name) {
                continue;
            }
            if insert_empty(db, name, date).await? {
                created += 1;
            }
        }

        if created > 0 {
            info!(date = %date, created, "Seeded default vegetables");
        }
        Ok(created)
    }

    /// All records for `date` in creation order.
    #[instrument(skip(self))]
    pub async fn list(&self, date: NaiveDate) -> Result<Vec<vegetable_sale::Model>, ServiceError> {
        VegetableSale::find()
            .filter(vegetable_sale::Column::Date.eq(date))
            .order_by_asc(vegetable_sale::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Get-or-create for `(name, date)`. The flag is true when a record was created.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> Result<(vegetable_sale::Model, bool), ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Vegetable name is required.".to_string(),
            ));
        }

        let db = &*self.db_pool;
        if let Some(existing) = find_one(db, name, date).await? {
            return Ok((existing, false));
        }

        let created = insert_empty(db, name, date).await?;
        let record = find_one(db, name, date).await?.ok_or_else(|| {
            ServiceError::InternalError(format!("record for {} on {} vanished", name, date))
        })?;

        if created {
            info!(vegetable = %name, date = %date, id = record.id, "Vegetable added");
        }
        Ok((record, created))
    }

    /// Removes every record for `(name, date)`; returns the number removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str, date: NaiveDate) -> Result<u64, ServiceError> {
        let result = VegetableSale::delete_many()
            .filter(vegetable_sale::Column::Vegetable.eq(name))
            .filter(vegetable_sale::Column::Date.eq(date))
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(vegetable = %name, date = %date, deleted = result.rows_affected, "Vegetable delete");
        Ok(result.rows_affected)
    }

    /// Applies all updates in one transaction. Ids that do not belong to
    /// `date` are skipped, not reported as errors.
    #[instrument(skip(self, updates), fields(count = updates.len()))]
    pub async fn save(
        &self,
        date: NaiveDate,
        updates: Vec<SaleUpdate>,
    ) -> Result<SaveOutcome, ServiceError> {
        let db = &*self.db_pool;

        let outcome = db
            .transaction::<_, SaveOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let mut outcome = SaveOutcome::default();

                    for update in updates {
                        let record = VegetableSale::find_by_id(update.id)
                            .filter(vegetable_sale::Column::Date.eq(date))
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?;

                        let Some(record) = record else {
                            debug!(id = update.id, date = %date, "Skipping unknown record");
                            outcome.skipped += 1;
                            continue;
                        };

                        let mut active: vegetable_sale::ActiveModel = record.into();
                        active.quantity = Set(Some(update.quantity));
                        active.purchase_price = Set(Some(update.purchase_price));
                        active.selling_price = Set(Some(update.selling_price));
                        active.update(txn).await.map_err(ServiceError::db_error)?;
                        outcome.updated += 1;
                    }

                    Ok(outcome)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            date = %date,
            updated = outcome.updated,
            skipped = outcome.skipped,
            "Vegetable data saved"
        );
        Ok(outcome)
    }
}

async fn find_one(
    db: &DbPool,
    name: &str,
    date: NaiveDate,
) -> Result<Option<vegetable_sale::Model>, ServiceError> {
    VegetableSale::find()
        .filter(vegetable_sale::Column::Vegetable.eq(name))
        .filter(vegetable_sale::Column::Date.eq(date))
        .one(db)
        .await
        .map_err(ServiceError::db_error)
}

/// Inserts a record with no figures. A concurrent insert of the same
/// `(name, date)` hits the unique index and is reported as `false`.
async fn insert_empty(db: &DbPool, name: &str, date: NaiveDate) -> Result<bool, ServiceError> {
    let record = vegetable_sale::ActiveModel {
        date: Set(date),
        vegetable: Set(name.to_string()),
        quantity: Set(None),
        purchase_price: Set(None),
        selling_price: Set(None),
        ..Default::default()
    };

    let result = VegetableSale::insert(record)
        .on_conflict(
            OnConflict::columns([vegetable_sale::Column::Vegetable, vegetable_sale::Column::Date])
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await;

    match result {
        Ok(_) => Ok(true),
        Err(DbErr::RecordNotInserted) => Ok(false),
        Err(e) => Err(ServiceError::db_error(e)),
    }
}
