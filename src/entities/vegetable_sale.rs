use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One vegetable's purchase and selling figures for one day.
///
/// The numeric fields stay `NULL` until the vendor fills them in; at most
/// one row exists per `(vegetable, date)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vegetable_sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: NaiveDate,
    pub vegetable: String,
    pub quantity: Option<f64>,
    pub purchase_price: Option<f64>,
    pub selling_price: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
