use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use super::{
    common::{require_param, ChartResponse},
    context::parse_date,
};
use crate::{errors::ServiceError, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ChartQuery {
    /// `YYYY-MM-DD`
    pub date: Option<String>,
}

fn chart_date(query: &ChartQuery) -> Result<NaiveDate, ServiceError> {
    let raw = require_param(&query.date, "Date not provided")?;
    parse_date(raw).ok_or_else(|| ServiceError::BadRequest("Invalid date format".to_string()))
}

#[utoipa::path(
    get,
    path = "/ajax/price-chart",
    params(ChartQuery),
    responses(
        (status = 200, description = "Purchase and selling price lines", body = ChartResponse),
        (status = 400, description = "Date missing or malformed", body = crate::errors::ErrorResponse),
        (status = 404, description = "No records on that date", body = crate::errors::ErrorResponse)
    ),
    tag = "charts"
)]
pub async fn price_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, ServiceError> {
    let date = chart_date(&query)?;
    let chart = state.services.charts.price_chart(date).await?;
    Ok(Json(ChartResponse { chart }))
}

#[utoipa::path(
    get,
    path = "/ajax/grouped-bar-chart",
    params(ChartQuery),
    responses(
        (status = 200, description = "Purchase vs selling totals", body = ChartResponse),
        (status = 400, description = "Date missing or malformed", body = crate::errors::ErrorResponse),
        (status = 404, description = "No records on that date", body = crate::errors::ErrorResponse)
    ),
    tag = "charts"
)]
pub async fn grouped_bar_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, ServiceError> {
    let date = chart_date(&query)?;
    let chart = state.services.charts.grouped_bar_chart(date).await?;
    Ok(Json(ChartResponse { chart }))
}

#[utoipa::path(
    get,
    path = "/ajax/stacked-profit-loss-chart",
    params(ChartQuery),
    responses(
        (status = 200, description = "Profit with loss stacked on top", body = ChartResponse),
        (status = 400, description = "Date missing or malformed", body = crate::errors::ErrorResponse),
        (status = 404, description = "No records on that date", body = crate::errors::ErrorResponse)
    ),
    tag = "charts"
)]
pub async fn stacked_profit_loss_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, ServiceError> {
    let date = chart_date(&query)?;
    let chart = state.services.charts.stacked_profit_loss_chart(date).await?;
    Ok(Json(ChartResponse { chart }))
}
