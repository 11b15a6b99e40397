use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::common::require_param;
use crate::{
    errors::ServiceError, pages, reports::YearMonth, services::analytics::MonthlyReport, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct MonthQuery {
    /// `YYYY-MM`
    pub month: Option<String>,
}

pub async fn monthly_analysis_page() -> Html<String> {
    Html(pages::monthly_analysis())
}

#[utoipa::path(
    get,
    path = "/ajax/monthly-analysis-data",
    params(MonthQuery),
    responses(
        (status = 200, description = "Per-vegetable and total figures for the month", body = MonthlyReport),
        (status = 400, description = "Month missing or malformed", body = crate::errors::ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn monthly_analysis_data(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyReport>, ServiceError> {
    let raw = require_param(&query.month, "Month not provided")?;
    let month: YearMonth = raw
        .parse()
        .map_err(|e: crate::reports::ParseYearMonthError| ServiceError::BadRequest(e.to_string()))?;

    let report = state.services.analytics.monthly(month).await?;
    Ok(Json(report))
}
