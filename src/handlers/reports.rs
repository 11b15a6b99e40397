use axum::{
    extract::{Form, Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use super::context::parse_date;
use crate::{errors::ServiceError, pages, AppState};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReportForm {
    pub selected_date: Option<String>,
    /// Present (any value) to request the quantity chart.
    pub show_chart: Option<String>,
}

async fn render_report(
    state: &AppState,
    raw_date: Option<&str>,
    show_chart: bool,
) -> Result<Html<String>, ServiceError> {
    let raw_date = raw_date.map(str::trim).filter(|d| !d.is_empty());
    let Some(raw_date) = raw_date else {
        return Ok(Html(pages::report(None)));
    };

    let date = parse_date(raw_date)
        .ok_or_else(|| ServiceError::BadRequest("Invalid date format".to_string()))?;

    let report = state.services.reports.build(date, show_chart).await?;
    info!(date = %date, show_chart, rows = report.lines.len(), "Report page rendered");

    Ok(Html(pages::report(Some(&report))))
}

/// Report for `?date=`; an absent date renders the empty page.
pub async fn report_page(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Html<String>, ServiceError> {
    render_report(&state, query.date.as_deref(), false).await
}

/// Report form submission; `?date=` wins over the form's `selected_date`.
pub async fn report_page_submit(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
    Form(form): Form<ReportForm>,
) -> Result<Html<String>, ServiceError> {
    let raw_date = query.date.as_deref().or(form.selected_date.as_deref());
    render_report(&state, raw_date, form.show_chart.is_some()).await
}
