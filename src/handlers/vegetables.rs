use std::collections::HashMap;

use axum::{
    extract::{Form, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    common::{validate_input, MessageResponse},
    context::{parse_date, SelectedDate},
};
use crate::{
    errors::ServiceError,
    pages,
    reports::DailyTotals,
    services::vegetables::{SaleUpdate, VegetableView},
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetDateForm {
    /// `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VegetableNameForm {
    #[validate(length(max = 100))]
    pub vegetable_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddVegetableResponse {
    pub success: bool,
    pub message: String,
    pub vegetable: VegetableView,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TotalsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub totals: DailyTotals,
}

/// Daily list view; fills in the default vegetables the first time a date is shown.
pub async fn vegetable_list(
    State(state): State<AppState>,
    selected: SelectedDate,
) -> Result<Html<String>, ServiceError> {
    let date = selected.date();
    state.services.vegetables.seed_defaults(date).await?;
    let records = state.services.vegetables.list(date).await?;

    Ok(Html(pages::vegetable_list(date, &records)))
}

#[utoipa::path(
    post,
    path = "/set_date",
    request_body(content = SetDateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Selected date stored in a cookie", body = MessageResponse),
        (status = 400, description = "Missing or malformed date", body = crate::errors::ErrorResponse)
    ),
    tag = "vegetables"
)]
pub async fn set_date(Form(form): Form<SetDateForm>) -> Result<impl IntoResponse, ServiceError> {
    let date = form
        .date
        .as_deref()
        .and_then(parse_date)
        .ok_or_else(|| ServiceError::BadRequest("Invalid date selection.".to_string()))?;

    info!(date = %date, "Selected date changed");

    Ok((
        AppendHeaders([(SET_COOKIE, SelectedDate::cookie(date))]),
        Json(MessageResponse::ok(format!("Date set to {}", date))),
    ))
}

#[utoipa::path(
    post,
    path = "/add",
    request_body(content = VegetableNameForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Vegetable present for the selected date", body = AddVegetableResponse),
        (status = 400, description = "Blank or over-long name", body = crate::errors::ErrorResponse)
    ),
    tag = "vegetables"
)]
pub async fn add_vegetable(
    State(state): State<AppState>,
    selected: SelectedDate,
    Form(form): Form<VegetableNameForm>,
) -> Result<Json<AddVegetableResponse>, ServiceError> {
    validate_input(&form)?;
    let name = form.vegetable_name.unwrap_or_default();

    let (record, created) = state
        .services
        .vegetables
        .add(&name, selected.date())
        .await?;

    let message = if created {
        "Vegetable added successfully."
    } else {
        "Vegetable already exists."
    };

    Ok(Json(AddVegetableResponse {
        success: true,
        message: message.to_string(),
        vegetable: VegetableView::from(&record),
    }))
}

#[utoipa::path(
    post,
    path = "/delete",
    request_body(content = VegetableNameForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Outcome of the delete; `success` is false when nothing matched", body = MessageResponse)
    ),
    tag = "vegetables"
)]
pub async fn delete_vegetable(
    State(state): State<AppState>,
    selected: SelectedDate,
    Form(form): Form<VegetableNameForm>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let name = form.vegetable_name.unwrap_or_default();
    let deleted = state
        .services
        .vegetables
        .delete(name.trim(), selected.date())
        .await?;

    if deleted > 0 {
        Ok(Json(MessageResponse::ok(format!(
            "Deleted {} record(s).",
            deleted
        ))))
    } else {
        Ok(Json(MessageResponse::failed(
            "Vegetable not found for the selected date.",
        )))
    }
}

#[utoipa::path(
    post,
    path = "/calculate",
    responses(
        (status = 200, description = "Totals for the selected date", body = TotalsResponse)
    ),
    tag = "vegetables"
)]
pub async fn calculate_totals(
    State(state): State<AppState>,
    selected: SelectedDate,
) -> Result<Json<TotalsResponse>, ServiceError> {
    let totals = state
        .services
        .daily_summaries
        .calculate(selected.date())
        .await?;

    Ok(Json(TotalsResponse {
        success: true,
        totals,
    }))
}

#[utoipa::path(
    post,
    path = "/save",
    request_body(
        content = HashMap<String, String>,
        content_type = "application/x-www-form-urlencoded",
        description = "`quantity_<id>`, `purchase_price_<id>`, `selling_price_<id>` fields"
    ),
    responses(
        (status = 200, description = "Updates applied", body = MessageResponse),
        (status = 400, description = "Unparsable or negative value", body = crate::errors::ErrorResponse)
    ),
    tag = "vegetables"
)]
pub async fn save_data(
    State(state): State<AppState>,
    selected: SelectedDate,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let updates = SaleUpdate::from_form(&form)?;
    state
        .services
        .vegetables
        .save(selected.date(), updates)
        .await?;

    Ok(Json(MessageResponse::ok("Data saved successfully!")))
}
