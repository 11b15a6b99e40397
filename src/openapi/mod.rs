use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vegetable Vendor API",
        version = "0.1.0",
        description = r#"
# Vegetable Vendor Ledger

Daily purchase and selling records per vegetable, with daily totals,
per-date reports, monthly analysis and server-rendered charts.

## Selected date

Endpoints that work on "the current day" read the `selected_date` cookie
(`YYYY-MM-DD`) set by `POST /set_date`. Without it they use today's UTC date.

## Error Handling

Failures share one body:

```json
{
  "success": false,
  "error": "Date not provided",
  "message": "Date not provided",
  "timestamp": "2024-05-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    tags(
        (name = "vegetables", description = "Daily records for the selected date"),
        (name = "charts", description = "Per-date chart images"),
        (name = "analytics", description = "Monthly aggregation"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::vegetables::set_date,
        crate::handlers::vegetables::add_vegetable,
        crate::handlers::vegetables::delete_vegetable,
        crate::handlers::vegetables::calculate_totals,
        crate::handlers::vegetables::save_data,
        crate::handlers::charts::price_chart,
        crate::handlers::charts::grouped_bar_chart,
        crate::handlers::charts::stacked_profit_loss_chart,
        crate::handlers::monthly::monthly_analysis_data,
        crate::health::health_check,
        crate::health::readiness_check,
    ),
    components(
        schemas(
            crate::handlers::common::MessageResponse,
            crate::handlers::common::ChartResponse,
            crate::handlers::vegetables::SetDateForm,
            crate::handlers::vegetables::VegetableNameForm,
            crate::handlers::vegetables::AddVegetableResponse,
            crate::handlers::vegetables::TotalsResponse,
            crate::services::vegetables::VegetableView,
            crate::services::analytics::MonthlyReport,
            crate::reports::DailyTotals,
            crate::reports::VegetableMonthly,
            crate::reports::MonthlySummary,
            crate::health::HealthResponse,
            crate::health::ReadinessResponse,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_json_endpoints() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("Vegetable Vendor API"));
        for path in [
            "/set_date",
            "/calculate",
            "/ajax/price-chart",
            "/ajax/monthly-analysis-data",
            "/health/ready",
        ] {
            assert!(json.contains(path), "missing {}", path);
        }
    }
}
