mod common;

use axum::http::StatusCode;
use base64::{engine::general_purpose, Engine as _};

use common::{body_json, body_text, TestApp};

#[tokio::test]
async fn month_parameter_is_required() {
    let app = TestApp::new().await;

    let response = app.get("/ajax/monthly-analysis-data").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Month not provided");
}

#[tokio::test]
async fn malformed_month_is_rejected() {
    let app = TestApp::new().await;

    for month in ["2024", "2024-13", "May-2024", "2024-05-01"] {
        let response = app
            .get(&format!("/ajax/monthly-analysis-data?month={}", month))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", month);
        assert_eq!(body_json(response).await["error"], "Invalid month format");
    }
}

#[tokio::test]
async fn empty_month_yields_zero_summary_and_chart() {
    let app = TestApp::new().await;

    let response = app.get("/ajax/monthly-analysis-data?month=2024-02").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["vegetables"].as_array().unwrap().len(), 0);
    for field in ["total_investment", "total_revenue", "total_profit", "total_loss"] {
        assert_eq!(json["summary"][field], 0.0, "{}", field);
    }

    let uri = json["quantity_chart"].as_str().unwrap();
    let encoded = uri.strip_prefix("data:image/png;base64,").unwrap();
    let png = general_purpose::STANDARD.decode(encoded).unwrap();
    assert!(image::load_from_memory(&png).is_ok());
}

#[tokio::test]
async fn monthly_routes_whole_margin_and_skips_incomplete_records() {
    let app = TestApp::new().await;
    app.seed_sale("2024-05-01", "Onion", Some(10.0), Some(5.0), Some(8.0))
        .await;
    app.seed_sale("2024-05-20", "Onion", Some(10.0), Some(8.0), Some(6.0))
        .await;
    app.seed_sale("2024-05-31", "Tomato", Some(4.0), None, Some(10.0))
        .await;
    // outside the month on either side
    app.seed_sale("2024-04-30", "Onion", Some(100.0), Some(1.0), Some(2.0))
        .await;
    app.seed_sale("2024-06-01", "Potato", Some(100.0), Some(1.0), Some(2.0))
        .await;

    let json = body_json(app.get("/ajax/monthly-analysis-data?month=2024-05").await).await;

    let vegetables = json["vegetables"].as_array().unwrap();
    let names: Vec<_> = vegetables
        .iter()
        .map(|v| v["vegetable"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Onion", "Tomato"]);

    assert_eq!(vegetables[0]["quantity"], 20.0);
    assert_eq!(vegetables[0]["profit"], 30.0);
    assert_eq!(vegetables[0]["loss"], 20.0);
    assert_eq!(vegetables[1]["quantity"], 0.0);
    assert_eq!(vegetables[1]["profit"], 0.0);

    let summary = &json["summary"];
    assert_eq!(summary["total_investment"], 130.0);
    assert_eq!(summary["total_revenue"], 140.0);
    assert_eq!(summary["total_profit"], 30.0);
    assert_eq!(summary["total_loss"], 20.0);
}

#[tokio::test]
async fn unrenderable_chart_keeps_monthly_figures() {
    let app = TestApp::new().await;
    // the quantity sum overflows, so only the chart is affected
    app.seed_sale("2024-05-01", "Onion", Some(f64::MAX), Some(0.0), Some(0.0))
        .await;
    app.seed_sale("2024-05-02", "Onion", Some(f64::MAX), Some(0.0), Some(0.0))
        .await;

    let response = app.get("/ajax/monthly-analysis-data?month=2024-05").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert!(json["quantity_chart"].is_null());
    assert_eq!(json["vegetables"][0]["vegetable"], "Onion");
    assert_eq!(json["summary"]["total_investment"], 0.0);
    assert_eq!(json["summary"]["total_revenue"], 0.0);
}

#[tokio::test]
async fn monthly_page_is_served() {
    let app = TestApp::new().await;

    let response = app.get("/monthly-analysis").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("/ajax/monthly-analysis-data"));
}
