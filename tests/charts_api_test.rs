mod common;

use axum::http::StatusCode;
use base64::{engine::general_purpose, Engine as _};
use rstest::rstest;

use common::{body_json, TestApp};

#[rstest]
#[case("/ajax/price-chart")]
#[case("/ajax/grouped-bar-chart")]
#[case("/ajax/stacked-profit-loss-chart")]
#[tokio::test]
async fn chart_requires_a_date(#[case] path: &str) {
    let app = TestApp::new().await;

    let response = app.get(path).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Date not provided");
}

#[rstest]
#[case("/ajax/price-chart")]
#[case("/ajax/grouped-bar-chart")]
#[case("/ajax/stacked-profit-loss-chart")]
#[tokio::test]
async fn chart_rejects_malformed_date(#[case] path: &str) {
    let app = TestApp::new().await;

    let response = app.get(&format!("{}?date=2024-13-40", path)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid date format");
}

#[rstest]
#[case("/ajax/price-chart")]
#[case("/ajax/grouped-bar-chart")]
#[case("/ajax/stacked-profit-loss-chart")]
#[tokio::test]
async fn chart_for_empty_date_is_not_found(#[case] path: &str) {
    let app = TestApp::new().await;
    app.seed_sale("2024-05-02", "Onion", Some(1.0), Some(1.0), Some(1.0))
        .await;

    let response = app.get(&format!("{}?date=2024-05-01", path)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No data found for selected date");
}

#[rstest]
#[case("/ajax/price-chart")]
#[case("/ajax/grouped-bar-chart")]
#[case("/ajax/stacked-profit-loss-chart")]
#[tokio::test]
async fn chart_is_base64_png(#[case] path: &str) {
    let app = TestApp::new().await;
    app.seed_sale("2024-05-01", "Onion", Some(10.0), Some(5.0), Some(8.0))
        .await;
    app.seed_sale("2024-05-01", "Tomato", Some(10.0), Some(8.0), None)
        .await;
    app.seed_sale("2024-05-01", "Carrot", None, None, None).await;

    let response = app.get(&format!("{}?date=2024-05-01", path)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let encoded = json["chart"].as_str().expect("chart string");
    assert!(!encoded.starts_with("data:"));

    let png = general_purpose::STANDARD.decode(encoded).unwrap();
    let image = image::load_from_memory(&png).unwrap();
    assert_eq!(image.width(), 320);
    assert_eq!(image.height(), 240);
}
