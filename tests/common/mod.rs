#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use sea_orm::ActiveModelTrait;
use sea_orm::Set;
use serde_json::Value;
use tower::ServiceExt;
use vegetable_vendor_api::{
    app_router, config::AppConfig, db, entities::vegetable_sale, AppState,
};

/// Helper harness for spinning up the application backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    selected_date: Option<String>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_000,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.chart_width = 320;
        cfg.chart_height = 240;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = app_router(state.clone());

        Self {
            router,
            state,
            selected_date: None,
        }
    }

    /// Sends the `selected_date` cookie on every following request.
    pub fn select_date(&mut self, date: &str) {
        self.selected_date = Some(date.to_string());
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        form: Option<&[(&str, &str)]>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(date) = &self.selected_date {
            builder = builder.header(header::COOKIE, format!("selected_date={}", date));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = match form {
            Some(fields) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(
                    serde_urlencoded::to_string(fields).expect("form fields encode"),
                )
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, &[]).await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response {
        self.request(Method::POST, uri, Some(fields), &[]).await
    }

    /// Inserts a record directly, bypassing the HTTP layer.
    pub async fn seed_sale(
        &self,
        date: &str,
        vegetable: &str,
        quantity: Option<f64>,
        purchase_price: Option<f64>,
        selling_price: Option<f64>,
    ) -> vegetable_sale::Model {
        vegetable_sale::ActiveModel {
            date: Set(date_of(date)),
            vegetable: Set(vegetable.to_string()),
            quantity: Set(quantity),
            purchase_price: Set(purchase_price),
            selling_price: Set(selling_price),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed vegetable sale")
    }
}

pub fn date_of(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).expect("utf-8 body")
}
