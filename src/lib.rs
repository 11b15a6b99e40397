//! Vegetable Vendor API Library
//!
//! Daily purchase and selling ledger for a vegetable stall: per-date records,
//! daily totals, report snapshots, monthly analysis and PNG charts served
//! over HTTP.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod charts;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod pages;
pub mod reports;
pub mod services;
pub mod tracing;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use handlers::{charts as chart_handlers, monthly, reports as report_handlers, vegetables};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone(), &config);
        Self {
            db,
            config,
            services,
        }
    }
}

/// Page and form routes, plus the JSON chart and analysis endpoints.
pub fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(vegetables::vegetable_list))
        .route("/set_date", post(vegetables::set_date))
        .route("/add", post(vegetables::add_vegetable))
        .route("/delete", post(vegetables::delete_vegetable))
        .route(
            "/calculate",
            get(vegetables::calculate_totals).post(vegetables::calculate_totals),
        )
        .route("/save", post(vegetables::save_data))
        .route(
            "/report",
            get(report_handlers::report_page).post(report_handlers::report_page_submit),
        )
        .route("/ajax/price-chart", get(chart_handlers::price_chart))
        .route(
            "/ajax/grouped-bar-chart",
            get(chart_handlers::grouped_bar_chart),
        )
        .route(
            "/ajax/stacked-profit-loss-chart",
            get(chart_handlers::stacked_profit_loss_chart),
        )
        .route("/monthly-analysis", get(monthly::monthly_analysis_page))
        .route(
            "/ajax/monthly-analysis-data",
            get(monthly::monthly_analysis_data),
        )
}

/// Full application router with request ids and HTTP tracing applied.
/// CORS and compression are left to the binary, which owns that configuration.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(ledger_routes())
        .nest("/health", health::health_routes())
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
