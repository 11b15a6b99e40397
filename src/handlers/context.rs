//! Request-scoped "selected date".
//!
//! The date a user is working on travels in a `selected_date` cookie. Handlers
//! that operate on "the current day" take [`SelectedDate`] as an extractor
//! instead of reading shared state.

use crate::errors::ServiceError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use chrono::{NaiveDate, Utc};

pub const SELECTED_DATE_COOKIE: &str = "selected_date";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedDate(pub NaiveDate);

impl SelectedDate {
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `Set-Cookie` value that makes `date` the selection for later requests.
    pub fn cookie(date: NaiveDate) -> HeaderValue {
        // ISO dates are plain ASCII, so this never hits the fallback.
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; SameSite=Lax",
            SELECTED_DATE_COOKIE, date
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("selected_date=; Path=/"))
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for SelectedDate
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match cookie_value(&parts.headers, SELECTED_DATE_COOKIE) {
            None => Ok(Self::today()),
            Some(raw) if raw.is_empty() => Ok(Self::today()),
            Some(raw) => parse_date(&raw)
                .map(Self)
                .ok_or_else(|| ServiceError::BadRequest("Invalid selected date.".to_string())),
        }
    }
}
