use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// `{success, message}` body used by the form endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// `{chart}` body of the per-date chart endpoints; the value is base64 PNG.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChartResponse {
    pub chart: String,
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::InvalidInput(format!("Validation failed: {}", e)))
}

/// Rejects a missing or blank required parameter with `message`.
pub fn require_param<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, ServiceError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::BadRequest(message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_param_rejects_blank() {
        assert!(require_param(&None, "Date not provided").is_err());
        assert!(require_param(&Some("  ".into()), "Date not provided").is_err());
        assert_eq!(
            require_param(&Some(" 2024-05-01 ".into()), "Date not provided").unwrap(),
            "2024-05-01"
        );
    }

    #[test]
    fn message_response_shapes() {
        let body = serde_json::to_value(MessageResponse::failed("nope")).unwrap();
        assert_eq!(body, serde_json::json!({"success": false, "message": "nope"}));
    }
}
