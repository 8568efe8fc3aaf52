use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::common::error::{RegistryError, ValidationError};

/// Error envelope for every REST handler: `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError(pub RegistryError);

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        Self(e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self(RegistryError::Validation(e))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::single("body", rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.0.to_string();
        match self.0 {
            RegistryError::Validation(v) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "detail": detail, "fields": v.fields })),
            )
                .into_response(),
            RegistryError::Configuration(_) => {
                log::error!("{}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "detail": detail })),
                )
                    .into_response()
            }
            RegistryError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "detail": detail })),
            )
                .into_response(),
        }
    }
}
