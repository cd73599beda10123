//! `{ success, message?, <entity>? }` on success and
//! `{ success: false, message, error, fields? }` on failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::error;

use crate::marketplace::error::MarketError;

pub(crate) fn success<T: Serialize>(
    status: StatusCode,
    entity: &'static str,
    value: &T,
    message: Option<&str>,
) -> Response {
    let value = match serde_json::to_value(value) {
        Ok(value) => value,
        Err(err) => {
            error!(error = %err, entity, "failed to serialize response entity");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "response could not be encoded",
                None,
            );
        }
    };

    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    if let Some(message) = message {
        body.insert("message".to_string(), Value::String(message.to_string()));
    }
    body.insert(entity.to_string(), value);
    (status, Json(Value::Object(body))).into_response()
}

pub(crate) fn failure(
    status: StatusCode,
    code: &str,
    message: &str,
    fields: Option<Value>,
) -> Response {
    let mut body = json!({
        "success": false,
        "message": message,
        "error": code,
    });
    if let (Some(fields), Some(object)) = (fields, body.as_object_mut()) {
        object.insert("fields".to_string(), fields);
    }
    (status, Json(body)).into_response()
}

impl MarketError {
    pub fn status(&self) -> StatusCode {
        match self {
            MarketError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MarketError::Authorization { .. } | MarketError::Forbidden { .. } => {
                StatusCode::FORBIDDEN
            }
            MarketError::NotFound { .. } => StatusCode::NOT_FOUND,
            MarketError::Conflict(_)
            | MarketError::CampaignFull { .. }
            | MarketError::InvalidTransition { .. } => StatusCode::CONFLICT,
            MarketError::ProfileRequired { .. } => StatusCode::BAD_REQUEST,
            MarketError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let MarketError::Store(source) = &self {
            error!(error = %source, "marketplace store failure");
            return failure(
                status,
                self.code(),
                "the marketplace store is unavailable, try again later",
                None,
            );
        }

        let fields = match &self {
            MarketError::Validation(errors) => serde_json::to_value(errors.errors()).ok(),
            _ => None,
        };
        failure(status, self.code(), &self.to_string(), fields)
    }
}
