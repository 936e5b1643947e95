//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use airmon_domain::error::AirmonError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors surfaced by the API.
pub enum ApiError {
    Domain(AirmonError),
    /// The request itself is malformed (bad id, unreadable body).
    BadRequest(String),
}

impl From<AirmonError> for ApiError {
    fn from(err: AirmonError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Domain(AirmonError::Validation(err)) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Domain(AirmonError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(AirmonError::Device(err)) => {
                tracing::warn!(error = %err, "device request failed");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use airmon_domain::error::{DeviceError, NotFoundError, ValidationError};

    use super::*;

    #[test]
    fn should_map_error_kinds_to_status_codes() {
        let cases = [
            (ApiError::from(AirmonError::from(ValidationError::MissingValue)), StatusCode::BAD_REQUEST),
            (
                ApiError::from(AirmonError::from(NotFoundError {
                    entity: "Entity",
                    id: "x".to_string(),
                })),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(AirmonError::from(DeviceError::UnknownProperty("x".to_string()))),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::BadRequest("bad".to_string()), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
