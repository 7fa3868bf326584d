//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use glowminder_domain::error::{GlowError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`GlowError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(GlowError);

impl From<GlowError> for ApiError {
    fn from(err: GlowError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            GlowError::InvalidInput(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            GlowError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            GlowError::Conflict(err) => (StatusCode::CONFLICT, err.to_string()),
            GlowError::DeliveryFailed(err) => {
                tracing::warn!(error = %err, "device delivery failed");
                (StatusCode::BAD_GATEWAY, self.0.to_string())
            }
            GlowError::StoreUnavailable(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glowminder_domain::error::{ConflictError, DeliveryError, NotFoundError};

    fn status_of(err: GlowError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn should_map_each_error_class_to_its_status() {
        assert_eq!(
            status_of(ValidationError::EmptyMessage.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                NotFoundError {
                    entity: "Reminder",
                    id: "x".to_string()
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                ConflictError {
                    entity: "Reminder",
                    id: "x".to_string()
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DeliveryError::Offline.into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(GlowError::store_unavailable(std::io::Error::other("down"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
