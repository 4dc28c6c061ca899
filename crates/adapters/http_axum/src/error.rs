//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use airhub_domain::error::{AirHubError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`AirHubError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(AirHubError);

impl From<AirHubError> for ApiError {
    fn from(err: AirHubError) -> Self {
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
            AirHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AirHubError::InvalidArgument(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AirHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            AirHubError::UnsupportedModel(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            AirHubError::Device(err) => {
                tracing::warn!(error = %err, "device error");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airhub_domain::error::{
        DeviceFault, InvalidArgumentError, NotFoundError, UnsupportedModelError,
    };

    fn status_of(err: impl Into<AirHubError>) -> StatusCode {
        let err: AirHubError = err.into();
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn should_map_each_error_kind_to_its_status() {
        assert_eq!(status_of(ValidationError::EmptyName), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(InvalidArgumentError::Missing("level")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(NotFoundError {
                entity: "Fan",
                id: "fan.hall".to_string(),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(UnsupportedModelError {
                model: "acme.heater.v1".to_string(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(DeviceFault::new("timeout")),
            StatusCode::BAD_GATEWAY
        );
    }
}
