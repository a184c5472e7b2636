use crate::config::ConfigError;
use crate::projects::{ParcelImportError, ProjectServiceError, RepositoryError};
use crate::telemetry::TelemetryError;
use crate::valuation::{ConditionParseError, ValuationError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Valuation(ValuationError),
    Condition(ConditionParseError),
    Project(ProjectServiceError),
    Serialization(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Valuation(err) => write!(f, "invalid valuation input: {}", err),
            AppError::Condition(err) => write!(f, "invalid site condition: {}", err),
            AppError::Project(err) => write!(f, "project error: {}", err),
            AppError::Serialization(err) => write!(f, "serialization error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Valuation(err) => Some(err),
            AppError::Condition(err) => Some(err),
            AppError::Project(err) => Some(err),
            AppError::Serialization(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Valuation(_) | AppError::Condition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Project(ProjectServiceError::Repository(RepositoryError::NotFound))
            | AppError::Project(ProjectServiceError::ActionNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Project(ProjectServiceError::Repository(RepositoryError::Conflict)) => {
                StatusCode::CONFLICT
            }
            AppError::Project(ProjectServiceError::InvalidParcel(_))
            | AppError::Project(ProjectServiceError::Import(_))
            | AppError::Project(ProjectServiceError::InvalidDocument(_))
            | AppError::Project(ProjectServiceError::Comps(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Project(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ValuationError> for AppError {
    fn from(value: ValuationError) -> Self {
        Self::Valuation(value)
    }
}

impl From<ConditionParseError> for AppError {
    fn from(value: ConditionParseError) -> Self {
        Self::Condition(value)
    }
}

impl From<ProjectServiceError> for AppError {
    fn from(value: ProjectServiceError) -> Self {
        Self::Project(value)
    }
}

impl From<ParcelImportError> for AppError {
    fn from(value: ParcelImportError) -> Self {
        Self::Project(ProjectServiceError::Import(value))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn client_errors_map_to_client_statuses() {
        let invalid = AppError::from(ValuationError::NegativeAcres(Decimal::from(-1)));
        assert_eq!(
            invalid.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let missing = AppError::from(ProjectServiceError::Repository(RepositoryError::NotFound));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_errors_map_to_internal_error() {
        let io = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(
            io.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
