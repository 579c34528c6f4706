use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{line::LineError, station::StationError};
use services::services::{
    line_sections::{LineCascadeOutcome, LineServiceError},
    stations::StationServiceError,
    topology::SectionError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error, ts_rs::TS)]
#[ts(type = "string")]
pub enum ApiError {
    #[error(transparent)]
    Station(#[from] StationError),
    #[error(transparent)]
    Line(#[from] LineError),
    #[error(transparent)]
    Section(#[from] SectionError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    /// A station delete that left the station on some lines.
    #[error("{message}")]
    CascadeIncomplete {
        message: String,
        outcomes: Vec<LineCascadeOutcome>,
    },
}

impl From<LineServiceError> for ApiError {
    fn from(err: LineServiceError) -> Self {
        match err {
            LineServiceError::Database(e) => ApiError::Database(e),
            LineServiceError::Section(e) => ApiError::Section(e),
            LineServiceError::Line(e) => ApiError::Line(e),
            LineServiceError::LineNotFound(id) => ApiError::NotFound(format!("Line {id} not found")),
            LineServiceError::MissingField(field) => {
                ApiError::BadRequest(format!("{field} is required"))
            }
        }
    }
}

impl From<StationServiceError> for ApiError {
    fn from(err: StationServiceError) -> Self {
        match err {
            StationServiceError::Station(e) => ApiError::Station(e),
            StationServiceError::Line(e) => ApiError::from(e),
            StationServiceError::CascadeIncomplete {
                station_id,
                failed_lines,
                outcomes,
            } => ApiError::CascadeIncomplete {
                message: format!("Station {station_id} is still on lines {failed_lines:?}"),
                outcomes,
            },
        }
    }
}

impl ApiError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Station(e) => match e {
                StationError::NotFound => (StatusCode::NOT_FOUND, "StationNotFound"),
                StationError::StillReferenced(_) => (StatusCode::CONFLICT, "StationInUse"),
                StationError::DuplicateName(_) | StationError::BlankName => {
                    (StatusCode::BAD_REQUEST, "StationError")
                }
                StationError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Line(e) => match e {
                LineError::NotFound => (StatusCode::NOT_FOUND, "LineNotFound"),
                LineError::DuplicateName(_) | LineError::BlankName => {
                    (StatusCode::BAD_REQUEST, "LineError")
                }
                LineError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Section(e) if e.is_rejection() => (StatusCode::BAD_REQUEST, "SectionRejected"),
            ApiError::Section(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InconsistentLine"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::CascadeIncomplete { .. } => (StatusCode::CONFLICT, "CascadeIncomplete"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = self.status();

        if let ApiError::CascadeIncomplete { message, outcomes } = self {
            tracing::warn!("{}: {}", error_type, message);
            let response = ApiResponse::error_with_data(outcomes, &message);
            return (status_code, Json(response)).into_response();
        }

        let error_message = match &self {
            ApiError::Station(e) => e.to_string(),
            ApiError::Line(e) => e.to_string(),
            ApiError::Section(e) => e.to_string(),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
            _ => format!("{}: {}", error_type, self),
        };

        if status_code.is_server_error() {
            tracing::error!("{}: {}", error_type, self);
        } else {
            tracing::debug!("{}: {}", error_type, error_message);
        }

        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
