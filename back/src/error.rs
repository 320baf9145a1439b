use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use todo_api::v1::ValidationProblem;
use tracing::error;

/// Every way a request against the todo endpoints can fail.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Validation(ValidationProblem),
    Store(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "todo not found"),
            ApiError::Validation(problem) => {
                let fields: Vec<_> = problem.errors.keys().map(String::as_str).collect();
                write!(f, "invalid fields: {}", fields.join(", "))
            }
            ApiError::Store(err) => write!(f, "store error: {err}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Store(err)
    }
}

impl From<garde::Report> for ApiError {
    fn from(report: garde::Report) -> Self {
        ApiError::Validation(ValidationProblem::from_report(&report))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Validation(problem) => (StatusCode::BAD_REQUEST, Json(problem)).into_response(),
            ApiError::Store(err) => {
                error!("store operation failed: {:?}", err);

                let body = json!({
                    "title": "An error occurred while processing your request.",
                    "status": 500,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
