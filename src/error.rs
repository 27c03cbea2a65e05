use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug};

use crate::external::google_maps::{GoogleMapsError, GoogleMapsErrorCode};
use crate::validation::ValidationError;

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        validation_error(err)
    }
}

impl From<GoogleMapsError> for Error {
    fn from(err: GoogleMapsError) -> Self {
        match err.code {
            GoogleMapsErrorCode::NotFound => Error {
                code: 102,
                message: err.message,
                details: None,
            },
            GoogleMapsErrorCode::InvalidRequest => Error {
                code: 101,
                message: err.message,
                details: None,
            },
            _ => upstream_error(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            4 => (StatusCode::BAD_GATEWAY, "Bad Gateway"),
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            102 => (StatusCode::NOT_FOUND, self.message.as_str()),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
            "details": self.details,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
        details: None,
    }
}

pub fn validation_error(err: ValidationError) -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
        details: serde_json::to_value(&err.issues).ok(),
    }
}

pub fn not_found_error() -> Error {
    Error {
        code: 102,
        message: "not found".into(),
        details: None,
    }
}

pub fn config_error(name: &str) -> Error {
    Error {
        code: 1,
        message: format!("invalid configuration value for {}", name),
        details: None,
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
        details: None,
    }
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!(error = ?err, "database error");

    Error {
        code: 2,
        message: "database error".into(),
        details: None,
    }
}

pub fn reqwest_error(_: reqwest::Error) -> Error {
    Error {
        code: 3,
        message: "reqwest error".into(),
        details: None,
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
        details: None,
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 5,
        message: "unexpected error".into(),
        details: None,
    }
}

/// An internally assembled value broke its own contract. Never retried.
pub fn invalid_result_error(err: ValidationError) -> Error {
    Error {
        code: 6,
        message: "assembled result failed validation".into(),
        details: serde_json::to_value(&err.issues).ok(),
    }
}

#[test]
fn validation_errors_map_to_bad_request() {
    use crate::validation::ValidationIssue;

    let err: Error = ValidationError {
        issues: vec![ValidationIssue::new("origin.lat", "must be <= 90")],
    }
    .into();

    assert_eq!(err.code, 101);
    assert_eq!(
        err.details,
        Some(json!([{ "path": "origin.lat", "message": "must be <= 90" }]))
    );
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[test]
fn internal_codes_hide_their_message() {
    let response = invalid_result_error(ValidationError { issues: vec![] }).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn not_found_maps_to_404() {
    assert_eq!(not_found_error().into_response().status(), StatusCode::NOT_FOUND);
}
