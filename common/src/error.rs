use std::collections::BTreeMap;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::{error, warn};
use thiserror::Error;

use crate::api::{ErrorMessage, FieldErrorsMessage};

/// Field name mapped to every human readable problem found with the field's value
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Message returned to clients in place of any internal error detail
pub const INTERNAL_ERROR_MESSAGE: &str =
    "Could not perform the required action due to an internal error";

/// All possible error types that may occur while serving the klinika API
#[derive(Error, Debug)]
pub enum KlError {
    #[error("Authentication required.")]
    AuthenticationRequired,
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("CSRF verification failed. {0}")]
    CsrfRejected(&'static str),
    #[error("Invalid JSON payload.")]
    MalformedBody,
    #[error("Request failed validation for fields {:?}", _0.keys().collect::<Vec<_>>())]
    ValidationFailed(FieldErrors),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Generic SQL error\n{0}")]
    Sql(#[from] sqlx::Error),
    #[error("Stored password hash could not be read. {0}")]
    PasswordHash(String),
    #[error("IO error\n{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    ParseInt(#[from] std::num::ParseIntError),
    #[error("Environment Variable error\n{0}")]
    EnvVar(#[from] std::env::VarError),
    #[error("Blocking task failed\n{0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Generic error\n{0}")]
    Generic(String),
}

impl From<String> for KlError {
    fn from(value: String) -> Self {
        Self::Generic(value)
    }
}

impl From<&str> for KlError {
    fn from(value: &str) -> Self {
        Self::Generic(value.to_owned())
    }
}

/// Generic [Result][std::result::Result] type where the error is always [KlError]
pub type KlResult<T> = std::result::Result<T, KlError>;

impl ResponseError for KlError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::CsrfRejected(_) => StatusCode::FORBIDDEN,
            Self::MalformedBody | Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors are returned with their display message. Internal errors are logged and
    /// replaced with [INTERNAL_ERROR_MESSAGE].
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut builder = HttpResponse::build(status);
        match self {
            Self::ValidationFailed(errors) => {
                warn!("{self}");
                builder.json(FieldErrorsMessage { errors })
            }
            _ if status.is_server_error() => {
                error!("{self}");
                builder.json(ErrorMessage {
                    error: INTERNAL_ERROR_MESSAGE.to_owned(),
                })
            }
            _ => {
                warn!("{self}");
                builder.json(ErrorMessage {
                    error: self.to_string(),
                })
            }
        }
    }
}
