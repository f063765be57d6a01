use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use signage_collab::{DatabaseError, SignageError};
use signage_core::WidgetDataError;
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    /// The request was understood but its contents are invalid
    #[error("{0}")]
    BadRequest(String),
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.as_status_code(), self.to_string()).into_response()
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound { resource, id } => Self::NotFound { resource, id },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => {
                error!("Store operation failed: {}", e);
                Self::Unknown(e.to_string())
            }
        }
    }
}

impl From<WidgetDataError> for ServerError {
    fn from(value: WidgetDataError) -> Self {
        Self::BadRequest(value.to_string())
    }
}

/// Everything but store failures is caused by the request
impl From<SignageError> for ServerError {
    fn from(value: SignageError) -> Self {
        match value {
            SignageError::Database(e) => e.into(),
            e => Self::BadRequest(e.to_string()),
        }
    }
}
