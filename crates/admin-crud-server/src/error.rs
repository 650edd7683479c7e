//! Error conversion for HTTP responses
//!
//! This module maps CrudError to an HTTP status and a client-safe message.

use admin_crud_core::CrudError;
use http::StatusCode;
use thiserror::Error;

/// Error as sent to the client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
	pub status: StatusCode,
	pub message: String,
}

impl HttpError {
	pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
		Self {
			status,
			message: message.into(),
		}
	}
}

/// Extension trait for converting CrudError to HttpError
pub trait IntoHttpError {
	/// Convert CrudError to HttpError
	fn into_http_error(self) -> HttpError;
}

impl IntoHttpError for CrudError {
	fn into_http_error(self) -> HttpError {
		match self {
			CrudError::NotFound { .. } => HttpError::new(StatusCode::NOT_FOUND, self.to_string()),
			CrudError::ModelNotRegistered(name) => HttpError::new(StatusCode::NOT_FOUND, name),
			CrudError::Forbidden(msg) => HttpError::new(StatusCode::FORBIDDEN, msg),
			CrudError::BadRequest(msg) => HttpError::new(StatusCode::BAD_REQUEST, msg),
			CrudError::Repository(_) => {
				// Hide internal storage error details from clients
				HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, "Database operation failed")
			}
			CrudError::Render(_) => {
				HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, "Template rendering failed")
			}
			_ => HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, "Admin configuration error"),
		}
	}
}

/// Convert `Result<T, CrudError>` to `Result<T, HttpError>`
pub trait MapHttpError<T> {
	/// Map CrudError to HttpError
	fn map_http_error(self) -> Result<T, HttpError>;
}

impl<T> MapHttpError<T> for Result<T, CrudError> {
	fn map_http_error(self) -> Result<T, HttpError> {
		self.map_err(IntoHttpError::into_http_error)
	}
}
