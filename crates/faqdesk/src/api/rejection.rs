//! Mapping of handler failures to HTTP responses.

use warp::http::StatusCode;
use warp::reject::Reject;
use warp::{Rejection, Reply};

use tracing::{error, warn};

use crate::error::Error;

/// Body of every 404 for an unknown FAQ.
pub const FAQ_NOT_FOUND: &str = "FAQ not found";

/// Body of every 400 for a malformed identifier.
pub const INVALID_ID: &str = "Invalid ID parameter";

/// Failure classes visible to HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request is malformed; the message is returned verbatim.
    BadRequest(String),
    /// No FAQ has the requested identifier.
    NotFound,
    /// Anything else. Details stay in the server log.
    Internal,
}

impl Reject for ApiError {}

impl ApiError {
    /// HTTP status for this failure.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body for this failure.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message) => message,
            Self::NotFound => FAQ_NOT_FOUND,
            Self::Internal => "Internal Server Error",
        }
    }
}

pub(crate) fn bad_request(message: impl Into<String>) -> Rejection {
    warp::reject::custom(ApiError::BadRequest(message.into()))
}

pub(crate) fn not_found() -> Rejection {
    warp::reject::custom(ApiError::NotFound)
}

/// Log `err` against the failed operation and reject with a bare 500.
pub(crate) fn internal(operation: &'static str, err: &Error) -> Rejection {
    error!(operation, error = %err, "Request failed");
    warp::reject::custom(ApiError::Internal)
}

/// Render any rejection as a plain-text response.
///
/// # Errors
///
/// Never fails; the signature matches what `Filter::recover` expects.
pub async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Rejection> {
    let (status, message) = if let Some(err) = rejection.find::<ApiError>() {
        (err.status(), err.message().to_string())
    } else if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Route not found".to_string())
    } else if let Some(err) = rejection.find::<warp::filters::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::InvalidHeader>() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed".to_string(),
        )
    } else {
        warn!("Unhandled rejection: {:?}", rejection);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal.message().to_string(),
        )
    };

    Ok(warp::reply::with_status(message, status))
}
