//! HTTP adapter mapping for service errors.
//!
//! Keeps [`ServiceError`] HTTP-agnostic while letting handlers return it
//! directly. The status and body come from the SchulConnex table; storage
//! failures are logged here because their details never reach the client.

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::ServiceError;
use crate::inbound::http::schulconnex::SchulConnexError;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ServiceError>;

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        SchulConnexError::from(self).status()
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Persistence(cause) = self {
            error!(error = cause.label(), "storage failure surfaced to client");
        }
        let payload = SchulConnexError::from(self);
        HttpResponse::build(payload.status()).json(payload)
    }
}

fn bad_request<E>(cause: E, description: String) -> actix_web::Error
where
    E: std::fmt::Display + std::fmt::Debug + 'static,
{
    let response = HttpResponse::BadRequest().json(SchulConnexError::bad_request(description));
    InternalError::from_response(cause, response).into()
}

/// `JsonConfig` error handler answering with a SchulConnex body.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected JSON payload");
    bad_request(err, "Der Anfrageinhalt ist kein gültiges JSON.".to_owned())
}

/// `QueryConfig` error handler answering with a SchulConnex body.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected query string");
    bad_request(err, "Die Abfrageparameter sind ungültig.".to_owned())
}
