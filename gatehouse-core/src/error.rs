// Error types shared by Gatehouse crates

use crate::{HttpResponse, HttpStatus};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// JSON body rendered for error responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status_code: u16,
    error: &'static str,
    message: &'a str,
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.http_status().code()
    }

    pub fn http_status(&self) -> HttpStatus {
        match self {
            Error::BadRequest(_) | Error::Deserialization(_) => HttpStatus::BadRequest,
            Error::Unauthorized(_) => HttpStatus::Unauthorized,
            Error::Forbidden(_) => HttpStatus::Forbidden,
            Error::NotFound(_) => HttpStatus::NotFound,
            Error::MethodNotAllowed(_) => HttpStatus::MethodNotAllowed,
            Error::BadGateway(_) => HttpStatus::BadGateway,
            Error::ServiceUnavailable(_) => HttpStatus::ServiceUnavailable,
            Error::Serialization(_) | Error::Internal(_) => HttpStatus::InternalServerError,
        }
    }

    /// The human readable message, without the status prefix.
    pub fn message(&self) -> &str {
        match self {
            Error::BadRequest(msg)
            | Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::MethodNotAllowed(msg)
            | Error::Serialization(msg)
            | Error::Deserialization(msg)
            | Error::BadGateway(msg)
            | Error::ServiceUnavailable(msg)
            | Error::Internal(msg) => msg,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.http_status().is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.http_status().is_server_error()
    }

    /// Render as a JSON error response: `{"statusCode", "error", "message"}`.
    pub fn into_response(self) -> HttpResponse {
        let status = self.http_status();
        let body = ErrorBody {
            status_code: status.code(),
            error: status.reason(),
            message: self.message(),
        };

        match HttpResponse::new(status.code()).with_json(&body) {
            Ok(response) => response,
            Err(_) => HttpResponse::new(status.code()).with_body(self.message().as_bytes().to_vec()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::BadRequest("x".into()).status_code(), 400);
        assert_eq!(Error::Deserialization("x".into()).status_code(), 400);
        assert_eq!(Error::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(Error::BadGateway("x".into()).status_code(), 502);
        assert_eq!(Error::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_error_classes() {
        assert!(Error::NotFound("route".into()).is_client_error());
        assert!(Error::ServiceUnavailable("down".into()).is_server_error());
    }

    #[test]
    fn test_into_response_body() {
        let response = Error::Unauthorized("Authentication failed".into()).into_response();

        assert_eq!(response.status, 401);
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["statusCode"], 401);
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["message"], "Authentication failed");
    }
}
