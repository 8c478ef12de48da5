use crate::domain::error::DomainError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Uniform error body: `{"msg": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub msg: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    /// Any handler may raise an arbitrary message with its own status.
    #[error("{msg}")]
    Custom { status: StatusCode, msg: String },
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        ApiError::Custom {
            status,
            msg: msg.into(),
        }
    }

    /// Message shown to the client. Server-side failures stay opaque.
    pub fn msg(&self) -> String {
        match self {
            ApiError::Database(_) | ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Custom { status, .. } => *status,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = %self, status = %status, "Request failed");
        } else {
            warn!(error = %self, status = %status, "Request rejected");
        }

        HttpResponse::build(status).json(ErrorResponse { msg: self.msg() })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Conflict(msg)) => ApiError::Conflict(msg.clone()),
            Some(DomainError::ConstraintViolation(msg)) => ApiError::BadRequest(msg.clone()),
            Some(DomainError::Validation(msg)) => ApiError::BadRequest(msg.clone()),
            Some(DomainError::Integrity(msg)) => ApiError::Internal(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Database(format!("{err:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_domain_errors_map_to_status_codes() {
        let cases = [
            (DomainError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DomainError::Conflict("x".into()), StatusCode::CONFLICT),
            (DomainError::ConstraintViolation("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::Integrity("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (domain, status) in cases {
            let api = ApiError::from(anyhow::Error::from(domain));
            assert_eq!(api.status_code(), status);
        }
    }

    #[test]
    fn test_unknown_errors_are_internal() {
        let api = ApiError::from(anyhow::anyhow!("disk on fire"));
        assert!(matches!(api, ApiError::Database(_)));
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.msg(), "Internal server error");
    }

    #[actix_web::test]
    async fn test_custom_error_renders_msg_body() {
        let api = ApiError::new(StatusCode::IM_A_TEAPOT, "short and stout");
        let response = api.error_response();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.msg, "short and stout");
    }
}
