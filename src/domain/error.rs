use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Data integrity error: {0}")]
    Integrity(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
