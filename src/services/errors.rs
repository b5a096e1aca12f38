use thiserror::Error;

use crate::domain::lifecycle::InvalidStateTransition;

/// Failures reported by the service layer. Each variant maps to one HTTP
/// status in the routes.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("invalid value: {0}")]
    TypeConstraint(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    InvalidTransition(InvalidStateTransition),

    #[error("{0}")]
    BusinessRule(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
