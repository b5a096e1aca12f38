//! Error conversion glue between the domain, repository and service layers.
//!
//! The domain layer must not depend on repository or service error types, so
//! the conversions live here instead of next to the error definitions.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(feature = "server")]
mod service {
    use crate::domain::lifecycle::InvalidStateTransition;
    use crate::domain::types::TypeConstraintError;
    use crate::forms::FormError;
    use crate::gateway::GatewayError;
    use crate::repository::errors::RepositoryError;
    use crate::services::ServiceError;

    impl From<TypeConstraintError> for ServiceError {
        fn from(val: TypeConstraintError) -> Self {
            ServiceError::TypeConstraint(val.to_string())
        }
    }

    impl From<InvalidStateTransition> for ServiceError {
        fn from(val: InvalidStateTransition) -> Self {
            ServiceError::InvalidTransition(val)
        }
    }

    impl From<FormError> for ServiceError {
        fn from(val: FormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<GatewayError> for ServiceError {
        fn from(val: GatewayError) -> Self {
            match val {
                GatewayError::Unsupported(_) => ServiceError::Unsupported(val.to_string()),
                GatewayError::Declined(_) => ServiceError::BusinessRule(val.to_string()),
            }
        }
    }

    impl From<RepositoryError> for ServiceError {
        fn from(val: RepositoryError) -> Self {
            match val {
                RepositoryError::NotFound => ServiceError::NotFound,
                RepositoryError::Duplicate(_) => ServiceError::Conflict(val.to_string()),
                RepositoryError::MissingReference(_) => ServiceError::NotFound,
                RepositoryError::ConstraintViolation(_) => {
                    ServiceError::BusinessRule(val.to_string())
                }
                other => ServiceError::Internal(other.to_string()),
            }
        }
    }
}
