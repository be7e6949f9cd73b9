use gabinete_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("User not found")]
    UserNotFound,

    #[error("Person not found")]
    PersonNotFound,

    #[error("Interaction not found")]
    InteractionNotFound,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Scheduled end precedes scheduled start")]
    InvalidSchedule,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::UserNotFound => AppError::not_found("User not found"),
            ServiceError::PersonNotFound => AppError::not_found("Person not found"),
            ServiceError::InteractionNotFound => AppError::not_found("Interaction not found"),
            ServiceError::EmailAlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            }
            ServiceError::InvalidToken => AppError::Unauthorized(anyhow::anyhow!("Invalid token")),
            ServiceError::InvalidSchedule => {
                AppError::bad_request("Scheduled end precedes scheduled start")
            }
            ServiceError::ValidationError(e) => AppError::bad_request(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ServiceError::UserNotFound, StatusCode::NOT_FOUND),
            (ServiceError::EmailAlreadyRegistered, StatusCode::CONFLICT),
            (ServiceError::InvalidToken, StatusCode::UNAUTHORIZED),
            (ServiceError::InvalidSchedule, StatusCode::BAD_REQUEST),
            (
                ServiceError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }
}
