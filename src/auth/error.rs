use crate::{accounts::CreateError, storage::StoreError};
use thiserror::Error;

/// Outcomes of the authentication service that are not a success.
///
/// `InvalidCredentials` is deliberately the only failure `verify` reports, so
/// callers cannot tell an unknown username from a wrong password.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    ValidationFailure(&'static str),

    #[error("username already exists")]
    DuplicateUsername,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CreateError> for AuthError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::DuplicateUsername => Self::DuplicateUsername,
            CreateError::ValidationFailure(reason) => Self::ValidationFailure(reason),
            CreateError::Store(err) => Self::StoreUnavailable(err),
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_errors_map_to_auth_errors() {
        assert!(matches!(
            AuthError::from(CreateError::DuplicateUsername),
            AuthError::DuplicateUsername
        ));
        assert!(matches!(
            AuthError::from(CreateError::ValidationFailure("username is required")),
            AuthError::ValidationFailure("username is required")
        ));
        assert!(matches!(
            AuthError::from(CreateError::Store(StoreError::Database(
                sqlx::Error::PoolTimedOut
            ))),
            AuthError::StoreUnavailable(_)
        ));
    }

    #[test]
    fn invalid_credentials_message_is_generic() {
        let message = AuthError::InvalidCredentials.to_string();
        assert!(!message.contains("not found"));
        assert_eq!(message, "invalid username or password");
    }
}
