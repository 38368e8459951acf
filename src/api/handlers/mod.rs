pub mod health;
pub use self::health::health;

pub mod pages;
pub use self::pages::{index, sign_up_form};

pub mod session;
pub use self::session::CurrentUser;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

pub mod user_logout;
pub use self::user_logout::logout;

// common functions for the handlers
use crate::auth::AuthError;
use axum::http::StatusCode;

/// HTTP status for each domain error. Bodies never carry internal detail.
pub fn error_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::ValidationFailure(_) => StatusCode::BAD_REQUEST,
        AuthError::DuplicateUsername => StatusCode::CONFLICT,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;

    #[test]
    fn error_status_covers_every_variant() {
        assert_eq!(
            error_status(&AuthError::ValidationFailure("username is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&AuthError::DuplicateUsername),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            error_status(&AuthError::StoreUnavailable(StoreError::Database(
                sqlx::Error::PoolTimedOut
            ))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            error_status(&AuthError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
