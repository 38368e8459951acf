use crate::{
    api::{
        handlers::{
            error_status,
            session::{session_cookie, CurrentUser},
        },
        state::CookieConfig,
        views,
    },
    auth::{AuthError, AuthService},
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Default)]
pub struct UserRegister {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

impl fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRegister")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[utoipa::path(
    post,
    path= "/sign-up",
    request_body(content = UserRegister, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 303, description = "Account created, redirect to /; the session cookie is set unless the session store failed"),
        (status = 400, description = "Missing username or password"),
        (status = 409, description = "Username already exists"),
        (status = 503, description = "Store unavailable"),
    ),
    tag= "register"
)]
#[instrument(skip(current, service, cookies))]
pub async fn register(
    current: CurrentUser,
    service: Extension<AuthService>,
    cookies: Extension<Arc<CookieConfig>>,
    Form(user): Form<UserRegister>,
) -> Response {
    match service.sign_up(&user.username, &user.password).await {
        Ok((account, None)) => {
            // The account exists; send the user to log in by hand.
            debug!(account_id = %account.id, "Sign-up complete without a session");
            Redirect::to("/").into_response()
        }

        Ok((account, Some(session_id))) => {
            debug!(account_id = %account.id, "Sign-up complete");
            current.end_previous_session(&service).await;

            match session_cookie(&cookies, &session_id) {
                Ok(cookie) => ([(SET_COOKIE, cookie)], Redirect::to("/")).into_response(),
                Err(e) => {
                    error!("Error building session cookie: {e:#}");
                    // The account exists; send the user to log in by hand.
                    Redirect::to("/").into_response()
                }
            }
        }

        Err(err @ (AuthError::ValidationFailure(_) | AuthError::DuplicateUsername)) => {
            debug!("Sign-up rejected: {err}");
            (error_status(&err), views::sign_up(Some(&err.to_string()))).into_response()
        }

        Err(err) => {
            error!("Error signing up: {err}");
            let status = error_status(&err);
            let message = if status == StatusCode::SERVICE_UNAVAILABLE {
                "Service unavailable, try again later."
            } else {
                "Something went wrong."
            };
            (status, views::error_page(message)).into_response()
        }
    }
}
