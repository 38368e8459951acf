use crate::{
    api::{
        handlers::{
            error_status,
            session::{session_cookie, CurrentUser},
        },
        state::CookieConfig,
        views,
    },
    auth::{AuthError, AuthService, Identity},
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
pub struct UserLogin {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

impl fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserLogin")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[utoipa::path(
    post,
    path= "/log-in",
    request_body(content = UserLogin, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 303, description = "Login successful, session cookie set, redirect to /"),
        (status = 401, description = "Invalid username or password"),
        (status = 503, description = "Store unavailable"),
    ),
    tag= "login"
)]
#[instrument(skip(current, service, cookies))]
pub async fn login(
    current: CurrentUser,
    service: Extension<AuthService>,
    cookies: Extension<Arc<CookieConfig>>,
    Form(user): Form<UserLogin>,
) -> Response {
    match service.log_in(&user.username, &user.password).await {
        Ok((account, session_id)) => {
            debug!(account_id = %account.id, "Login successful");
            current.end_previous_session(&service).await;

            match session_cookie(&cookies, &session_id) {
                Ok(cookie) => ([(SET_COOKIE, cookie)], Redirect::to("/")).into_response(),
                Err(e) => {
                    error!("Error building session cookie: {e:#}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        views::error_page("Something went wrong."),
                    )
                        .into_response()
                }
            }
        }

        Err(err @ AuthError::InvalidCredentials) => {
            debug!("Unauthorized");
            (
                error_status(&err),
                views::index(&Identity::Anonymous, Some(&err.to_string())),
            )
                .into_response()
        }

        Err(err) => {
            error!("Error logging in: {err}");
            (
                error_status(&err),
                views::error_page("Service unavailable, try again later."),
            )
                .into_response()
        }
    }
}
