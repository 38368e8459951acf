use crate::{
    api::{
        handlers::session::{clear_session_cookie, session_from_headers},
        state::CookieConfig,
    },
    auth::AuthService,
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect},
};
use std::sync::Arc;
use tracing::{debug, error};

#[utoipa::path(
    get,
    path= "/log-out",
    responses (
        (status = 303, description = "Session cleared, redirect to /"),
    ),
    tag= "logout"
)]
pub async fn logout(
    headers: HeaderMap,
    service: Extension<AuthService>,
    cookies: Extension<Arc<CookieConfig>>,
) -> impl IntoResponse {
    if let Some(session_id) = session_from_headers(&headers, &cookies) {
        if let Err(err) = service.destroy_session(&session_id).await {
            error!("Failed to destroy session: {err}");
        } else {
            debug!("Logged out");
        }
    }

    // Always clear the cookie, even if the session binding was missing.
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(&cookies) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build clearing cookie: {err}"),
    }

    (response_headers, Redirect::to("/"))
}
