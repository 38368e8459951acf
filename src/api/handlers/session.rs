//! Session cookie handling and the `CurrentUser` extractor.
//!
//! Every handler that needs to know who is calling takes a [`CurrentUser`]
//! argument; the identity is resolved per request from the signed cookie.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{InvalidHeaderValue, COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

use crate::{
    api::{
        state::{CookieConfig, SESSION_COOKIE_NAME},
        views,
    },
    auth::{AuthService, Identity},
    sessions::{token, SessionId},
};

/// Identity of the caller plus the session id it presented, if any.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: Identity,
    pub session_id: Option<SessionId>,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (Some(service), Some(cookies)) = (
            parts.extensions.get::<AuthService>().cloned(),
            parts.extensions.get::<Arc<CookieConfig>>().cloned(),
        ) else {
            error!("Auth extensions missing from router");
            return Err(internal_error());
        };

        let Some(session_id) = session_from_headers(&parts.headers, &cookies) else {
            return Ok(Self {
                identity: Identity::Anonymous,
                session_id: None,
            });
        };

        match service.resolve_session(&session_id).await {
            Ok(identity) => Ok(Self {
                identity,
                session_id: Some(session_id),
            }),
            Err(err) => {
                error!("Failed to resolve session: {err}");
                Err((
                    StatusCode::SERVICE_UNAVAILABLE,
                    views::error_page("Service unavailable, try again later."),
                )
                    .into_response())
            }
        }
    }
}

impl CurrentUser {
    /// Drop the session this request presented, if any, before a new one is
    /// issued. Failures are logged; the old binding then expires on its own.
    pub(crate) async fn end_previous_session(&self, service: &AuthService) {
        let Some(session_id) = &self.session_id else {
            return;
        };
        if let Err(err) = service.destroy_session(session_id).await {
            error!("Failed to destroy previous session: {err}");
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        views::error_page("Something went wrong."),
    )
        .into_response()
}

/// Read and verify the session cookie. Unsigned or tampered values count as absent.
pub(crate) fn session_from_headers(headers: &HeaderMap, cookies: &CookieConfig) -> Option<SessionId> {
    let value = extract_session_cookie(headers)?;
    token::unsign(&value, cookies.secret())
}

/// Build an `HttpOnly` cookie carrying the signed session id.
pub(crate) fn session_cookie(
    cookies: &CookieConfig,
    session_id: &SessionId,
) -> anyhow::Result<HeaderValue> {
    let value = token::sign(session_id, cookies.secret())?;
    let max_age = cookies.max_age().as_secs();
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if cookies.secure() {
        cookie.push_str("; Secure");
    }
    Ok(HeaderValue::from_str(&cookie)?)
}

pub(crate) fn clear_session_cookie(
    cookies: &CookieConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if cookies.secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}
