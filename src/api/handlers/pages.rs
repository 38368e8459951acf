use crate::api::{handlers::session::CurrentUser, views};
use axum::response::{Html, IntoResponse, Redirect, Response};

#[utoipa::path(
    get,
    path= "/",
    responses (
        (status = 200, description = "Greeting when logged in, log-in form otherwise"),
    ),
    tag= "pages"
)]
pub async fn index(user: CurrentUser) -> Html<String> {
    views::index(&user.identity, None)
}

#[utoipa::path(
    get,
    path= "/sign-up",
    responses (
        (status = 200, description = "Sign-up form"),
        (status = 303, description = "Already logged in, redirect to /"),
    ),
    tag= "pages"
)]
pub async fn sign_up_form(user: CurrentUser) -> Response {
    if user.identity.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    views::sign_up(None).into_response()
}
