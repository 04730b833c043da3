use askama::Template;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::extractor::ACCESS_COOKIE;
use crate::auth::jwt;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "auth/register.html")]
struct RegisterTemplate;

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate;

#[derive(Template)]
#[template(path = "auth/forgot_password.html")]
struct ForgotPasswordTemplate;

#[derive(Template)]
#[template(path = "auth/reset_password.html")]
struct ResetPasswordTemplate {
    token: String,
}

#[derive(Deserialize)]
pub struct ResetQuery {
    pub token: Option<String>,
}

fn signed_in(state: &SharedState, jar: &CookieJar) -> bool {
    jar.get(ACCESS_COOKIE)
        .is_some_and(|c| jwt::decode_token(c.value(), &state.config.jwt_secret).is_ok())
}

pub async fn register_page(State(state): State<SharedState>, jar: CookieJar) -> Response {
    if signed_in(&state, &jar) {
        return Redirect::to("/profile").into_response();
    }
    Html(RegisterTemplate.render().unwrap_or_default()).into_response()
}

pub async fn login_page(State(state): State<SharedState>, jar: CookieJar) -> Response {
    if signed_in(&state, &jar) {
        return Redirect::to("/wallet").into_response();
    }
    Html(LoginTemplate.render().unwrap_or_default()).into_response()
}

pub async fn forgot_password_page() -> impl IntoResponse {
    Html(ForgotPasswordTemplate.render().unwrap_or_default())
}

pub async fn reset_password_page(Query(q): Query<ResetQuery>) -> impl IntoResponse {
    let template = ResetPasswordTemplate {
        token: q.token.unwrap_or_default(),
    };
    Html(template.render().unwrap_or_default())
}
