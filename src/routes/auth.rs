use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::ACCESS_COOKIE;
use crate::auth::jwt::{self, Claims};
use crate::auth::{normalize_email, password};
use crate::error::AppError;
use crate::models::User;
use crate::routes::MessageResponse;
use crate::state::SharedState;

#[derive(Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
}

pub(crate) fn access_cookie(state: &SharedState, token: &str) -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(state.config.base_url.starts_with("https://"))
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(jwt::TOKEN_TTL_HOURS))
        .build()
}

pub(crate) fn issue_token(state: &SharedState, user: &User) -> Result<String, AppError> {
    jwt::encode_token(&Claims::new(user.id), &state.config.jwt_secret).map_err(AppError::Internal)
}

fn require_credentials(req: &Credentials) -> Result<(), AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

pub async fn signup(
    State(state): State<SharedState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let Json(req) = body?;
    require_credentials(&req)?;
    password::check_strength(&req.password).map_err(AppError::BadRequest)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    let user = state
        .stores
        .users
        .create_user(&normalize_email(&req.email), &pw_hash)
        .await?;

    tracing::info!(user_id = %user.id, "User signed up");

    let access_token = issue_token(&state, &user)?;
    let jar = CookieJar::new().add(access_cookie(&state, &access_token));
    Ok((jar, Json(AuthResponse { user, access_token })))
}

pub async fn login(
    State(state): State<SharedState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let Json(req) = body?;
    require_credentials(&req)?;
    let email = normalize_email(&req.email);
    let email = email.as_str();

    if state.login_limiter.check(email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(user) = state.stores.users.find_user_by_email(email).await? else {
        state.login_limiter.record_failure(email);
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    };

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(email);
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }
    state.login_limiter.reset(email);

    let access_token = issue_token(&state, &user)?;
    let jar = CookieJar::new().add(access_cookie(&state, &access_token));
    Ok((jar, Json(AuthResponse { user, access_token })))
}

pub async fn logout() -> (CookieJar, Json<MessageResponse>) {
    let cleared = Cookie::build((ACCESS_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    (
        CookieJar::new().add(cleared),
        Json(MessageResponse::new("Logged out")),
    )
}
