use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::{normalize_email, password};
use crate::error::AppError;
use crate::models::User;
use crate::routes::MessageResponse;
use crate::state::SharedState;

#[derive(Deserialize, Serialize)]
pub struct UpdateEmailRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize, Serialize)]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub password: String,
}

pub async fn me(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = state
        .stores
        .users
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    Ok(Json(user))
}

pub async fn update_email(
    State(state): State<SharedState>,
    auth: AuthUser,
    body: Result<Json<UpdateEmailRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = body?;
    let email = normalize_email(&req.email);
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }

    state.stores.users.update_email(auth.user_id, &email).await?;
    tracing::info!(user_id = %auth.user_id, "Email updated");

    Ok(Json(MessageResponse::new("Email updated")))
}

pub async fn update_password(
    State(state): State<SharedState>,
    auth: AuthUser,
    body: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = body?;
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }
    password::check_strength(&req.password).map_err(AppError::BadRequest)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    state
        .stores
        .users
        .update_password(auth.user_id, &pw_hash)
        .await?;
    tracing::info!(user_id = %auth.user_id, "Password updated");

    Ok(Json(MessageResponse::new("Password updated")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{memory_app, post_json, send, signup};

    #[tokio::test]
    async fn me_requires_auth() {
        let (app, _) = memory_app();
        let (status, body) = send(&app, Method::GET, "/api/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing authentication token");

        let (status, _) = send(&app, Method::GET, "/api/me", None, Some("garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_returns_balance() {
        let (app, _) = memory_app();
        let (user_id, token) = signup(&app, "gamer@test.com", "password123").await;

        let (status, body) = send(&app, Method::GET, "/api/me", None, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], user_id);
        assert_eq!(body["balance"], 0.0);
    }

    #[tokio::test]
    async fn update_email_then_login_with_new_address() {
        let (app, _) = memory_app();
        let (_, token) = signup(&app, "old@test.com", "password123").await;

        let body = json!({ "email": "new@test.com" }).to_string();
        let (status, resp) = send(
            &app,
            Method::POST,
            "/api/updateUser/email",
            Some(&body),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["message"], "Email updated");

        let (status, _) = post_json(
            &app,
            "/api/login",
            &json!({ "email": "new@test.com", "password": "password123" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn update_email_conflict() {
        let (app, _) = memory_app();
        signup(&app, "taken@test.com", "password123").await;
        let (_, token) = signup(&app, "me@test.com", "password123").await;

        let body = json!({ "email": "taken@test.com" }).to_string();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/updateUser/email",
            Some(&body),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn update_password_validates_and_applies() {
        let (app, _) = memory_app();
        let (_, token) = signup(&app, "gamer@test.com", "password123").await;

        let short = json!({ "password": "short" }).to_string();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/updateUser/password",
            Some(&short),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let good = json!({ "password": "brand-new-pass" }).to_string();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/updateUser/password",
            Some(&good),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = post_json(
            &app,
            "/api/login",
            &json!({ "email": "gamer@test.com", "password": "brand-new-pass" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
