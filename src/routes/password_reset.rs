use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{normalize_email, password, token};
use crate::error::AppError;
use crate::routes::MessageResponse;
use crate::state::SharedState;

pub const RESET_TTL_HOURS: i64 = 1;

#[derive(Deserialize, Serialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize, Serialize)]
pub struct ResetConfirm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
}

/// Always answers with the same message so the response does not reveal
/// whether the email is registered.
pub async fn request(
    State(state): State<SharedState>,
    body: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = body?;
    let email = normalize_email(&req.email);
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }

    let response = Json(MessageResponse::new(
        "If that email is registered, a reset link has been sent.",
    ));

    let user = match state.stores.users.find_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(response),
        Err(e) => {
            tracing::error!("Password reset lookup failed: {e}");
            return Ok(response);
        }
    };

    let reset_token = token::generate();
    if let Err(e) = state
        .stores
        .resets
        .create_password_reset(
            user.id,
            &token::hash(&reset_token),
            Utc::now() + Duration::hours(RESET_TTL_HOURS),
        )
        .await
    {
        tracing::error!(user_id = %user.id, "Failed to store password reset: {e}");
        return Ok(response);
    }

    let reset_url = format!(
        "{}/reset-password?token={reset_token}",
        state.config.base_url.trim_end_matches('/')
    );
    match state.system_mailer.clone() {
        Some(mailer) => {
            let to = user.email.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer.send_password_reset(&to, &reset_url).await {
                    tracing::error!("Failed to send password reset email: {e}");
                }
            });
        }
        None => {
            tracing::warn!("System SMTP not configured. Password reset link: {reset_url}");
        }
    }

    Ok(response)
}

pub async fn confirm(
    State(state): State<SharedState>,
    body: Result<Json<ResetConfirm>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = body?;
    if req.token.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Token and password are required".to_string(),
        ));
    }
    password::check_strength(&req.password).map_err(AppError::BadRequest)?;

    let invalid = || AppError::BadRequest("Invalid or expired reset token".to_string());

    let reset = state
        .stores
        .resets
        .find_valid_password_reset(&token::hash(&req.token))
        .await?
        .ok_or_else(invalid)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    if !state
        .stores
        .resets
        .redeem_password_reset(&reset, &pw_hash)
        .await?
    {
        return Err(invalid());
    }

    tracing::info!(user_id = %reset.user_id, "Password reset completed");

    Ok(Json(MessageResponse::new("Password reset successfully")))
}
