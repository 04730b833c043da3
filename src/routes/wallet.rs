//! Wallet top-up.
//!
//! The default path reads the balance, adds the amount and writes the sum
//! back as two separate store calls. Nothing serialises concurrent top-ups
//! for the same user, so one of them can be lost. With `atomic_topup` set the
//! store performs the addition in a single statement instead.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::SharedState;
use crate::store::{StoreError, WalletRepository};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFundsRequest {
    pub user_id: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFundsResponse {
    pub new_balance: f64,
}

/// Mounted by the caller under its own prefix (`/api/addfunds` in this app).
pub fn routes() -> Router<SharedState> {
    Router::new().route("/", post(add_funds))
}

pub async fn add_funds(
    State(state): State<SharedState>,
    body: Result<Json<AddFundsRequest>, JsonRejection>,
) -> Result<Json<AddFundsResponse>, AppError> {
    let Json(req) = body?;

    let (Some(user_id), Some(amount)) = (req.user_id.filter(|id| !id.is_empty()), req.amount)
    else {
        return Err(AppError::BadRequest(
            "userId and amount are required".to_string(),
        ));
    };

    let user_id = Uuid::parse_str(&user_id)
        .map_err(|_| AppError::BadRequest(format!("Invalid userId: {user_id}")))?;

    if !amount.is_finite() {
        return Err(AppError::BadRequest("amount must be a finite number".to_string()));
    }

    let new_balance = top_up(
        state.stores.wallet.as_ref(),
        user_id,
        amount,
        state.config.atomic_topup,
    )
    .await
    .map_err(|e| {
        tracing::warn!(%user_id, "Top-up failed: {e}");
        AppError::BadRequest(e.to_string())
    })?;

    tracing::info!(%user_id, amount, new_balance, "Funds added");

    Ok(Json(AddFundsResponse { new_balance }))
}

pub async fn top_up(
    wallet: &dyn WalletRepository,
    user_id: Uuid,
    amount: f64,
    atomic: bool,
) -> Result<f64, StoreError> {
    if atomic {
        return wallet.increment_balance(user_id, amount).await;
    }

    let balance = wallet.fetch_balance(user_id).await?;
    let new_balance = balance + amount;
    if !new_balance.is_finite() {
        return Err(StoreError::BalanceOutOfRange);
    }
    wallet.write_balance(user_id, new_balance).await?;
    Ok(new_balance)
}
