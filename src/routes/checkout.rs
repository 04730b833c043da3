use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::SharedState;
use crate::store::StoreError;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub user_id: Option<String>,
    pub game_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub new_balance: f64,
    pub game_id: Uuid,
}

fn parse_id(field: &str, value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value).map_err(|_| AppError::BadRequest(format!("Invalid {field}: {value}")))
}

pub async fn checkout(
    State(state): State<SharedState>,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let Json(req) = body?;

    let (Some(user_id), Some(game_id)) = (
        req.user_id.filter(|id| !id.is_empty()),
        req.game_id.filter(|id| !id.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "userId and gameId are required".to_string(),
        ));
    };
    let user_id = parse_id("userId", &user_id)?;
    let game_id = parse_id("gameId", &game_id)?;

    let game = state
        .stores
        .games
        .find_game(game_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;

    let new_balance = state
        .stores
        .games
        .purchase(user_id, &game)
        .await
        .map_err(|e| match e {
            StoreError::NotFound(msg) => AppError::BadRequest(msg),
            other => other.into(),
        })?;

    tracing::info!(%user_id, %game_id, price = game.price, new_balance, "Checkout completed");

    Ok(Json(CheckoutResponse {
        new_balance,
        game_id,
    }))
}
