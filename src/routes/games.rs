use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::models::Game;
use crate::state::SharedState;

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<Game>>, AppError> {
    Ok(Json(state.stores.games.list_games().await?))
}
