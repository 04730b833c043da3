use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::{Game, User};
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    games: Vec<Game>,
}

#[derive(Template)]
#[template(path = "account/profile.html")]
struct ProfileTemplate {
    user: User,
    balance: String,
}

#[derive(Template)]
#[template(path = "account/wallet.html")]
struct WalletTemplate {
    user: User,
    balance: String,
    games: Vec<Game>,
}

fn format_balance(balance: f64) -> String {
    format!("{balance:.2}")
}

async fn current_user(state: &SharedState, auth: &AuthUser) -> Result<User, AppError> {
    state
        .stores
        .users
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
}

pub async fn home_page(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    let games = state.stores.games.list_games().await?;
    Ok(Html(HomeTemplate { games }.render().unwrap_or_default()))
}

pub async fn profile_page(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state, &auth).await?;
    let template = ProfileTemplate {
        balance: format_balance(user.balance),
        user,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn wallet_page(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state, &auth).await?;
    let games = state.stores.games.list_games().await?;
    let template = WalletTemplate {
        balance: format_balance(user.balance),
        user,
        games,
    };
    Ok(Html(template.render().unwrap_or_default()))
}
