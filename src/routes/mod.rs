pub mod auth;
pub mod checkout;
pub mod games;
pub mod password_reset;
pub mod users;
pub mod wallet;

use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Accounts
        .route("/api/signup", post(auth::signup))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/me", get(users::me))
        .route("/api/updateUser/email", post(users::update_email))
        .route("/api/updateUser/password", post(users::update_password))
        // Password reset
        .route("/api/password-reset/request", post(password_reset::request))
        .route("/api/password-reset/confirm", post(password_reset::confirm))
        // Store
        .route("/api/games", get(games::list))
        .route("/api/checkout", post(checkout::checkout))
        // Wallet
        .nest("/api/addfunds", wallet::routes())
}
