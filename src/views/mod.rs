pub mod account;
pub mod auth;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(account::home_page))
        // Auth
        .route("/register", get(auth::register_page))
        .route("/login", get(auth::login_page))
        .route("/forgot-password", get(auth::forgot_password_page))
        .route("/reset-password", get(auth::reset_password_page))
        // Account
        .route("/profile", get(account::profile_page))
        .route("/wallet", get(account::wallet_page))
}
