//! Typed HTTP client for the GamersClub API.
//!
//! Every call sends JSON, and a response carrying `{ "error": ... }` (or any
//! non-2xx status) comes back as [`ClientError::Api`]. There is no retry,
//! timeout or backoff beyond reqwest's defaults.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::env_or;
use crate::models::{Game, User};
use crate::routes::auth::AuthResponse;
use crate::routes::checkout::CheckoutResponse;
use crate::routes::wallet::AddFundsResponse;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Base URL from `GAMERSCLUB_API_URL`, defaulting to a local server.
    pub fn from_env() -> Self {
        Self::new(env_or("GAMERSCLUB_API_URL", "http://localhost:3000"))
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.body(body.to_string());
        }

        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let value: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(ClientError::Api {
                status,
                message: message.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ClientError::Api {
                status,
                message: format!("request failed with status {status}"),
            });
        }

        Ok(serde_json::from_value(value)?)
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(&body)).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        self.post_json("/api/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        self.post_json("/api/signup", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        self.get_json("/api/me").await
    }

    pub async fn update_email(&self, email: &str) -> Result<String, ClientError> {
        let resp: Value = self
            .post_json("/api/updateUser/email", &json!({ "email": email }))
            .await?;
        Ok(message_of(&resp))
    }

    pub async fn update_password(&self, password: &str) -> Result<String, ClientError> {
        let resp: Value = self
            .post_json("/api/updateUser/password", &json!({ "password": password }))
            .await?;
        Ok(message_of(&resp))
    }

    pub async fn add_funds(&self, user_id: Uuid, amount: f64) -> Result<f64, ClientError> {
        let resp: AddFundsResponse = self
            .post_json(
                "/api/addfunds",
                &json!({ "userId": user_id, "amount": amount }),
            )
            .await?;
        Ok(resp.new_balance)
    }

    pub async fn checkout(&self, user_id: Uuid, game_id: Uuid) -> Result<CheckoutResponse, ClientError> {
        self.post_json(
            "/api/checkout",
            &json!({ "userId": user_id, "gameId": game_id }),
        )
        .await
    }

    pub async fn list_games(&self) -> Result<Vec<Game>, ClientError> {
        self.get_json("/api/games").await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<String, ClientError> {
        let resp: Value = self
            .post_json("/api/password-reset/request", &json!({ "email": email }))
            .await?;
        Ok(message_of(&resp))
    }

    pub async fn confirm_password_reset(
        &self,
        token: &str,
        password: &str,
    ) -> Result<String, ClientError> {
        let resp: Value = self
            .post_json(
                "/api/password-reset/confirm",
                &json!({ "token": token, "password": password }),
            )
            .await?;
        Ok(message_of(&resp))
    }
}

fn message_of(resp: &Value) -> String {
    resp.get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{MemoryStore, Stores};
    use crate::test_support::test_config;

    async fn serve() -> (ApiClient, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let (app, _) = crate::build_app(Stores::from_store(store.clone()), test_config());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (ApiClient::new(format!("http://{addr}/")), store)
    }

    #[tokio::test]
    async fn signup_top_up_and_buy() {
        let (client, store) = serve().await;
        let game = store.insert_game("Factorio", 30.0);

        let auth = client.signup("client@test.com", "password123").await.unwrap();
        let client = client.with_token(auth.access_token);

        assert_eq!(client.add_funds(auth.user.id, 50.0).await.unwrap(), 50.0);
        let bought = client.checkout(auth.user.id, game.id).await.unwrap();
        assert_eq!(bought.new_balance, 20.0);
        assert_eq!(bought.game_id, game.id);

        let me = client.me().await.unwrap();
        assert_eq!(me.balance, 20.0);
        assert_eq!(client.list_games().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn error_bodies_become_api_errors() {
        let (client, _) = serve().await;

        let err = client
            .login("nobody@test.com", "password123")
            .await
            .unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Invalid email or password");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = client.add_funds(Uuid::now_v7(), 1.0).await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn account_updates_round_trip() {
        let (client, _) = serve().await;
        let auth = client.signup("before@test.com", "password123").await.unwrap();
        let client = client.with_token(auth.access_token);

        assert_eq!(client.update_email("after@test.com").await.unwrap(), "Email updated");
        assert_eq!(
            client.update_password("another-password").await.unwrap(),
            "Password updated"
        );
        client.login("after@test.com", "another-password").await.unwrap();
        assert!(client.request_password_reset("after@test.com").await.unwrap().contains("reset link"));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client.list_games().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
