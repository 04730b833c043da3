//! Repository interfaces the route layer depends on.
//!
//! `PgStore` backs the server; `MemoryStore` backs tests and the
//! `GAMERSCLUB_STORE=memory` development mode.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Game, PasswordReset, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Insufficient funds")]
    InsufficientFunds,
    /// The new balance would not be a finite number.
    #[error("Balance out of range")]
    BalanceOutOfRange,
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn update_email(&self, id: Uuid, email: &str) -> Result<(), StoreError>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError>;
}

/// Balance access. `fetch_balance` + `write_balance` is the plain
/// read-modify-write pair; `increment_balance` is a single atomic step.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn fetch_balance(&self, user_id: Uuid) -> Result<f64, StoreError>;
    async fn write_balance(&self, user_id: Uuid, balance: f64) -> Result<(), StoreError>;
    async fn increment_balance(&self, user_id: Uuid, amount: f64) -> Result<f64, StoreError>;
}

#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn list_games(&self) -> Result<Vec<Game>, StoreError>;
    async fn find_game(&self, id: Uuid) -> Result<Option<Game>, StoreError>;
    /// Debit `game.price` and record the purchase. Returns the new balance.
    async fn purchase(&self, user_id: Uuid, game: &Game) -> Result<f64, StoreError>;
}

#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    async fn create_password_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordReset, StoreError>;
    async fn find_valid_password_reset(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, StoreError>;
    /// Marks the reset used and stores the new password hash for its user in
    /// one step. Returns false if the reset had already been used. On error
    /// neither change is kept.
    async fn redeem_password_reset(
        &self,
        reset: &PasswordReset,
        password_hash: &str,
    ) -> Result<bool, StoreError>;
}

fn user_not_found() -> StoreError {
    StoreError::NotFound("User not found".to_string())
}

/// One handle per repository interface. Usually all four point at the same
/// concrete store.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub wallet: Arc<dyn WalletRepository>,
    pub games: Arc<dyn GameRepository>,
    pub resets: Arc<dyn PasswordResetRepository>,
}

impl Stores {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + WalletRepository + GameRepository + PasswordResetRepository + 'static,
    {
        Self {
            users: store.clone(),
            wallet: store.clone(),
            games: store.clone(),
            resets: store,
        }
    }
}
