use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    GameRepository, PasswordResetRepository, StoreError, UserRepository, WalletRepository,
    user_not_found,
};
use crate::db;
use crate::models::{Game, PasswordReset, User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

fn conflict_on_unique(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(message.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        db::users::create(&self.pool, Uuid::now_v7(), email, password_hash)
            .await
            .map_err(|e| conflict_on_unique(e, "Email already registered"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(db::users::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(db::users::find_by_id(&self.pool, id).await?)
    }

    async fn update_email(&self, id: Uuid, email: &str) -> Result<(), StoreError> {
        let updated = db::users::update_email(&self.pool, id, email)
            .await
            .map_err(|e| conflict_on_unique(e, "Email already registered"))?;
        if updated == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        if db::users::update_password(&self.pool, id, password_hash).await? == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl WalletRepository for PgStore {
    async fn fetch_balance(&self, user_id: Uuid) -> Result<f64, StoreError> {
        db::users::fetch_balance(&self.pool, user_id)
            .await?
            .ok_or_else(user_not_found)
    }

    async fn write_balance(&self, user_id: Uuid, balance: f64) -> Result<(), StoreError> {
        if db::users::set_balance(&self.pool, user_id, balance).await? == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    async fn increment_balance(&self, user_id: Uuid, amount: f64) -> Result<f64, StoreError> {
        // Postgres refuses a float8 sum that overflows rather than storing infinity.
        db::users::increment_balance(&self.pool, user_id, amount)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err)
                    if db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) =>
                {
                    StoreError::BalanceOutOfRange
                }
                _ => StoreError::Database(e),
            })?
            .ok_or_else(user_not_found)
    }
}

#[async_trait]
impl GameRepository for PgStore {
    async fn list_games(&self) -> Result<Vec<Game>, StoreError> {
        Ok(db::games::list(&self.pool).await?)
    }

    async fn find_game(&self, id: Uuid) -> Result<Option<Game>, StoreError> {
        Ok(db::games::find_by_id(&self.pool, id).await?)
    }

    async fn purchase(&self, user_id: Uuid, game: &Game) -> Result<f64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let Some(balance) = db::users::debit_balance(&mut *tx, user_id, game.price).await? else {
            // Tell an unknown user apart from an empty wallet.
            return match db::users::fetch_balance(&self.pool, user_id).await? {
                Some(_) => Err(StoreError::InsufficientFunds),
                None => Err(user_not_found()),
            };
        };

        db::games::record_purchase(&mut *tx, Uuid::now_v7(), user_id, game.id, game.price).await?;
        tx.commit().await?;

        Ok(balance)
    }
}

#[async_trait]
impl PasswordResetRepository for PgStore {
    async fn create_password_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordReset, StoreError> {
        db::password_resets::create(&self.pool, Uuid::now_v7(), user_id, token_hash, expires_at)
            .await
            .map_err(|e| conflict_on_unique(e, "Reset token already exists"))
    }

    async fn find_valid_password_reset(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, StoreError> {
        Ok(db::password_resets::find_valid_by_token(&self.pool, token_hash).await?)
    }

    async fn redeem_password_reset(
        &self,
        reset: &PasswordReset,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        if !db::password_resets::mark_used(&mut *tx, reset.id).await? {
            return Ok(false);
        }
        if db::users::update_password(&mut *tx, reset.user_id, password_hash).await? == 0 {
            return Err(user_not_found());
        }
        tx.commit().await?;

        Ok(true)
    }
}
