use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::{
    GameRepository, PasswordResetRepository, StoreError, UserRepository, WalletRepository,
    user_not_found,
};
use crate::models::{Game, PasswordReset, Purchase, User};

/// In-process store with the same observable behaviour as `PgStore`,
/// including unique emails and unique reset tokens.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    games: DashMap<Uuid, Game>,
    purchases: DashMap<Uuid, Purchase>,
    resets: DashMap<Uuid, PasswordReset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_game(&self, title: &str, price: f64) -> Game {
        let game = Game {
            id: Uuid::now_v7(),
            title: title.to_string(),
            price,
            created_at: Utc::now(),
        };
        self.games.insert(game.id, game.clone());
        game
    }

    pub fn purchases_for(&self, user_id: Uuid) -> Vec<Purchase> {
        self.purchases
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.value().clone())
            .collect()
    }

    pub fn resets_for(&self, user_id: Uuid) -> Vec<PasswordReset> {
        self.resets
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect()
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        if self.email_taken(email, None) {
            return Err(StoreError::Conflict("Email already registered".to_string()));
        }
        let user = User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            balance: 0.0,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn update_email(&self, id: Uuid, email: &str) -> Result<(), StoreError> {
        if self.email_taken(email, Some(id)) {
            return Err(StoreError::Conflict("Email already registered".to_string()));
        }
        let mut user = self.users.get_mut(&id).ok_or_else(user_not_found)?;
        user.email = email.to_string();
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let mut user = self.users.get_mut(&id).ok_or_else(user_not_found)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl WalletRepository for MemoryStore {
    async fn fetch_balance(&self, user_id: Uuid) -> Result<f64, StoreError> {
        self.users
            .get(&user_id)
            .map(|u| u.balance)
            .ok_or_else(user_not_found)
    }

    async fn write_balance(&self, user_id: Uuid, balance: f64) -> Result<(), StoreError> {
        let mut user = self.users.get_mut(&user_id).ok_or_else(user_not_found)?;
        user.balance = balance;
        Ok(())
    }

    async fn increment_balance(&self, user_id: Uuid, amount: f64) -> Result<f64, StoreError> {
        let mut user = self.users.get_mut(&user_id).ok_or_else(user_not_found)?;
        let balance = user.balance + amount;
        if !balance.is_finite() {
            return Err(StoreError::BalanceOutOfRange);
        }
        user.balance = balance;
        Ok(balance)
    }
}

#[async_trait]
impl GameRepository for MemoryStore {
    async fn list_games(&self) -> Result<Vec<Game>, StoreError> {
        let mut games: Vec<Game> = self.games.iter().map(|g| g.value().clone()).collect();
        games.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(games)
    }

    async fn find_game(&self, id: Uuid) -> Result<Option<Game>, StoreError> {
        Ok(self.games.get(&id).map(|g| g.value().clone()))
    }

    async fn purchase(&self, user_id: Uuid, game: &Game) -> Result<f64, StoreError> {
        let balance = {
            let mut user = self.users.get_mut(&user_id).ok_or_else(user_not_found)?;
            if user.balance < game.price {
                return Err(StoreError::InsufficientFunds);
            }
            user.balance -= game.price;
            user.balance
        };

        let purchase = Purchase {
            id: Uuid::now_v7(),
            user_id,
            game_id: game.id,
            price: game.price,
            created_at: Utc::now(),
        };
        self.purchases.insert(purchase.id, purchase);

        Ok(balance)
    }
}

#[async_trait]
impl PasswordResetRepository for MemoryStore {
    async fn create_password_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordReset, StoreError> {
        if self.resets.iter().any(|r| r.token == token_hash) {
            return Err(StoreError::Conflict("Reset token already exists".to_string()));
        }
        let now = Utc::now();
        let reset = PasswordReset {
            id: Uuid::now_v7(),
            user_id,
            token: token_hash.to_string(),
            expires_at,
            used: false,
            created_at: now,
            updated_at: now,
        };
        self.resets.insert(reset.id, reset.clone());
        Ok(reset)
    }

    async fn find_valid_password_reset(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, StoreError> {
        let now = Utc::now();
        Ok(self
            .resets
            .iter()
            .find(|r| r.token == token_hash && r.is_redeemable(now))
            .map(|r| r.value().clone()))
    }

    async fn redeem_password_reset(
        &self,
        reset: &PasswordReset,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let Some(mut stored) = self.resets.get_mut(&reset.id) else {
            return Ok(false);
        };
        if stored.used {
            return Ok(false);
        }
        let mut user = self
            .users
            .get_mut(&stored.user_id)
            .ok_or_else(user_not_found)?;

        user.password_hash = password_hash.to_string();
        stored.used = true;
        stored.updated_at = Utc::now();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.create_user("a@test.com", "hash").await.unwrap();

        let err = store.create_user("a@test.com", "hash").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_email_allows_keeping_own_address() {
        let store = MemoryStore::new();
        let user = store.create_user("a@test.com", "hash").await.unwrap();
        store.create_user("b@test.com", "hash").await.unwrap();

        store.update_email(user.id, "a@test.com").await.unwrap();
        let err = store.update_email(user.id, "b@test.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn purchase_requires_funds() {
        let store = MemoryStore::new();
        let user = store.create_user("a@test.com", "hash").await.unwrap();
        let game = store.insert_game("Quake", 20.0);

        let err = store.purchase(user.id, &game).await.unwrap_err();
        assert!(matches!(err, StoreError::InsufficientFunds));
        assert!(store.purchases_for(user.id).is_empty());

        store.write_balance(user.id, 25.0).await.unwrap();
        assert_eq!(store.purchase(user.id, &game).await.unwrap(), 5.0);
        assert_eq!(store.purchases_for(user.id).len(), 1);
    }

    #[tokio::test]
    async fn reset_is_consumed_once() {
        let store = MemoryStore::new();
        let user = store.create_user("a@test.com", "hash").await.unwrap();
        let reset = store
            .create_password_reset(user.id, "tokenhash", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        assert!(store.find_valid_password_reset("tokenhash").await.unwrap().is_some());
        assert!(store.redeem_password_reset(&reset, "new-hash").await.unwrap());
        assert!(!store.redeem_password_reset(&reset, "other-hash").await.unwrap());
        assert!(store.find_valid_password_reset("tokenhash").await.unwrap().is_none());

        let user = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
    }

    #[tokio::test]
    async fn failed_redeem_keeps_the_reset_usable() {
        let store = MemoryStore::new();
        let orphan = Uuid::now_v7();
        let reset = store
            .create_password_reset(orphan, "tokenhash", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let err = store.redeem_password_reset(&reset, "new-hash").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!store.resets_for(orphan)[0].used);
        assert!(store.find_valid_password_reset("tokenhash").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expired_reset_is_not_valid() {
        let store = MemoryStore::new();
        let user = store.create_user("a@test.com", "hash").await.unwrap();
        store
            .create_password_reset(user.id, "old", Utc::now() - Duration::minutes(1))
            .await
            .unwrap();

        assert!(store.find_valid_password_reset("old").await.unwrap().is_none());
    }
}
