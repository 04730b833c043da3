use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Game, Purchase};

pub async fn create(pool: &PgPool, id: Uuid, title: &str, price: f64) -> Result<Game, sqlx::Error> {
    sqlx::query_as::<_, Game>(
        "INSERT INTO games (id, title, price) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(id)
    .bind(title)
    .bind(price)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Game>, sqlx::Error> {
    sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Game>, sqlx::Error> {
    sqlx::query_as::<_, Game>("SELECT * FROM games ORDER BY title")
        .fetch_all(pool)
        .await
}

pub async fn record_purchase<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    user_id: Uuid,
    game_id: Uuid,
    price: f64,
) -> Result<Purchase, sqlx::Error> {
    sqlx::query_as::<_, Purchase>(
        "INSERT INTO purchases (id, user_id, game_id, price)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .bind(game_id)
    .bind(price)
    .fetch_one(executor)
    .await
}
