use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

pub async fn create(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password_hash)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_email(pool: &PgPool, id: Uuid, email: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET email = $2 WHERE id = $1")
        .bind(id)
        .bind(email)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn update_password<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    password_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn fetch_balance(pool: &PgPool, id: Uuid) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, f64>("SELECT balance FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn set_balance(pool: &PgPool, id: Uuid, balance: f64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET balance = $2 WHERE id = $1")
        .bind(id)
        .bind(balance)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn increment_balance(
    pool: &PgPool,
    id: Uuid,
    amount: f64,
) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, f64>(
        "UPDATE users SET balance = balance + $2 WHERE id = $1 RETURNING balance",
    )
    .bind(id)
    .bind(amount)
    .fetch_optional(pool)
    .await
}

/// Debit only when the balance covers `amount`. `None` means either no such
/// user or insufficient funds.
pub async fn debit_balance<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    amount: f64,
) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, f64>(
        "UPDATE users SET balance = balance - $2
         WHERE id = $1 AND balance >= $2 RETURNING balance",
    )
    .bind(id)
    .bind(amount)
    .fetch_optional(executor)
    .await
}
