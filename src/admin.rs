//! Operator checks behind `gamersclub-admin`.
//!
//! Nothing here changes the schema. When a table is missing the operator gets
//! the SQL to paste into the database console.

use std::fmt;

use sqlx::PgPool;

pub const PASSWORD_RESETS_DDL: &str = "CREATE TABLE password_resets (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    token TEXT NOT NULL UNIQUE,
    expires_at TIMESTAMPTZ NOT NULL,
    used BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);";

const UNDEFINED_TABLE: &str = "42P01";
const INSUFFICIENT_PRIVILEGE: &str = "42501";

#[derive(Debug, PartialEq)]
pub enum TableProbe {
    Rows(i64),
    Empty,
    Missing,
    PermissionDenied(String),
}

impl fmt::Display for TableProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableProbe::Rows(n) => write!(f, "table has {n} row(s)"),
            TableProbe::Empty => write!(
                f,
                "table is empty: seed it, or check that row-level security policies allow this role to read it"
            ),
            TableProbe::Missing => write!(f, "table does not exist"),
            TableProbe::PermissionDenied(msg) => write!(
                f,
                "permission denied ({msg}): GRANT SELECT on the table to this role or add a read policy"
            ),
        }
    }
}

/// Only plain identifiers (optionally schema-qualified) are probed, since the
/// name is interpolated into SQL.
pub fn validate_table_name(name: &str) -> Result<&str, String> {
    let valid = !name.is_empty()
        && name.split('.').count() <= 2
        && name.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(name)
    } else {
        Err(format!("Invalid table name: {name}"))
    }
}

fn classify(err: sqlx::Error) -> Result<TableProbe, sqlx::Error> {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNDEFINED_TABLE) => return Ok(TableProbe::Missing),
            Some(INSUFFICIENT_PRIVILEGE) => {
                return Ok(TableProbe::PermissionDenied(db_err.message().to_string()));
            }
            _ => {}
        }
    }
    Err(err)
}

pub async fn probe_table(pool: &PgPool, table: &str) -> Result<TableProbe, String> {
    let table = validate_table_name(table)?;
    let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await;

    match count {
        Ok(0) => Ok(TableProbe::Empty),
        Ok(n) => Ok(TableProbe::Rows(n)),
        Err(e) => classify(e).map_err(|e| format!("Query failed: {e}")),
    }
}

/// `Ok(true)` when the table is reachable, whether or not it has rows.
pub async fn password_resets_exists(pool: &PgPool) -> Result<bool, String> {
    match probe_table(pool, "password_resets").await? {
        TableProbe::Missing => Ok(false),
        TableProbe::PermissionDenied(msg) => Err(format!("Cannot inspect password_resets: {msg}")),
        TableProbe::Rows(_) | TableProbe::Empty => Ok(true),
    }
}

pub fn missing_password_resets_report() -> String {
    format!(
        "The password_resets table is missing.\n\
         Run the following SQL in your database console:\n\n{PASSWORD_RESETS_DDL}\n"
    )
}
