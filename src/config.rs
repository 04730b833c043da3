use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub store: StoreBackend,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub atomic_topup: bool,
    pub run_migrations: bool,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let store = match env_or("GAMERSCLUB_STORE", "postgres").as_str() {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => return Err(format!("Invalid GAMERSCLUB_STORE: {other}")),
        };

        let database_url = match store {
            StoreBackend::Postgres => Some(env_required("DATABASE_URL")?),
            StoreBackend::Memory => std::env::var("DATABASE_URL").ok(),
        };

        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("GAMERSCLUB_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid GAMERSCLUB_HOST: {e}"))?;

        let port: u16 = env_or("GAMERSCLUB_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid GAMERSCLUB_PORT: {e}"))?;

        let base_url = env_or("GAMERSCLUB_BASE_URL", &format!("http://{host}:{port}"));

        let atomic_topup = env_flag("GAMERSCLUB_ATOMIC_TOPUP", false)?;
        let run_migrations = env_flag("GAMERSCLUB_RUN_MIGRATIONS", true)?;

        let log_level = env_or("GAMERSCLUB_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("GAMERSCLUB_SMTP_HOST").ok(),
            std::env::var("GAMERSCLUB_SMTP_PORT").ok(),
            std::env::var("GAMERSCLUB_SMTP_USER").ok(),
            std::env::var("GAMERSCLUB_SMTP_PASS").ok(),
            std::env::var("GAMERSCLUB_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid GAMERSCLUB_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            store,
            jwt_secret,
            host,
            port,
            base_url,
            atomic_topup,
            run_migrations,
            log_level,
            smtp,
        })
    }
}

pub(crate) fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

pub(crate) fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str, default: bool) -> Result<bool, String> {
    match std::env::var(key) {
        Ok(v) => parse_flag(&v).ok_or_else(|| format!("Invalid {key}: {v}")),
        Err(_) => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
