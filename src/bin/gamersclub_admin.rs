//! gamersclub-admin: operator checks against the GamersClub database.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use gamersclub::admin::{self, TableProbe};

#[derive(Parser, Debug)]
#[command(name = "gamersclub-admin")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that password_resets exists, printing its CREATE TABLE if not
    CheckResets,

    /// Count the rows of a table and explain an empty or unreadable result
    Probe {
        /// Table name
        #[arg(default_value = "users")]
        table: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let database_url = cli
        .database_url
        .ok_or_else(|| "DATABASE_URL is not set (pass --database-url or add it to .env)".to_string())?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .map_err(|e| format!("Could not connect to the database: {e}"))?;

    let result = match cli.command {
        Commands::CheckResets => check_resets(&pool).await,
        Commands::Probe { table } => probe(&pool, &table).await,
    };

    pool.close().await;
    result
}

async fn check_resets(pool: &sqlx::PgPool) -> Result<(), String> {
    if admin::password_resets_exists(pool).await? {
        println!("password_resets exists. Nothing to do.");
    } else {
        println!("{}", admin::missing_password_resets_report());
    }
    Ok(())
}

async fn probe(pool: &sqlx::PgPool, table: &str) -> Result<(), String> {
    let result = admin::probe_table(pool, table).await?;
    println!("{table}: {result}");
    match result {
        TableProbe::Missing if table.ends_with("password_resets") => {
            println!("\n{}", admin::missing_password_resets_report());
        }
        TableProbe::PermissionDenied(_) => {
            return Err(format!("Cannot read {table} with the configured credentials"));
        }
        _ => {}
    }
    Ok(())
}
