//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
use std::str::FromStr;

use badger_common::helpers::non_empty_env;
use log::info;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod fulfillments;
pub mod spend;

const SQLITE_DB_URL: &str = "sqlite://data/badger_store.db";

pub static MIGRATOR: Migrator = sqlx::migrate!("./src/sqlite/migrations");

pub fn db_url() -> String {
    let result = non_empty_env("BM_DATABASE_URL").unwrap_or_else(|| {
        info!("🗃️ BM_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

/// Opens a connection pool, creating the database file (and its folder) if it does not exist yet.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    if let Some(folder) = options.clone().get_filename().parent().filter(|p| !p.as_os_str().is_empty() && !p.exists()) {
        info!("🗃️ Creating database folder {}", folder.display());
        std::fs::create_dir_all(folder)?;
    }
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqlxError> {
    MIGRATOR.run(pool).await?;
    info!("🗃️ Database migrations complete");
    Ok(())
}
