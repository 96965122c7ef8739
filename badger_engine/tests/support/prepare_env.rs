use badger_engine::SqliteDatabase;
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/bm_test_store_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        trace!("Could not drop database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Failed to drop database {url}: {e}");
    }
}
