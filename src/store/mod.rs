//! Live document store over SQLite.
//!
//! Models the hosted backend contract: a flat document tree with
//! per-collection live-read subscriptions (full snapshot on every change),
//! plus email/password credential handling with session-change notification.
//! SQLite is the source of truth for all application data.

mod credentials;
mod tree;

pub use credentials::Session;
pub use tree::Snapshot;

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::watch;

/// Collection paths in the document tree.
pub mod paths {
    pub const CATEGORIES: &str = "categories";
    pub const POSTS: &str = "posts";
    pub const USERS: &str = "users";
}

/// SQLite-backed document store with live subscriptions.
pub struct SqliteStore {
    pool: SqlitePool,
    /// One broadcast channel per subscribed collection, created lazily.
    channels: Mutex<HashMap<String, watch::Sender<Snapshot>>>,
    /// Current signed-in session, `None` when signed out.
    session: watch::Sender<Option<Session>>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            pool,
            channels: Mutex::new(HashMap::new()),
            session,
        }
    }
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create tables if they don't exist
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS credentials (
            email TEXT PRIMARY KEY,
            uid TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
