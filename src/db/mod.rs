mod meal_repo;
mod session_repo;
mod user_repo;
mod water_repo;

pub use meal_repo::MealLogRepository;
pub use session_repo::SessionRepository;
pub use user_repo::UserRepository;
pub use water_repo::WaterIntakeRepository;

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Timestamps are stored as UTC text in the backend's format so that
/// lexicographic comparison in SQL matches chronological order and
/// DATE()/strftime() work on the raw column.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|naive| naive.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// What the local store can report. Connectivity is never its concern.
#[derive(Debug)]
pub enum StoreError {
    /// A unique column (username, email, session token) already holds
    /// the value. Carries the database's message.
    DuplicateKey(String),
    /// The targeted row does not exist.
    NotFound,
    /// The database itself failed (I/O, pool, migration).
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateKey(msg) => write!(f, "Duplicate key: {}", msg),
            StoreError::NotFound => write!(f, "Row not found"),
            StoreError::Unavailable(msg) => write!(f, "Local store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db)
                if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                StoreError::DuplicateKey(db.message().to_string())
            }
            _ => StoreError::Unavailable(e.to_string()),
        }
    }
}

/// Initialize the database connection pool and run migrations
pub async fn init_db(db_path: PathBuf) -> Result<SqlitePool, StoreError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| StoreError::Unavailable(format!("create {}: {}", parent.display(), e)))?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

    Ok(pool)
}
