//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `budgets` - Monthly budgets
//! - `transactions` - Transactions (soft delete) and recurring transactions
//! - `notifications` - Agent notifications and suggestions
//! - `decisions` - Agent decision log
//! - `ports` - Async agent collaborator implementations

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use tracing::info;

use crate::error::{Error, Result};

mod budgets;
mod decisions;
mod notifications;
mod ports;
mod transactions;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "WARDEN_DB_KEY";

/// SQLite datetime format (matches CURRENT_TIMESTAMP)
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"warden-salt-v1-x";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Format a DateTime<Utc> the way SQLite stores CURRENT_TIMESTAMP
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a stored YYYY-MM-DD date column
pub(crate) fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse a stored enum column
pub(crate) fn parse_enum<T>(idx: usize, s: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    s.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(Error::InvalidData(e)))
    })
}

/// Parse a stored JSON column
pub(crate) fn parse_json(idx: usize, s: &str) -> rusqlite::Result<serde_json::Value> {
    serde_json::from_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Money amounts must be positive and finite
pub(crate) fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidData(format!("Amount must be positive, got {}", amount)));
    }
    Ok(())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `WARDEN_DB_KEY` environment variable to be set.
    /// The database will be encrypted using SQLCipher with a key derived
    /// from the passphrase via Argon2.
    ///
    /// Returns an error if `WARDEN_DB_KEY` is not set. Use `new_unencrypted()`
    /// for development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // The key must be set on every new pooled connection
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "warden_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().to_string();

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run a synchronous query on the blocking thread pool
    pub(crate) async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- WAL: readers (agent observe) don't block writers (CLI, act)
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Monthly budgets, one per user/category/month
            CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
                year INTEGER NOT NULL,
                alert_threshold REAL,                     -- percent of amount, 0-100
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(user_id, category, month, year)
            );

            CREATE INDEX IF NOT EXISTS idx_budgets_period ON budgets(year, month);

            -- Transactions (amount always positive, direction in transaction_type)
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                transaction_type TEXT NOT NULL,           -- INCOME, EXPENSE
                date DATE NOT NULL,
                description TEXT,
                deleted_at DATETIME,                      -- soft delete
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
            CREATE INDEX IF NOT EXISTS idx_transactions_user_category ON transactions(user_id, category);
            CREATE INDEX IF NOT EXISTS idx_transactions_deleted ON transactions(deleted_at);

            -- Recurring obligations and income
            CREATE TABLE IF NOT EXISTS recurring_transactions (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                transaction_type TEXT NOT NULL,
                frequency TEXT NOT NULL,                  -- DAILY, WEEKLY, MONTHLY, YEARLY
                description TEXT,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_recurring_active ON recurring_transactions(is_active);

            -- Agent-generated notifications
            CREATE TABLE IF NOT EXISTS notifications (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                type TEXT NOT NULL,                       -- BUDGET_ALERT, ANOMALY_DETECTION
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                priority INTEGER NOT NULL DEFAULT 0,      -- 0 normal, 1 high, 2 urgent
                metadata TEXT NOT NULL DEFAULT '{}',      -- JSON
                is_read BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read);

            -- Proposed changes awaiting user review
            CREATE TABLE IF NOT EXISTS suggestions (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                suggestion_type TEXT NOT NULL,            -- BUDGET_REALLOCATION
                suggested_value TEXT NOT NULL,
                confidence_score REAL NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}',      -- JSON
                status TEXT NOT NULL DEFAULT 'pending',   -- pending, accepted, rejected
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_suggestions_status ON suggestions(status);

            -- Agent decision log (append-only audit trail)
            CREATE TABLE IF NOT EXISTS agent_decision_logs (
                id INTEGER PRIMARY KEY,
                agent_type TEXT NOT NULL,
                observation TEXT NOT NULL,                -- JSON
                insights TEXT NOT NULL,                   -- JSON
                actions TEXT NOT NULL,                    -- JSON
                reasoning TEXT NOT NULL,
                execution_time_ms INTEGER NOT NULL,
                insights_count INTEGER NOT NULL,
                actions_count INTEGER NOT NULL,
                high_severity_count INTEGER NOT NULL,
                timestamp DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_decision_logs_agent ON agent_decision_logs(agent_type, timestamp);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
