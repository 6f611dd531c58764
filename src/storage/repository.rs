use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::{NaiveDateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    format_for_storage, from_cents, parse_from_storage, to_cents, Transfer, TransferId,
    TransferKind,
};

use super::{StoreError, MIGRATIONS};

/// How long a writer waits on SQLite's lock before the call fails.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_CONNECTIONS: u32 = 8;

const TRANSFER_COLUMNS: &str = "sequence, id, amount_cents, occurred_at, note, kind";

type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Repository for persisting and querying transfers.
///
/// Cloning is cheap and shares the underlying pool: one repository is opened at startup
/// and handed to whoever needs it.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    ///
    /// Every commit is synced to disk before the call returns (`synchronous = FULL`).
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", path.as_ref().display()))?;
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations. Returns how many were applied.
    pub async fn migrate(&self) -> Result<usize> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version    INTEGER PRIMARY KEY,
                applied_at TEXT    NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create schema_migrations table")?;

        let current: i64 =
            sqlx::query("SELECT COALESCE(MAX(version), 0) AS version FROM schema_migrations")
                .fetch_one(&self.pool)
                .await
                .context("Failed to read schema version")?
                .get("version");

        let mut applied = 0;
        for &(version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > current) {
            let mut tx = self
                .pool
                .begin()
                .await
                .context("Failed to start migration transaction")?;

            sqlx::raw_sql(sql)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to run migration {version:03}"))?;

            sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(version)
                .bind(Utc::now().to_rfc3339())
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to record migration {version:03}"))?;

            tx.commit()
                .await
                .with_context(|| format!("Failed to commit migration {version:03}"))?;

            tracing::info!(version, "applied schema migration");
            applied += 1;
        }

        Ok(applied)
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Self::connect(path).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close the pool, waiting for in-flight connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Transfer operations
    // ========================

    /// Save a new transfer. Returns the record as stored.
    pub async fn insert(&self, transfer: &Transfer) -> Result<Transfer> {
        let amount_cents = to_cents(transfer.amount)?;

        let query = format!(
            r#"
            INSERT INTO transfers (id, amount_cents, occurred_at, note, kind)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {TRANSFER_COLUMNS}
            "#
        );
        let result = sqlx::query(&query)
            .bind(transfer.id.to_string())
            .bind(amount_cents)
            .bind(format_for_storage(&transfer.occurred_at))
            .bind(&transfer.note)
            .bind(transfer.kind.as_str())
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(Self::row_to_transfer(&row)?),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(StoreError::AlreadyExists(transfer.id))
            }
            Err(err) => Err(anyhow::Error::new(err)
                .context("Failed to save transfer")
                .into()),
        }
    }

    /// Get a transfer by ID.
    pub async fn find_by_id(&self, id: TransferId) -> Result<Option<Transfer>> {
        let query = format!("SELECT {TRANSFER_COLUMNS} FROM transfers WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch transfer")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transfer(&row)?)),
            None => Ok(None),
        }
    }

    /// Overwrite every value field of an existing transfer.
    ///
    /// The existence check and the write are one statement, so a concurrent delete or
    /// replace of the same id cannot slip in between them.
    pub async fn replace(&self, transfer: &Transfer) -> Result<Transfer> {
        let amount_cents = to_cents(transfer.amount)?;

        let query = format!(
            r#"
            UPDATE transfers
            SET amount_cents = ?, occurred_at = ?, note = ?, kind = ?
            WHERE id = ?
            RETURNING {TRANSFER_COLUMNS}
            "#
        );
        let row = sqlx::query(&query)
            .bind(amount_cents)
            .bind(format_for_storage(&transfer.occurred_at))
            .bind(&transfer.note)
            .bind(transfer.kind.as_str())
            .bind(transfer.id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to update transfer")?;

        match row {
            Some(row) => Ok(Self::row_to_transfer(&row)?),
            None => Err(StoreError::NotFound(transfer.id)),
        }
    }

    /// Remove a transfer permanently.
    pub async fn delete(&self, id: TransferId) -> Result<()> {
        let result = sqlx::query("DELETE FROM transfers WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete transfer")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// List transfers with `from <= occurred_at <= to`, oldest first.
    /// Ties keep insertion order.
    pub async fn query_range(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<Transfer>> {
        let query = format!(
            r#"
            SELECT {TRANSFER_COLUMNS}
            FROM transfers
            WHERE occurred_at >= ? AND occurred_at <= ?
            ORDER BY occurred_at, sequence
            "#
        );
        let rows = sqlx::query(&query)
            .bind(format_for_storage(&from))
            .bind(format_for_storage(&to))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transfers in range")?;

        rows.iter()
            .map(|row| Self::row_to_transfer(row).map_err(StoreError::from))
            .collect()
    }

    /// Total number of stored transfers.
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM transfers")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transfers")?;
        Ok(row.get("count"))
    }

    fn row_to_transfer(row: &SqliteRow) -> anyhow::Result<Transfer> {
        let id_str: String = row.get("id");
        let occurred_at_str: String = row.get("occurred_at");
        let kind_str: String = row.get("kind");

        Ok(Transfer {
            id: Uuid::parse_str(&id_str).context("Invalid transfer ID")?,
            amount: from_cents(row.get("amount_cents")),
            occurred_at: parse_from_storage(&occurred_at_str)
                .with_context(|| format!("Invalid occurred_at: {occurred_at_str}"))?,
            note: row.get("note"),
            kind: TransferKind::from_str(&kind_str)
                .ok_or_else(|| anyhow!("Invalid transfer kind: {}", kind_str))?,
        })
    }
}
