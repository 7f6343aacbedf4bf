//! Validation and schema normalization of an uploaded ledger

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};
use std::path::Path;

use gg_core::errors::DomainError;

use super::super::multiplexer::LEDGER_COLUMNS;

const REQUIRED_COLUMNS: [&str; 2] = ["discord_id", "email"];

fn invalid(reason: impl Into<String>) -> DomainError {
    DomainError::Validation {
        reason: reason.into(),
    }
}

/// Check that the file at `path` is a usable ledger and upgrade it in place
///
/// Accepted files pass `PRAGMA integrity_check` and have a `users` table
/// with `discord_id` and `email`. Missing `verified` / `verified_at`
/// columns are added; every row without a `verified` value is marked
/// verified. A table where `discord_id` is neither the primary key nor
/// uniquely indexed is rebuilt with `discord_id` as the primary key, the
/// last row per id winning and rows without an id dropped. Returns the
/// number of rows.
pub async fn validate_and_normalize(path: &Path) -> Result<u64, DomainError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false)
        .journal_mode(SqliteJournalMode::Delete);

    let mut conn = options
        .connect()
        .await
        .map_err(|e| invalid(format!("not a SQLite database ({})", e)))?;

    let result = inspect(&mut conn).await;
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "Failed to close staged ledger");
    }
    result
}

async fn inspect(conn: &mut SqliteConnection) -> Result<u64, DomainError> {
    let integrity: Vec<String> = sqlx::query_scalar("PRAGMA integrity_check")
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| invalid(format!("not a SQLite database ({})", e)))?;
    if integrity.len() != 1 || integrity[0] != "ok" {
        return Err(invalid(format!(
            "integrity check failed: {}",
            integrity.join("; ")
        )));
    }

    let has_users: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
    )
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| invalid(e.to_string()))?;
    if has_users == 0 {
        return Err(invalid("missing users table"));
    }

    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('users')")
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| invalid(e.to_string()))?;
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(invalid(format!("users table is missing column {}", required)));
        }
    }

    let upgrade_failed = |e: sqlx::Error| invalid(format!("failed while upgrading schema ({})", e));
    if !columns.iter().any(|column| column == "verified") {
        sqlx::query("ALTER TABLE users ADD COLUMN verified INTEGER DEFAULT 1")
            .execute(&mut *conn)
            .await
            .map_err(upgrade_failed)?;
        tracing::info!(event = "ledger_upgraded", column = "verified", "Added missing column");
    }
    if !columns.iter().any(|column| column == "verified_at") {
        sqlx::query("ALTER TABLE users ADD COLUMN verified_at INTEGER")
            .execute(&mut *conn)
            .await
            .map_err(upgrade_failed)?;
        tracing::info!(event = "ledger_upgraded", column = "verified_at", "Added missing column");
    }
    sqlx::query("UPDATE users SET verified = 1 WHERE verified IS NULL")
        .execute(&mut *conn)
        .await
        .map_err(upgrade_failed)?;

    if !discord_id_is_key(conn).await? {
        rebuild_keyed(conn).await.map_err(upgrade_failed)?;
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| invalid(e.to_string()))?;
    Ok(rows.max(0) as u64)
}

/// Whether `ON CONFLICT(discord_id)` can target the table
async fn discord_id_is_key(conn: &mut SqliteConnection) -> Result<bool, DomainError> {
    let primary_key: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM pragma_table_info('users') WHERE pk > 0",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| invalid(e.to_string()))?;
    if primary_key == ["discord_id"] {
        return Ok(true);
    }

    let unique_indexes: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_index_list('users') AS il
         WHERE il.\"unique\" = 1 AND il.partial = 0
           AND (SELECT COUNT(*) FROM pragma_index_info(il.name)) = 1
           AND (SELECT name FROM pragma_index_info(il.name)) = 'discord_id'",
    )
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| invalid(e.to_string()))?;
    Ok(unique_indexes > 0)
}

async fn rebuild_keyed(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let before: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *conn)
        .await?;

    let mut tx = conn.begin().await?;
    sqlx::query(&format!("CREATE TABLE users_keyed ({})", LEDGER_COLUMNS))
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "INSERT OR REPLACE INTO users_keyed (discord_id, email, verified, verified_at)
         SELECT discord_id, email, verified, verified_at FROM users
         WHERE discord_id IS NOT NULL ORDER BY rowid",
    )
    .execute(&mut *tx)
    .await?;
    sqlx::query("DROP TABLE users").execute(&mut *tx).await?;
    sqlx::query("ALTER TABLE users_keyed RENAME TO users")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    let after: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *conn)
        .await?;
    tracing::info!(
        event = "ledger_upgraded",
        column = "discord_id",
        rows_before = before,
        rows_after = after,
        "Rebuilt users table with discord_id as primary key"
    );
    Ok(())
}
