//! SQLite implementation of the LedgerRepository trait.
//!
//! Every call resolves the tenant's pool through the [`StoreMultiplexer`],
//! so a tenant's store is created on first use and picked up again after
//! an import replaces it.

use async_trait::async_trait;
use std::sync::Arc;

use gg_core::domain::entities::{Tenant, VerificationRecord};
use gg_core::errors::DomainError;
use gg_core::repositories::LedgerRepository;

use super::multiplexer::StoreMultiplexer;

type LedgerRow = (i64, Option<String>, Option<i64>, Option<i64>);

const SELECT_COLUMNS: &str = "SELECT discord_id, email, \
     CAST(verified AS INTEGER) AS verified, \
     CAST(verified_at AS INTEGER) AS verified_at \
     FROM users";

/// SQLite implementation of LedgerRepository
pub struct SqliteLedgerRepository {
    stores: Arc<StoreMultiplexer>,
}

impl SqliteLedgerRepository {
    /// Create a repository over the given multiplexer
    pub fn new(stores: Arc<StoreMultiplexer>) -> Self {
        Self { stores }
    }

    fn user_key(user_id: u64) -> Result<i64, DomainError> {
        i64::try_from(user_id).map_err(|_| DomainError::Internal {
            message: format!("user id {} does not fit the ledger key", user_id),
        })
    }

    fn row_to_record((discord_id, email, verified, verified_at): LedgerRow) -> VerificationRecord {
        VerificationRecord::from_columns(discord_id as u64, email, verified, verified_at)
    }

    fn query_error(tenant: &Tenant, e: sqlx::Error) -> DomainError {
        tracing::error!(
            tenant_id = %tenant.id,
            error = %e,
            event = "ledger_query_failed",
            "Ledger query failed"
        );
        DomainError::StorageUnavailable {
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl LedgerRepository for SqliteLedgerRepository {
    async fn find_record(
        &self,
        tenant: &Tenant,
        user_id: u64,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let key = Self::user_key(user_id)?;
        let pool = self.stores.get(tenant).await?;

        let row: Option<LedgerRow> =
            sqlx::query_as(&format!("{} WHERE discord_id = ?", SELECT_COLUMNS))
                .bind(key)
                .fetch_optional(&pool)
                .await
                .map_err(|e| Self::query_error(tenant, e))?;

        Ok(row.map(Self::row_to_record))
    }

    async fn upsert_verified(
        &self,
        tenant: &Tenant,
        record: &VerificationRecord,
    ) -> Result<(), DomainError> {
        let key = Self::user_key(record.user_id)?;
        let pool = self.stores.get(tenant).await?;

        sqlx::query(
            "INSERT INTO users (discord_id, email, verified, verified_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(discord_id) DO UPDATE SET
                 email = excluded.email,
                 verified = excluded.verified,
                 verified_at = excluded.verified_at",
        )
        .bind(key)
        .bind(&record.email)
        .bind(i64::from(record.verified))
        .bind(record.verified_at_epoch())
        .execute(&pool)
        .await
        .map_err(|e| Self::query_error(tenant, e))?;

        tracing::debug!(
            tenant_id = %tenant.id,
            user_id = record.user_id,
            event = "ledger_upsert",
            "Ledger row written"
        );
        Ok(())
    }

    async fn list_records(&self, tenant: &Tenant) -> Result<Vec<VerificationRecord>, DomainError> {
        let pool = self.stores.get(tenant).await?;

        let rows: Vec<LedgerRow> =
            sqlx::query_as(&format!("{} ORDER BY discord_id", SELECT_COLUMNS))
                .fetch_all(&pool)
                .await
                .map_err(|e| Self::query_error(tenant, e))?;

        Ok(rows.into_iter().map(Self::row_to_record).collect())
    }
}
