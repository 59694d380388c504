//! Outbox Repository

use std::time::Duration;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, PgPool, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
    types::Json,
};

use crate::{
    database::decode_u64,
    domain::tenants::records::TenantUuid,
    outbox::{
        SideEffect,
        records::{OutboxCounts, OutboxRecord, OutboxStatus, OutboxUuid},
    },
};

const ENQUEUE_SQL: &str = include_str!("sql/enqueue.sql");
const CLAIM_SQL: &str = include_str!("sql/claim.sql");
const MARK_DELIVERED_SQL: &str = include_str!("sql/mark_delivered.sql");
const RECORD_FAILURE_SQL: &str = include_str!("sql/record_failure.sql");
const COUNT_BY_STATUS_SQL: &str = include_str!("sql/count_by_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOutboxRepository;

impl PgOutboxRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Record `effect` inside the caller's tenant transaction. It becomes claimable only
    /// once that transaction commits.
    pub(crate) async fn enqueue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        effect: &SideEffect,
    ) -> Result<OutboxUuid, sqlx::Error> {
        let uuid = OutboxUuid::new();

        query(ENQUEUE_SQL)
            .bind(uuid.into_uuid())
            .bind(effect.kind())
            .bind(Json(effect))
            .execute(&mut **tx)
            .await?;

        Ok(uuid)
    }

    /// Claim up to `batch` pending records, plus in-flight ones whose lease has run out.
    /// Concurrent dispatchers skip each other's rows.
    pub(crate) async fn claim(
        &self,
        pool: &PgPool,
        batch: u32,
        lease: Duration,
    ) -> Result<Vec<OutboxRecord>, sqlx::Error> {
        query_as::<Postgres, OutboxRecord>(CLAIM_SQL)
            .bind(i64::from(batch))
            .bind(lease.as_secs_f64())
            .fetch_all(pool)
            .await
    }

    pub(crate) async fn mark_delivered(
        &self,
        pool: &PgPool,
        record: OutboxUuid,
    ) -> Result<(), sqlx::Error> {
        query(MARK_DELIVERED_SQL)
            .bind(record.into_uuid())
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Release a record after a failed attempt. It goes back to pending, or to failed
    /// once `max_attempts` is reached.
    pub(crate) async fn record_failure(
        &self,
        pool: &PgPool,
        record: OutboxUuid,
        error: &str,
        max_attempts: u32,
    ) -> Result<OutboxStatus, sqlx::Error> {
        let status: String = query_scalar(RECORD_FAILURE_SQL)
            .bind(record.into_uuid())
            .bind(error)
            .bind(i64::from(max_attempts))
            .fetch_one(pool)
            .await?;

        decode_status(&status)
    }

    pub(crate) async fn count_by_status(&self, pool: &PgPool) -> Result<OutboxCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> = query_as(COUNT_BY_STATUS_SQL).fetch_all(pool).await?;

        let mut counts = OutboxCounts::default();

        for (status, count) in rows {
            let count = decode_u64(count, "count")?;

            match decode_status(&status)? {
                OutboxStatus::Pending => counts.pending = count,
                OutboxStatus::InFlight => counts.in_flight = count,
                OutboxStatus::Delivered => counts.delivered = count,
                OutboxStatus::Failed => counts.failed = count,
            }
        }

        Ok(counts)
    }
}

fn decode_status(status: &str) -> Result<OutboxStatus, sqlx::Error> {
    status
        .parse::<OutboxStatus>()
        .map_err(|error| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(error),
        })
}

impl<'r> FromRow<'r, PgRow> for OutboxRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let attempts: i32 = row.try_get("attempts")?;

        Ok(Self {
            uuid: OutboxUuid::from_uuid(row.try_get("uuid")?),
            tenant_uuid: TenantUuid::from_uuid(row.try_get("tenant_uuid")?),
            effect: row.try_get::<Json<SideEffect>, _>("payload")?.0,
            attempts: u32::try_from(attempts).map_err(|error| sqlx::Error::ColumnDecode {
                index: "attempts".to_string(),
                source: Box::new(error),
            })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
