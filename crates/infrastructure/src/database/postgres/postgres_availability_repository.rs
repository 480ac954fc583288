use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use dispatch_core::models::AvailabilityRecord;
use dispatch_core::traits::AvailabilityRepository;
use dispatch_core::DispatchResult;

pub struct PostgresAvailabilityRepository {
    pool: PgPool,
}

impl PostgresAvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> DispatchResult<AvailabilityRecord> {
        Ok(AvailabilityRecord {
            id: row.try_get("id")?,
            driver_id: row.try_get("driver_id")?,
            state: row.try_get("state")?,
            available_at: row.try_get("available_at")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            location: row.try_get("location")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl AvailabilityRepository for PostgresAvailabilityRepository {
    #[instrument(skip(self))]
    async fn list_recent(&self, limit: i64) -> DispatchResult<Vec<AvailabilityRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, driver_id, state, available_at, latitude, longitude, location, created_at
            FROM driver_availability
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let records: Vec<AvailabilityRecord> = rows
            .iter()
            .map(Self::row_to_record)
            .collect::<DispatchResult<_>>()?;
        debug!("查询到 {} 条可用性记录", records.len());
        Ok(records)
    }
}
