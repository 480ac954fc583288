use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use dispatch_core::models::Driver;
use dispatch_core::traits::DriverRepository;
use dispatch_core::DispatchResult;

pub struct PostgresDriverRepository {
    pool: PgPool,
}

impl PostgresDriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_driver(row: &sqlx::postgres::PgRow) -> DispatchResult<Driver> {
        // 目的地经验列表由行程结算侧维护，历史数据里可能为 NULL
        let known_destinations: Vec<String> = row
            .try_get::<Vec<String>, _>("known_destinations")
            .unwrap_or_default();

        Ok(Driver {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            status: row.try_get("status")?,
            vehicle_type: row.try_get("vehicle_type")?,
            capacity_kg: row.try_get("capacity_kg")?,
            completed_trips: row.try_get("completed_trips")?,
            acceptance_rate: row.try_get("acceptance_rate")?,
            known_destinations,
            approved: row.try_get("approved")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl DriverRepository for PostgresDriverRepository {
    #[instrument(skip(self))]
    async fn list_active(&self) -> DispatchResult<Vec<Driver>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, phone, city, state, status, vehicle_type, capacity_kg,
                   completed_trips, acceptance_rate, known_destinations, approved, created_at
            FROM drivers
            WHERE status = 'active'
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let drivers: Vec<Driver> = rows
            .iter()
            .map(Self::row_to_driver)
            .collect::<DispatchResult<_>>()?;
        debug!("查询到 {} 名活跃司机", drivers.len());
        Ok(drivers)
    }
}
