use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use dispatch_core::models::Shipment;
use dispatch_core::traits::ShipmentRepository;
use dispatch_core::DispatchResult;

pub struct PostgresShipmentRepository {
    pool: PgPool,
}

impl PostgresShipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_shipment(row: &sqlx::postgres::PgRow) -> DispatchResult<Shipment> {
        Ok(Shipment {
            id: row.try_get("id")?,
            origin: row.try_get("origin")?,
            destination: row.try_get("destination")?,
            product: row.try_get("product")?,
            weight_kg: row.try_get("weight_kg")?,
            freight_value: row.try_get("freight_value")?,
            pickup_date: row.try_get("pickup_date")?,
            urgency: row.try_get("urgency")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl ShipmentRepository for PostgresShipmentRepository {
    #[instrument(skip(self))]
    async fn list_pending(
        &self,
        created_after: Option<DateTime<Utc>>,
    ) -> DispatchResult<Vec<Shipment>> {
        let rows = match created_after {
            Some(after) => {
                sqlx::query(
                    r#"
                    SELECT id, origin, destination, product, weight_kg, freight_value, pickup_date, urgency, status, created_at
                    FROM shipments
                    WHERE status IN ('pending', 'awaiting_driver') AND created_at >= $1
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(after)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, origin, destination, product, weight_kg, freight_value, pickup_date, urgency, status, created_at
                    FROM shipments
                    WHERE status IN ('pending', 'awaiting_driver')
                    ORDER BY created_at ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let shipments: Vec<Shipment> = rows
            .iter()
            .map(Self::row_to_shipment)
            .collect::<DispatchResult<_>>()?;
        debug!("查询到 {} 票待派单货单", shipments.len());
        Ok(shipments)
    }
}
