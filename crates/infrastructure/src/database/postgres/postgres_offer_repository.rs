use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use dispatch_core::models::{Offer, ScoreAudit};
use dispatch_core::traits::OfferRepository;
use dispatch_core::DispatchResult;

pub struct PostgresOfferRepository {
    pool: PgPool,
}

impl PostgresOfferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_offer(row: &sqlx::postgres::PgRow) -> DispatchResult<Offer> {
        Ok(Offer {
            id: row.try_get("id")?,
            shipment_id: row.try_get("shipment_id")?,
            driver_id: row.try_get("driver_id")?,
            status: row.try_get("status")?,
            score: row.try_get("score")?,
            justification: row.try_get("justification")?,
            auto_generated: row.try_get("auto_generated")?,
            offered_at: row.try_get("offered_at")?,
            response_at: row.try_get("response_at")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_audit(row: &sqlx::postgres::PgRow) -> DispatchResult<ScoreAudit> {
        Ok(ScoreAudit {
            id: row.try_get("id")?,
            shipment_id: row.try_get("shipment_id")?,
            driver_id: row.try_get("driver_id")?,
            score_total: row.try_get("score_total")?,
            justification: row.try_get("justification")?,
            computed_at: row.try_get("computed_at")?,
        })
    }
}

#[async_trait]
impl OfferRepository for PostgresOfferRepository {
    #[instrument(skip(self))]
    async fn has_recent_offer(
        &self,
        shipment_id: Uuid,
        driver_id: Uuid,
        since: DateTime<Utc>,
    ) -> DispatchResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM offers
                WHERE shipment_id = $1 AND driver_id = $2 AND created_at >= $3
            )
            "#,
        )
        .bind(shipment_id)
        .bind(driver_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            debug!(
                "货单 {} × 司机 {} 在 {} 之后已有报价",
                shipment_id, driver_id, since
            );
        }
        Ok(exists)
    }

    #[instrument(skip(self, offer), fields(offer_id = %offer.id, shipment_id = %offer.shipment_id))]
    async fn create(&self, offer: &Offer) -> DispatchResult<Offer> {
        let row = sqlx::query(
            r#"
            INSERT INTO offers (id, shipment_id, driver_id, status, score, justification, auto_generated, offered_at, response_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, shipment_id, driver_id, status, score, justification, auto_generated, offered_at, response_at, created_at
            "#,
        )
        .bind(offer.id)
        .bind(offer.shipment_id)
        .bind(offer.driver_id)
        .bind(offer.status)
        .bind(offer.score)
        .bind(&offer.justification)
        .bind(offer.auto_generated)
        .bind(offer.offered_at)
        .bind(offer.response_at)
        .bind(offer.created_at)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_offer(&row)
    }

    #[instrument(skip(self, audit), fields(shipment_id = %audit.shipment_id, driver_id = %audit.driver_id))]
    async fn create_audit(&self, audit: &ScoreAudit) -> DispatchResult<ScoreAudit> {
        let row = sqlx::query(
            r#"
            INSERT INTO score_audits (id, shipment_id, driver_id, score_total, justification, computed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, shipment_id, driver_id, score_total, justification, computed_at
            "#,
        )
        .bind(audit.id)
        .bind(audit.shipment_id)
        .bind(audit.driver_id)
        .bind(audit.score_total)
        .bind(&audit.justification)
        .bind(audit.computed_at)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_audit(&row)
    }
}
