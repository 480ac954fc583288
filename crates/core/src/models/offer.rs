use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::score::CompatibilityScore;
use crate::errors::DispatchResult;

/// 报价记录
///
/// 把一票货单和一名司机关联起来，携带创建时刻的评分快照。
/// 由派单引擎创建，后续状态由司机响应侧更新。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub driver_id: Uuid,
    pub status: OfferStatus,
    pub score: i64,
    pub justification: serde_json::Value,
    pub auto_generated: bool,
    pub offered_at: Option<DateTime<Utc>>,
    pub response_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 报价状态
///
/// suggested → offered → accepted / rejected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OfferStatus {
    #[serde(rename = "suggested")]
    Suggested,
    #[serde(rename = "offered")]
    Offered,
    #[serde(rename = "accepted")]
    Accepted,
    #[serde(rename = "rejected")]
    Rejected,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Suggested => "suggested",
            OfferStatus::Offered => "offered",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for OfferStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("VARCHAR")
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OfferStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        match s {
            "suggested" => Ok(OfferStatus::Suggested),
            "offered" => Ok(OfferStatus::Offered),
            "accepted" => Ok(OfferStatus::Accepted),
            "rejected" => Ok(OfferStatus::Rejected),
            _ => Err(format!("Invalid offer status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for OfferStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

impl Offer {
    /// 由评分结果构造一条自动报价，状态直接置为 offered
    pub fn auto_offer(
        shipment_id: Uuid,
        driver_id: Uuid,
        score: &CompatibilityScore,
    ) -> DispatchResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            shipment_id,
            driver_id,
            status: OfferStatus::Offered,
            score: score.total,
            justification: serde_json::to_value(&score.justification)?,
            auto_generated: true,
            offered_at: Some(now),
            response_at: None,
            created_at: now,
        })
    }

    /// 报价是否仍在等待司机响应
    pub fn is_open(&self) -> bool {
        matches!(self.status, OfferStatus::Suggested | OfferStatus::Offered)
    }
}

/// 评分审计记录
///
/// 每次进入派单评估的评分都追加一条，与报价是否实际发出无关。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreAudit {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub driver_id: Uuid,
    pub score_total: i64,
    pub justification: serde_json::Value,
    pub computed_at: DateTime<Utc>,
}

impl ScoreAudit {
    pub fn from_score(
        shipment_id: Uuid,
        driver_id: Uuid,
        score: &CompatibilityScore,
    ) -> DispatchResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            shipment_id,
            driver_id,
            score_total: score.total,
            justification: serde_json::to_value(&score.justification)?,
            computed_at: Utc::now(),
        })
    }
}
