use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 货单信息
///
/// 表示一票等待派单的货运订单。货单由外部系统创建和维护，
/// 匹配核心对其只读，状态流转由司机响应侧驱动。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub product: String,
    pub weight_kg: f64,
    pub freight_value: Option<f64>,
    pub pickup_date: DateTime<Utc>,
    pub urgency: UrgencyLevel,
    pub status: ShipmentStatus,
    pub created_at: DateTime<Utc>,
}

/// 货单生命周期状态
///
/// pending → awaiting_driver → offered → matched → in_transit → delivered，
/// 任意阶段可转为 cancelled。匹配核心只消费处于待派单集合
/// （pending / awaiting_driver）的货单。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShipmentStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "awaiting_driver")]
    AwaitingDriver,
    #[serde(rename = "offered")]
    Offered,
    #[serde(rename = "matched")]
    Matched,
    #[serde(rename = "in_transit")]
    InTransit,
    #[serde(rename = "delivered")]
    Delivered,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::AwaitingDriver => "awaiting_driver",
            ShipmentStatus::Offered => "offered",
            ShipmentStatus::Matched => "matched",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Cancelled => "cancelled",
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for ShipmentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("VARCHAR")
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ShipmentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        match s {
            "pending" => Ok(ShipmentStatus::Pending),
            "awaiting_driver" => Ok(ShipmentStatus::AwaitingDriver),
            "offered" => Ok(ShipmentStatus::Offered),
            "matched" => Ok(ShipmentStatus::Matched),
            "in_transit" => Ok(ShipmentStatus::InTransit),
            "delivered" => Ok(ShipmentStatus::Delivered),
            "cancelled" => Ok(ShipmentStatus::Cancelled),
            _ => Err(format!("Invalid shipment status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for ShipmentStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

/// 货单紧急程度
///
/// 取值与外部存储保持一致（media/alta 为存量系统的葡语取值）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UrgencyLevel {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "media",
            UrgencyLevel::High => "alta",
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for UrgencyLevel {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("VARCHAR")
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for UrgencyLevel {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        match s {
            "low" => Ok(UrgencyLevel::Low),
            "media" => Ok(UrgencyLevel::Medium),
            "alta" => Ok(UrgencyLevel::High),
            _ => Err(format!("Invalid urgency level: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for UrgencyLevel {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

impl Shipment {
    /// 检查货单是否处于待派单集合
    pub fn is_awaiting_dispatch(&self) -> bool {
        matches!(
            self.status,
            ShipmentStatus::Pending | ShipmentStatus::AwaitingDriver
        )
    }
}
