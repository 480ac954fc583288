use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 司机信息
///
/// 由注册流程维护，匹配核心只读。历史指标（完成趟数、接单率）
/// 由行程结算侧累计，approved 为商务/合规审核结论。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub status: DriverStatus,
    /// 车辆类型描述，如 "graneleiro"、"baú"
    pub vehicle_type: Option<String>,
    /// 核定载重（公斤），未申报时为 None
    pub capacity_kg: Option<f64>,
    pub completed_trips: i32,
    /// 历史接单率，0-100
    pub acceptance_rate: Option<f64>,
    /// 有完成记录的目的地城市
    pub known_destinations: Vec<String>,
    /// 商务审核结论，None 表示尚未审核
    pub approved: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// 司机运营状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DriverStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "inactive")]
    Inactive,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Active => "active",
            DriverStatus::Inactive => "inactive",
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for DriverStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("VARCHAR")
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for DriverStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        match s {
            "active" => Ok(DriverStatus::Active),
            "inactive" => Ok(DriverStatus::Inactive),
            _ => Err(format!("Invalid driver status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for DriverStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

impl Driver {
    /// 检查司机是否处于活跃状态
    pub fn is_active(&self) -> bool {
        matches!(self.status, DriverStatus::Active)
    }

    /// 司机注册的常驻城市，用于缺少定位时的距离降级估算
    pub fn home_city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// 检查司机是否跑过指定目的地
    pub fn has_destination_experience(&self, destination: &str) -> bool {
        let needle = destination.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.known_destinations
            .iter()
            .any(|d| d.trim().to_lowercase() == needle)
    }
}
