use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 司机可用性记录
///
/// 由司机端 App 上报，只追加、不修改；同一司机会累积多条记录，
/// 匹配时只认创建时间最新的一条。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub state: AvailabilityState,
    /// 预计恢复可用的时间，仅 returning 状态有意义
    pub available_at: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// 自由文本位置描述，缺少坐标时的降级数据
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 可用性状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AvailabilityState {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "returning")]
    Returning,
    #[serde(rename = "unavailable")]
    Unavailable,
}

impl AvailabilityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityState::Available => "available",
            AvailabilityState::Returning => "returning",
            AvailabilityState::Unavailable => "unavailable",
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for AvailabilityState {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("VARCHAR")
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for AvailabilityState {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        match s {
            "available" => Ok(AvailabilityState::Available),
            "returning" => Ok(AvailabilityState::Returning),
            "unavailable" => Ok(AvailabilityState::Unavailable),
            _ => Err(format!("Invalid availability state: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for AvailabilityState {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

impl AvailabilityRecord {
    /// 上报的当前坐标，经纬度齐全时才有效
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// 距离恢复可用还有多少小时
    ///
    /// 仅对带有 available_at 的 returning 记录返回值；已过期的
    /// 返程时间返回 0 以下的值由调用方按已可用处理。
    pub fn hours_until_available(&self, now: DateTime<Utc>) -> Option<f64> {
        if self.state != AvailabilityState::Returning {
            return None;
        }
        self.available_at
            .map(|at| (at - now).num_minutes() as f64 / 60.0)
    }
}

/// 归并出每个司机的最新可用性记录
///
/// 按司机分组、取 created_at 最大的一条，与输入顺序无关。
pub fn latest_per_driver(
    records: Vec<AvailabilityRecord>,
) -> HashMap<Uuid, AvailabilityRecord> {
    let mut latest: HashMap<Uuid, AvailabilityRecord> = HashMap::new();
    for record in records {
        match latest.get(&record.driver_id) {
            Some(existing) if existing.created_at >= record.created_at => {}
            _ => {
                latest.insert(record.driver_id, record);
            }
        }
    }
    latest
}
