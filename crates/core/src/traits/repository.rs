//! 仓储抽象
//!
//! 对外部存储的读写接口，遵循依赖倒置原则。匹配核心只追加
//! 报价与审计记录，从不直接修改货单/司机/可用性数据。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::DispatchResult;
use crate::models::{AvailabilityRecord, Driver, Offer, ScoreAudit, Shipment};

/// 货单仓储抽象
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    /// 查询处于待派单集合的货单，可选限定创建时间下界
    async fn list_pending(
        &self,
        created_after: Option<DateTime<Utc>>,
    ) -> DispatchResult<Vec<Shipment>>;
}

/// 司机仓储抽象
#[async_trait]
pub trait DriverRepository: Send + Sync {
    /// 查询运营状态为 active 的司机
    async fn list_active(&self) -> DispatchResult<Vec<Driver>>;
}

/// 可用性仓储抽象
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// 按创建时间倒序查询最近的可用性记录
    async fn list_recent(&self, limit: i64) -> DispatchResult<Vec<AvailabilityRecord>>;
}

/// 报价仓储抽象
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// 检查指定货单×司机在 since 之后是否已有报价
    async fn has_recent_offer(
        &self,
        shipment_id: Uuid,
        driver_id: Uuid,
        since: DateTime<Utc>,
    ) -> DispatchResult<bool>;

    /// 追加一条报价记录
    async fn create(&self, offer: &Offer) -> DispatchResult<Offer>;

    /// 追加一条评分审计记录
    async fn create_audit(&self, audit: &ScoreAudit) -> DispatchResult<ScoreAudit>;
}
