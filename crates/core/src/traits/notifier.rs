use async_trait::async_trait;
use serde::Serialize;

use crate::errors::DispatchResult;
use crate::models::{CompatibilityScore, Driver, Shipment};

/// 单次报价的通知上下文
#[derive(Debug, Clone, Serialize)]
pub struct OfferNotification {
    pub shipment: Shipment,
    pub driver: Driver,
    pub score: CompatibilityScore,
}

/// 报价通知抽象
///
/// 把一条报价事件推送到外部消息渠道。实现方必须设置有界超时；
/// 失败只返回错误，由派单引擎记录日志后继续，不做重试。
#[async_trait]
pub trait OfferNotifier: Send + Sync {
    async fn notify(&self, notification: &OfferNotification) -> DispatchResult<()>;
}
