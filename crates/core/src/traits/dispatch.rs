use async_trait::async_trait;
use serde::Serialize;

use crate::errors::DispatchResult;

/// 一次派单周期的统计结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    /// 完成候选评估并走完派单流程的货单数
    pub shipments_processed: usize,
    /// 没有合格候选、被整单跳过的货单数
    pub shipments_skipped: usize,
    /// 实际创建的报价数
    pub offers_created: usize,
    /// 因去重窗口内已有报价而被跳过的候选数
    pub candidates_deduped: usize,
    /// 被吞掉并记录日志的局部失败数
    pub failures: usize,
    /// 周期是否因收到关闭信号而提前结束
    pub interrupted: bool,
}

/// 派单服务抽象
#[async_trait]
pub trait OfferDispatchService: Send + Sync {
    /// 执行一次完整的派单周期：拉取货单与司机、评分排序、
    /// 逐个创建报价并推送通知
    async fn run_cycle(&self) -> DispatchResult<CycleReport>;
}
