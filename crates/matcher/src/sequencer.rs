//! 报价派单引擎
//!
//! 唯一带副作用的组件：按周期拉取待派单货单和活跃司机，
//! 逐单评分排序，逐个候选落库报价并推送通知，相邻报价之间
//! 留出间隔避免司机同时收到多条竞争报价。
//! 所有局部失败就地吞掉并记录日志，一条坏数据不中断整个周期。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use dispatch_core::config::MatchingConfig;
use dispatch_core::models::{latest_per_driver, AvailabilityRecord, Offer, ScoreAudit, Shipment};
use dispatch_core::traits::{
    AvailabilityRepository, CycleReport, DriverRepository, OfferDispatchService,
    OfferNotification, OfferNotifier, OfferRepository, ShipmentRepository,
};
use dispatch_core::DispatchResult;

use crate::ranking::{rank_candidates, RankedCandidate};

/// 单个候选的处理结果
enum CandidateOutcome {
    /// 报价已落库（通知是否送达不影响该结论）
    Dispatched,
    /// 去重窗口内已有报价，跳过
    Deduplicated,
}

pub struct OfferDispatchSequencer {
    shipment_repo: Arc<dyn ShipmentRepository>,
    driver_repo: Arc<dyn DriverRepository>,
    availability_repo: Arc<dyn AvailabilityRepository>,
    offer_repo: Arc<dyn OfferRepository>,
    notifier: Arc<dyn OfferNotifier>,
    config: MatchingConfig,
    /// 关闭信号，在候选之间和货单之间检查
    shutdown: watch::Receiver<bool>,
}

impl OfferDispatchSequencer {
    pub fn new(
        shipment_repo: Arc<dyn ShipmentRepository>,
        driver_repo: Arc<dyn DriverRepository>,
        availability_repo: Arc<dyn AvailabilityRepository>,
        offer_repo: Arc<dyn OfferRepository>,
        notifier: Arc<dyn OfferNotifier>,
        config: MatchingConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            shipment_repo,
            driver_repo,
            availability_repo,
            offer_repo,
            notifier,
            config,
            shutdown,
        }
    }

    async fn fetch_latest_availability(
        &self,
    ) -> DispatchResult<HashMap<Uuid, AvailabilityRecord>> {
        let records = self
            .availability_repo
            .list_recent(self.config.availability_scan_limit)
            .await?;
        Ok(latest_per_driver(records))
    }

    /// 处理单个候选：去重检查 → 落库报价和审计 → 推送通知
    async fn dispatch_candidate(
        &self,
        shipment: &Shipment,
        candidate: &RankedCandidate,
    ) -> DispatchResult<CandidateOutcome> {
        let driver = &candidate.driver;
        let since = Utc::now() - self.config.dedup_window();

        if self
            .offer_repo
            .has_recent_offer(shipment.id, driver.id, since)
            .await?
        {
            debug!(
                "货单 {} × 司机 {} 在去重窗口内已有报价，跳过",
                shipment.id, driver.id
            );
            return Ok(CandidateOutcome::Deduplicated);
        }

        let offer = Offer::auto_offer(shipment.id, driver.id, &candidate.score)?;
        self.offer_repo.create(&offer).await?;

        let audit = ScoreAudit::from_score(shipment.id, driver.id, &candidate.score)?;
        self.offer_repo.create_audit(&audit).await?;

        info!(
            "为货单 {} 创建报价 {}，司机: {}，总分: {}",
            shipment.id, offer.id, driver.name, candidate.score.total
        );

        let notification = OfferNotification {
            shipment: shipment.clone(),
            driver: driver.clone(),
            score: candidate.score.clone(),
        };
        if let Err(e) = self.notifier.notify(&notification).await {
            // 报价已落库，通知失败不回滚也不重试
            warn!(
                "报价 {} 的通知推送失败，司机未必收到消息: {}",
                offer.id, e
            );
        }

        Ok(CandidateOutcome::Dispatched)
    }

    /// 报价间隔等待，可被关闭信号打断
    async fn pace_between_offers(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let pause = self.config.offer_interval();
        if pause.is_zero() {
            return false;
        }
        debug!("等待 {:?} 后派发下一条报价", pause);
        let sleep = tokio::time::sleep(pause);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                changed = shutdown.changed() => match changed {
                    Ok(()) if *shutdown.borrow() => return true,
                    Ok(()) => continue,
                    Err(_) => {
                        // 发送端已退出，老老实实把剩余的间隔睡完
                        sleep.as_mut().await;
                        return false;
                    }
                },
            }
        }
    }
}

#[async_trait]
impl OfferDispatchService for OfferDispatchSequencer {
    async fn run_cycle(&self) -> DispatchResult<CycleReport> {
        let started = Instant::now();
        let mut report = CycleReport::default();

        let created_after = Utc::now() - self.config.shipment_lookback();
        info!("开始扫描待派单货单");

        let shipments = match self.shipment_repo.list_pending(Some(created_after)).await {
            Ok(shipments) => shipments,
            Err(e) => {
                error!("获取待派单货单失败，本周期放弃: {}", e);
                report.failures += 1;
                return Ok(report);
            }
        };
        if shipments.is_empty() {
            info!("没有待派单的货单");
            return Ok(report);
        }

        let drivers = match self.driver_repo.list_active().await {
            Ok(drivers) => drivers,
            Err(e) => {
                error!("获取活跃司机失败，本周期放弃: {}", e);
                report.failures += 1;
                return Ok(report);
            }
        };
        let availability = match self.fetch_latest_availability().await {
            Ok(availability) => availability,
            Err(e) => {
                error!("获取司机可用性失败，本周期放弃: {}", e);
                report.failures += 1;
                return Ok(report);
            }
        };

        info!(
            "本周期待处理货单 {} 票，活跃司机 {} 名",
            shipments.len(),
            drivers.len()
        );

        let mut shutdown = self.shutdown.clone();
        'shipments: for shipment in &shipments {
            if *shutdown.borrow() {
                report.interrupted = true;
                break;
            }

            let candidates =
                rank_candidates(shipment, &drivers, &availability, &self.config, Utc::now());
            if candidates.is_empty() {
                debug!("货单 {} 没有合格候选，跳过", shipment.id);
                report.shipments_skipped += 1;
                continue;
            }

            info!(
                "货单 {} 进入派单，候选司机 {} 名",
                shipment.id,
                candidates.len()
            );

            for (index, candidate) in candidates.iter().enumerate() {
                if *shutdown.borrow() {
                    report.interrupted = true;
                    break 'shipments;
                }

                let dispatched = match self.dispatch_candidate(shipment, candidate).await {
                    Ok(CandidateOutcome::Dispatched) => {
                        report.offers_created += 1;
                        true
                    }
                    Ok(CandidateOutcome::Deduplicated) => {
                        report.candidates_deduped += 1;
                        false
                    }
                    Err(e) => {
                        error!(
                            "货单 {} × 司机 {} 派单失败: {}",
                            shipment.id, candidate.driver.id, e
                        );
                        report.failures += 1;
                        false
                    }
                };

                // 只有真正发出报价后才需要间隔；最后一个候选后不等待
                if dispatched
                    && index + 1 < candidates.len()
                    && self.pace_between_offers(&mut shutdown).await
                {
                    report.interrupted = true;
                    break 'shipments;
                }
            }

            report.shipments_processed += 1;
        }

        info!(
            "本周期派单完成: 处理 {} 票 / 跳过 {} 票，创建报价 {} 条，去重 {} 次，失败 {} 次，耗时 {:.2}s",
            report.shipments_processed,
            report.shipments_skipped,
            report.offers_created,
            report.candidates_deduped,
            report.failures,
            started.elapsed().as_secs_f64()
        );

        Ok(report)
    }
}
