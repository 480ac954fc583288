use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, watch};
use tracing::{error, info};

use dispatch_core::traits::OfferDispatchService;
use dispatch_core::AppConfig;
use dispatch_infrastructure::{
    create_pool, PostgresAvailabilityRepository, PostgresDriverRepository,
    PostgresOfferRepository, PostgresShipmentRepository, WebhookNotifier,
};
use dispatch_matcher::OfferDispatchSequencer;

/// 应用运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// 执行一次派单周期后退出，由外部调度器按周期拉起
    Once,
    /// 常驻进程，按固定间隔循环执行派单周期
    Serve,
}

/// 主应用程序
pub struct Application {
    config: AppConfig,
    mode: AppMode,
    sequencer: Arc<dyn OfferDispatchService>,
    /// 桥接给派单引擎的关闭信号
    shutdown_tx: watch::Sender<bool>,
}

impl Application {
    /// 创建新的应用实例
    pub async fn new(config: AppConfig, mode: AppMode) -> Result<Self> {
        info!("初始化派单系统，模式: {:?}", mode);

        let pool = create_pool(&config.database)
            .await
            .context("初始化数据库连接池失败")?;

        let shipment_repo = Arc::new(PostgresShipmentRepository::new(pool.clone()));
        let driver_repo = Arc::new(PostgresDriverRepository::new(pool.clone()));
        let availability_repo = Arc::new(PostgresAvailabilityRepository::new(pool.clone()));
        let offer_repo = Arc::new(PostgresOfferRepository::new(pool));

        let notifier = Arc::new(WebhookNotifier::new(&config.webhook)?);
        if config.webhook.url.is_none() {
            info!("未配置 webhook 地址，报价将只落库不推送");
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sequencer = Arc::new(OfferDispatchSequencer::new(
            shipment_repo,
            driver_repo,
            availability_repo,
            offer_repo,
            notifier,
            config.matching.clone(),
            shutdown_rx,
        ));

        Ok(Self {
            config,
            mode,
            sequencer,
            shutdown_tx,
        })
    }

    /// 运行应用程序
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        // 把全局关闭信号桥接到派单引擎的 watch 通道，
        // 报价间隔中的等待也能被及时打断
        {
            let watch_tx = self.shutdown_tx.clone();
            let mut rx = shutdown_rx.resubscribe();
            tokio::spawn(async move {
                let _ = rx.recv().await;
                let _ = watch_tx.send(true);
            });
        }

        match self.mode {
            AppMode::Once => self.run_once().await,
            AppMode::Serve => self.run_serve(shutdown_rx).await,
        }
    }

    /// 单次模式：跑一个完整周期后返回
    async fn run_once(&self) -> Result<()> {
        let report = self.sequencer.run_cycle().await?;
        info!(
            "派单周期结束: 处理 {} 票货单，创建报价 {} 条，失败 {} 次",
            report.shipments_processed, report.offers_created, report.failures
        );
        Ok(())
    }

    /// 常驻模式：间隔循环，周期之间天然串行，不会并发执行
    async fn run_serve(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let interval_seconds = self.config.matching.cycle_interval_seconds;
        info!("进入常驻模式，周期间隔: {}秒", interval_seconds);

        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.sequencer.run_cycle().await {
                        Ok(report) if report.interrupted => {
                            info!("派单周期被关闭信号打断");
                            break;
                        }
                        Ok(report) => {
                            info!(
                                "派单周期完成: 创建报价 {} 条，去重 {} 次，失败 {} 次",
                                report.offers_created, report.candidates_deduped, report.failures
                            );
                        }
                        Err(e) => {
                            error!("派单周期执行失败: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("常驻循环收到关闭信号");
                    break;
                }
            }
        }

        Ok(())
    }
}
