//! 派单引擎端到端场景测试
//!
//! 使用内存仓储和记录型通知器驱动完整的派单周期；
//! 涉及报价间隔的用例在暂停的虚拟时钟下运行。

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use common::*;
use dispatch_core::config::MatchingConfig;
use dispatch_core::models::{AvailabilityRecord, Driver, OfferStatus, Shipment};
use dispatch_core::traits::OfferDispatchService;
use dispatch_matcher::OfferDispatchSequencer;

struct Harness {
    shipment_repo: Arc<MockShipmentRepository>,
    offer_repo: Arc<MockOfferRepository>,
    notifier: Arc<RecordingNotifier>,
    sequencer: OfferDispatchSequencer,
    shutdown_tx: watch::Sender<bool>,
}

fn harness(
    shipments: Vec<Shipment>,
    drivers: Vec<Driver>,
    availability: Vec<AvailabilityRecord>,
    offer_repo: MockOfferRepository,
    config: MatchingConfig,
) -> Harness {
    let shipment_repo = Arc::new(MockShipmentRepository::new(shipments));
    let driver_repo = Arc::new(MockDriverRepository::new(drivers));
    let availability_repo = Arc::new(MockAvailabilityRepository::new(availability));
    let offer_repo = Arc::new(offer_repo);
    let notifier = Arc::new(RecordingNotifier::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sequencer = OfferDispatchSequencer::new(
        shipment_repo.clone(),
        driver_repo,
        availability_repo,
        offer_repo.clone(),
        notifier.clone(),
        config,
        shutdown_rx,
    );

    Harness {
        shipment_repo,
        offer_repo,
        notifier,
        sequencer,
        shutdown_tx,
    }
}

#[tokio::test]
async fn test_cycle_without_drivers_creates_nothing() {
    let shipment = ShipmentBuilder::new().build();
    let h = harness(
        vec![shipment],
        vec![],
        vec![],
        MockOfferRepository::new(),
        MatchingConfig::default(),
    );

    let report = h.sequencer.run_cycle().await.unwrap();
    assert_eq!(report.offers_created, 0);
    assert_eq!(report.shipments_skipped, 1);
    assert_eq!(h.offer_repo.offer_count(), 0);
    assert_eq!(h.notifier.notification_count(), 0);
}

#[tokio::test]
async fn test_single_strong_candidate_gets_one_offer() {
    let shipment = ShipmentBuilder::new().build();
    let driver = DriverBuilder::new().build();
    let availability = AvailabilityBuilder::for_driver(driver.id).build();
    let h = harness(
        vec![shipment.clone()],
        vec![driver.clone()],
        vec![availability],
        MockOfferRepository::new(),
        MatchingConfig::default(),
    );

    let report = h.sequencer.run_cycle().await.unwrap();
    assert_eq!(report.offers_created, 1);
    assert_eq!(report.shipments_processed, 1);
    assert_eq!(report.failures, 0);

    let offers = h.offer_repo.offers.lock().unwrap();
    assert_eq!(offers.len(), 1);
    let offer = &offers[0];
    assert_eq!(offer.shipment_id, shipment.id);
    assert_eq!(offer.driver_id, driver.id);
    assert_eq!(offer.status, OfferStatus::Offered);
    assert!(offer.auto_generated);
    assert!(offer.score >= 80);
    drop(offers);

    assert_eq!(h.offer_repo.audit_count(), 1);
    assert_eq!(h.notifier.notification_count(), 1);
    let notifications = h.notifier.notifications.lock().unwrap();
    assert_eq!(notifications[0].driver.id, driver.id);
}

#[tokio::test]
async fn test_returning_neutral_candidate_is_filtered_out() {
    // 返程 3h、全中性画像的候选总分 56，低于默认门槛 70
    let shipment = ShipmentBuilder::new().build();
    let driver = DriverBuilder::new()
        .with_vehicle_type(None)
        .with_city(None)
        .with_completed_trips(0)
        .with_acceptance_rate(None)
        .with_approved(None)
        .build();
    let availability = AvailabilityBuilder::for_driver(driver.id)
        .returning_in_hours(3)
        .with_location(None)
        .build();
    let h = harness(
        vec![shipment],
        vec![driver],
        vec![availability],
        MockOfferRepository::new(),
        MatchingConfig::default(),
    );

    let report = h.sequencer.run_cycle().await.unwrap();
    assert_eq!(report.offers_created, 0);
    assert_eq!(report.shipments_skipped, 1);
    assert_eq!(h.notifier.notification_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_max_offers_cap_dispatches_only_best_candidate() {
    let shipment = ShipmentBuilder::new().build();
    let strong = DriverBuilder::new()
        .with_name("Forte")
        .with_completed_trips(120)
        .with_acceptance_rate(Some(90.0))
        .build();
    let weak = DriverBuilder::new()
        .with_name("Fraco")
        .with_approved(None)
        .build();
    let availability = vec![
        AvailabilityBuilder::for_driver(strong.id).build(),
        AvailabilityBuilder::for_driver(weak.id).build(),
    ];
    let config = MatchingConfig {
        max_offers_per_shipment: 1,
        ..MatchingConfig::default()
    };
    let h = harness(
        vec![shipment],
        vec![weak, strong.clone()],
        availability,
        MockOfferRepository::new(),
        config,
    );

    let started = tokio::time::Instant::now();
    let report = h.sequencer.run_cycle().await.unwrap();

    assert_eq!(report.offers_created, 1);
    let offers = h.offer_repo.offers.lock().unwrap();
    assert_eq!(offers[0].driver_id, strong.id);
    drop(offers);
    // 只派出一条报价，不应触发报价间隔
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_pacing_delay_between_consecutive_offers() {
    let shipment = ShipmentBuilder::new().build();
    let first = DriverBuilder::new().build();
    let second = DriverBuilder::new().build();
    let availability = vec![
        AvailabilityBuilder::for_driver(first.id).build(),
        AvailabilityBuilder::for_driver(second.id).build(),
    ];
    let h = harness(
        vec![shipment],
        vec![first, second],
        availability,
        MockOfferRepository::new(),
        MatchingConfig::default(),
    );

    let started = tokio::time::Instant::now();
    let report = h.sequencer.run_cycle().await.unwrap();

    assert_eq!(report.offers_created, 2);
    assert_eq!(h.notifier.notification_count(), 2);
    // 两条报价之间必须隔满配置的 5 分钟
    assert!(started.elapsed() >= Duration::from_secs(300));
}

#[tokio::test]
async fn test_recent_offer_suppresses_duplicate() {
    let shipment = ShipmentBuilder::new().build();
    let driver = DriverBuilder::new().build();
    let availability = AvailabilityBuilder::for_driver(driver.id).build();
    let offer_repo =
        MockOfferRepository::new().with_existing_offer(seed_offer(shipment.id, driver.id));
    let h = harness(
        vec![shipment],
        vec![driver],
        vec![availability],
        offer_repo,
        MatchingConfig::default(),
    );

    let report = h.sequencer.run_cycle().await.unwrap();
    assert_eq!(report.offers_created, 0);
    assert_eq!(report.candidates_deduped, 1);
    assert_eq!(h.offer_repo.offer_count(), 1);
    assert_eq!(h.notifier.notification_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_deduplicated_candidate_skips_pacing() {
    let shipment = ShipmentBuilder::new().build();
    let strong = DriverBuilder::new()
        .with_completed_trips(120)
        .with_acceptance_rate(Some(90.0))
        .build();
    let other = DriverBuilder::new().build();
    let availability = vec![
        AvailabilityBuilder::for_driver(strong.id).build(),
        AvailabilityBuilder::for_driver(other.id).build(),
    ];
    // 排名第一的候选已有近期报价，第二个候选成为唯一实际派发
    let offer_repo =
        MockOfferRepository::new().with_existing_offer(seed_offer(shipment.id, strong.id));
    let h = harness(
        vec![shipment],
        vec![strong, other],
        availability,
        offer_repo,
        MatchingConfig::default(),
    );

    let started = tokio::time::Instant::now();
    let report = h.sequencer.run_cycle().await.unwrap();

    assert_eq!(report.offers_created, 1);
    assert_eq!(report.candidates_deduped, 1);
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let shipment = ShipmentBuilder::new().build();
    let driver = DriverBuilder::new().build();
    let availability = AvailabilityBuilder::for_driver(driver.id).build();
    let h = harness(
        vec![shipment],
        vec![driver],
        vec![availability],
        MockOfferRepository::new(),
        MatchingConfig::default(),
    );

    let first = h.sequencer.run_cycle().await.unwrap();
    assert_eq!(first.offers_created, 1);
    assert_eq!(h.offer_repo.offer_count(), 1);

    let second = h.sequencer.run_cycle().await.unwrap();
    assert_eq!(second.offers_created, 0);
    assert_eq!(second.candidates_deduped, 1);
    assert_eq!(h.offer_repo.offer_count(), 1);
    assert_eq!(h.notifier.notification_count(), 1);
}

#[tokio::test]
async fn test_notification_failure_keeps_offer() {
    let shipment = ShipmentBuilder::new().build();
    let driver = DriverBuilder::new().build();
    let availability = AvailabilityBuilder::for_driver(driver.id).build();
    let h = harness(
        vec![shipment],
        vec![driver],
        vec![availability],
        MockOfferRepository::new(),
        MatchingConfig::default(),
    );
    h.notifier.fail_next();

    let report = h.sequencer.run_cycle().await.unwrap();
    // 通知失败不回滚报价，也不算派单失败
    assert_eq!(report.offers_created, 1);
    assert_eq!(report.failures, 0);
    assert_eq!(h.offer_repo.offer_count(), 1);
    assert_eq!(h.notifier.notification_count(), 0);
}

#[tokio::test]
async fn test_shipment_read_failure_aborts_cycle_quietly() {
    let h = harness(
        vec![ShipmentBuilder::new().build()],
        vec![DriverBuilder::new().build()],
        vec![],
        MockOfferRepository::new(),
        MatchingConfig::default(),
    );
    h.shipment_repo.fail_reads();

    let report = h.sequencer.run_cycle().await.unwrap();
    assert_eq!(report.failures, 1);
    assert_eq!(report.offers_created, 0);
    assert_eq!(h.offer_repo.offer_count(), 0);
}

#[tokio::test]
async fn test_offer_write_failure_only_kills_that_candidate() {
    let shipment = ShipmentBuilder::new().build();
    let driver = DriverBuilder::new().build();
    let availability = AvailabilityBuilder::for_driver(driver.id).build();
    let h = harness(
        vec![shipment],
        vec![driver],
        vec![availability],
        MockOfferRepository::new(),
        MatchingConfig::default(),
    );
    h.offer_repo.fail_writes();

    let report = h.sequencer.run_cycle().await.unwrap();
    assert_eq!(report.failures, 1);
    assert_eq!(report.shipments_processed, 1);
    assert_eq!(h.offer_repo.offer_count(), 0);
    assert_eq!(h.notifier.notification_count(), 0);
}

#[tokio::test]
async fn test_stale_shipments_outside_lookback_are_ignored() {
    let stale = ShipmentBuilder::new()
        .with_created_at(Utc::now() - chrono::Duration::hours(2))
        .build();
    let driver = DriverBuilder::new().build();
    let availability = AvailabilityBuilder::for_driver(driver.id).build();
    let h = harness(
        vec![stale],
        vec![driver],
        vec![availability],
        MockOfferRepository::new(),
        MatchingConfig::default(),
    );

    let report = h.sequencer.run_cycle().await.unwrap();
    assert_eq!(report.shipments_processed, 0);
    assert_eq!(h.offer_repo.offer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_pacing() {
    let shipment = ShipmentBuilder::new().build();
    let first = DriverBuilder::new().build();
    let second = DriverBuilder::new().build();
    let availability = vec![
        AvailabilityBuilder::for_driver(first.id).build(),
        AvailabilityBuilder::for_driver(second.id).build(),
    ];
    let h = harness(
        vec![shipment],
        vec![first, second],
        availability,
        MockOfferRepository::new(),
        MatchingConfig::default(),
    );

    // 第一条报价落库后进入报价间隔时触发关闭
    let shutdown_tx = h.shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        let _ = shutdown_tx.send(true);
    });

    let report = h.sequencer.run_cycle().await.unwrap();
    assert!(report.interrupted);
    assert_eq!(report.offers_created, 1);
    assert_eq!(h.offer_repo.offer_count(), 1);
}
