//! 派单引擎测试用的内存仓储与构造器

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use dispatch_core::models::{
    AvailabilityRecord, AvailabilityState, Driver, DriverStatus, Offer, ScoreAudit, Shipment,
    ShipmentStatus, UrgencyLevel,
};
use dispatch_core::traits::{
    AvailabilityRepository, DriverRepository, OfferNotification, OfferNotifier, OfferRepository,
    ShipmentRepository,
};
use dispatch_core::{DispatchError, DispatchResult};

pub struct MockShipmentRepository {
    shipments: Mutex<Vec<Shipment>>,
    fail_reads: AtomicBool,
}

impl MockShipmentRepository {
    pub fn new(shipments: Vec<Shipment>) -> Self {
        Self {
            shipments: Mutex::new(shipments),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ShipmentRepository for MockShipmentRepository {
    async fn list_pending(
        &self,
        created_after: Option<DateTime<Utc>>,
    ) -> DispatchResult<Vec<Shipment>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DispatchError::repository("simulated shipment read failure"));
        }
        let shipments = self.shipments.lock().unwrap();
        Ok(shipments
            .iter()
            .filter(|s| s.is_awaiting_dispatch())
            .filter(|s| created_after.map_or(true, |after| s.created_at >= after))
            .cloned()
            .collect())
    }
}

pub struct MockDriverRepository {
    drivers: Mutex<Vec<Driver>>,
}

impl MockDriverRepository {
    pub fn new(drivers: Vec<Driver>) -> Self {
        Self {
            drivers: Mutex::new(drivers),
        }
    }
}

#[async_trait]
impl DriverRepository for MockDriverRepository {
    async fn list_active(&self) -> DispatchResult<Vec<Driver>> {
        let drivers = self.drivers.lock().unwrap();
        Ok(drivers.iter().filter(|d| d.is_active()).cloned().collect())
    }
}

pub struct MockAvailabilityRepository {
    records: Mutex<Vec<AvailabilityRecord>>,
}

impl MockAvailabilityRepository {
    pub fn new(records: Vec<AvailabilityRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl AvailabilityRepository for MockAvailabilityRepository {
    async fn list_recent(&self, limit: i64) -> DispatchResult<Vec<AvailabilityRecord>> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit as usize);
        Ok(records)
    }
}

pub struct MockOfferRepository {
    pub offers: Mutex<Vec<Offer>>,
    pub audits: Mutex<Vec<ScoreAudit>>,
    fail_writes: AtomicBool,
}

impl MockOfferRepository {
    pub fn new() -> Self {
        Self {
            offers: Mutex::new(Vec::new()),
            audits: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn with_existing_offer(self, offer: Offer) -> Self {
        self.offers.lock().unwrap().push(offer);
        self
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn offer_count(&self) -> usize {
        self.offers.lock().unwrap().len()
    }

    pub fn audit_count(&self) -> usize {
        self.audits.lock().unwrap().len()
    }
}

#[async_trait]
impl OfferRepository for MockOfferRepository {
    async fn has_recent_offer(
        &self,
        shipment_id: Uuid,
        driver_id: Uuid,
        since: DateTime<Utc>,
    ) -> DispatchResult<bool> {
        let offers = self.offers.lock().unwrap();
        Ok(offers.iter().any(|o| {
            o.shipment_id == shipment_id && o.driver_id == driver_id && o.created_at >= since
        }))
    }

    async fn create(&self, offer: &Offer) -> DispatchResult<Offer> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DispatchError::repository("simulated offer write failure"));
        }
        self.offers.lock().unwrap().push(offer.clone());
        Ok(offer.clone())
    }

    async fn create_audit(&self, audit: &ScoreAudit) -> DispatchResult<ScoreAudit> {
        self.audits.lock().unwrap().push(audit.clone());
        Ok(audit.clone())
    }
}

pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<OfferNotification>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }
}

#[async_trait]
impl OfferNotifier for RecordingNotifier {
    async fn notify(&self, notification: &OfferNotification) -> DispatchResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::notification("simulated webhook failure"));
        }
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub struct ShipmentBuilder {
    shipment: Shipment,
}

impl ShipmentBuilder {
    pub fn new() -> Self {
        Self {
            shipment: Shipment {
                id: Uuid::new_v4(),
                origin: "Campinas".to_string(),
                destination: "Curitiba".to_string(),
                product: "soja a granel".to_string(),
                weight_kg: 10000.0,
                freight_value: Some(6500.0),
                pickup_date: Utc::now() + Duration::days(1),
                urgency: UrgencyLevel::Medium,
                status: ShipmentStatus::Pending,
                created_at: Utc::now(),
            },
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.shipment.created_at = created_at;
        self
    }

    pub fn build(self) -> Shipment {
        self.shipment
    }
}

pub struct DriverBuilder {
    driver: Driver,
}

impl DriverBuilder {
    pub fn new() -> Self {
        Self {
            driver: Driver {
                id: Uuid::new_v4(),
                name: "Motorista Teste".to_string(),
                phone: "+55 19 96666-0004".to_string(),
                city: Some("Campinas".to_string()),
                state: Some("SP".to_string()),
                status: DriverStatus::Active,
                vehicle_type: Some("graneleiro".to_string()),
                capacity_kg: Some(30000.0),
                completed_trips: 60,
                acceptance_rate: Some(85.0),
                known_destinations: vec![],
                approved: Some(true),
                created_at: Utc::now(),
            },
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.driver.name = name.to_string();
        self
    }

    pub fn with_completed_trips(mut self, trips: i32) -> Self {
        self.driver.completed_trips = trips;
        self
    }

    pub fn with_acceptance_rate(mut self, rate: Option<f64>) -> Self {
        self.driver.acceptance_rate = rate;
        self
    }

    pub fn with_approved(mut self, approved: Option<bool>) -> Self {
        self.driver.approved = approved;
        self
    }

    pub fn with_vehicle_type(mut self, vehicle_type: Option<&str>) -> Self {
        self.driver.vehicle_type = vehicle_type.map(|v| v.to_string());
        self
    }

    pub fn with_city(mut self, city: Option<&str>) -> Self {
        self.driver.city = city.map(|c| c.to_string());
        self
    }

    pub fn build(self) -> Driver {
        self.driver
    }
}

/// 预置一条已存在的报价，用于去重场景
pub fn seed_offer(shipment_id: Uuid, driver_id: Uuid) -> Offer {
    Offer {
        id: Uuid::new_v4(),
        shipment_id,
        driver_id,
        status: dispatch_core::models::OfferStatus::Offered,
        score: 90,
        justification: serde_json::json!({}),
        auto_generated: true,
        offered_at: Some(Utc::now()),
        response_at: None,
        created_at: Utc::now(),
    }
}

pub struct AvailabilityBuilder {
    record: AvailabilityRecord,
}

impl AvailabilityBuilder {
    pub fn for_driver(driver_id: Uuid) -> Self {
        Self {
            record: AvailabilityRecord {
                id: Uuid::new_v4(),
                driver_id,
                state: AvailabilityState::Available,
                available_at: None,
                latitude: None,
                longitude: None,
                location: Some("Campinas".to_string()),
                created_at: Utc::now(),
            },
        }
    }

    pub fn returning_in_hours(mut self, hours: i64) -> Self {
        self.record.state = AvailabilityState::Returning;
        self.record.available_at = Some(Utc::now() + Duration::hours(hours));
        self
    }

    pub fn with_location(mut self, location: Option<&str>) -> Self {
        self.record.location = location.map(|l| l.to_string());
        self
    }

    pub fn build(self) -> AvailabilityRecord {
        self.record
    }
}
