pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::{
    AppConfig, DatabaseConfig, MatchingConfig, ObservabilityConfig, WebhookConfig,
};
pub use errors::{DispatchError, DispatchResult};
pub use models::{
    latest_per_driver, AvailabilityRecord, AvailabilityState, CompatibilityScore,
    CompatibilityTier, Driver, DriverStatus, Offer, OfferStatus, ScoreAudit, ScoreBreakdown,
    ScoreJustification, Shipment, ShipmentStatus, UrgencyLevel,
};
pub use traits::{
    AvailabilityRepository, CycleReport, DriverRepository, OfferDispatchService,
    OfferNotification, OfferNotifier, OfferRepository, ShipmentRepository,
};
