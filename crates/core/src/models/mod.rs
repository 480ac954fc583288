pub mod availability;
pub mod driver;
pub mod offer;
pub mod score;
pub mod shipment;

pub use availability::{latest_per_driver, AvailabilityRecord, AvailabilityState};
pub use driver::{Driver, DriverStatus};
pub use offer::{Offer, OfferStatus, ScoreAudit};
pub use score::{
    CompatibilityScore, CompatibilityTier, ScoreBreakdown, ScoreJustification,
    WEIGHT_AVAILABILITY, WEIGHT_COMMERCIAL, WEIGHT_EQUIPMENT, WEIGHT_HISTORY, WEIGHT_LOCATION,
};
pub use shipment::{Shipment, ShipmentStatus, UrgencyLevel};
