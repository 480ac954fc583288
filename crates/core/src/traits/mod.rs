pub mod dispatch;
pub mod notifier;
pub mod repository;

pub use dispatch::{CycleReport, OfferDispatchService};
pub use notifier::{OfferNotification, OfferNotifier};
pub use repository::{
    AvailabilityRepository, DriverRepository, OfferRepository, ShipmentRepository,
};
