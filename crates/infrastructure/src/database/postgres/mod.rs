pub mod postgres_availability_repository;
pub mod postgres_driver_repository;
pub mod postgres_offer_repository;
pub mod postgres_shipment_repository;

pub use postgres_availability_repository::PostgresAvailabilityRepository;
pub use postgres_driver_repository::PostgresDriverRepository;
pub use postgres_offer_repository::PostgresOfferRepository;
pub use postgres_shipment_repository::PostgresShipmentRepository;
