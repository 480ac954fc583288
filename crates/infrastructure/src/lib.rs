pub mod database;
pub mod webhook;

pub use database::postgres::{
    PostgresAvailabilityRepository, PostgresDriverRepository, PostgresOfferRepository,
    PostgresShipmentRepository,
};
pub use database::{create_pool, mask_database_url};
pub use webhook::WebhookNotifier;
