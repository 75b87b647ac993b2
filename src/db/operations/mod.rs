pub mod review_logs;
pub mod vocabularies;

pub use review_logs::PgEventStore;
pub use vocabularies::PgCatalog;
