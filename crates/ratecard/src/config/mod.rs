pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str, MAX_PAGE_SIZE};
pub use schema::{ApiConfig, Config, DatabaseConfig, LoggingConfig, StorageConfig};
