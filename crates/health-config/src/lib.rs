pub mod error;
pub mod exporter;
pub mod loader;
pub mod settings;

pub use error::ConfigError;
pub use exporter::{ExporterConfig, NotificationSettings};
pub use loader::ConfigLoader;
pub use settings::{Settings, ALL_REGIONS};
