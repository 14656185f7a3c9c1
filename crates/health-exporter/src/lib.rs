pub mod api;
pub mod aws;
pub mod emitter;
pub mod exporter;
pub mod shutdown;
pub mod source;

pub use api::{create_router, AppState};
pub use emitter::Emitter;
pub use exporter::{HealthExporter, HealthExporterBuilder};
pub use shutdown::{ShutdownSignal, SignalHandler};
pub use source::{EventSource, ACCOUNT_BATCH_SIZE};
