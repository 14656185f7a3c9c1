pub mod collector;

pub use collector::{HealthMetrics, CONTENT_TYPE, NAMESPACE};
