pub mod account;
pub mod event;
pub mod window;

pub use account::OrganizationAccount;
pub use event::{
    AffectedResource, EventDetail, EventScope, EventStatus, HealthEvent, RawEventSummary,
};
pub use window::ScrapeWindow;
