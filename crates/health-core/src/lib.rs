pub mod accounts;
pub mod api;
pub mod error;
pub mod filter;
pub mod pagination;

pub use accounts::AccountDirectory;
pub use api::{AffectedAccountsPage, EventQuery, HealthApi, OrganizationsApi};
pub use error::{HealthError, Result};
pub use filter::{suppressed, FilterConfig, SuppressionRule};
pub use pagination::{collect_items, paginate, Page, Paginated};
