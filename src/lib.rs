pub mod bill;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod report;
pub mod session;

pub use bill::Bill;
pub use catalog::{load_catalog, Catalog, CatalogLoad, Item};
pub use config::{Config, DiscountPolicy};
pub use controller::Controller;
pub use error::{PosError, Result};
pub use report::{generate_revenue_report, DateRange, RevenueSummary};
pub use session::{PosSession, FIRST_PENDING_ID};
