//! View state for the dashboard's pages.
//!
//! Each page owns its own search/pagination/selection state and expresses
//! fetches as [`crate::query::QueryKey`]s; every data region renders exactly
//! one of loading, error, or populated.

pub mod dashboard;
pub mod detail;
pub mod list;
pub mod risk;

pub use dashboard::DashboardPage;
pub use detail::{AgencyDetailPage, VendorDetailPage};
pub use list::{ListPage, ListResource};
pub use risk::RiskPage;
