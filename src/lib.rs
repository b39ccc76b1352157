//! Hostel Ledger
//!
//! Back-office core for hostel management: a funds ledger that keeps each
//! hostel's balance equal to paid fees minus expenses, bed allocation with
//! one student per bed, and read projections for the student, warden, owner
//! and admin dashboards.

pub mod config;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{HostelError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::{AuthContext, ServiceFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
