//! Services module
//!
//! This module contains business logic services

pub mod admin;
pub mod allocation;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod ledger;
pub mod owner;
pub mod warden;

// Re-export commonly used services
pub use admin::AdminService;
pub use allocation::{plan_allocation, Allocation, AllocationPlan, AllocationService};
pub use auth::{AuthContext, AuthService};
pub use dashboard::DashboardService;
pub use documents::DocumentStore;
pub use ledger::{FundsMovement, LedgerService};
pub use owner::OwnerService;
pub use warden::{RoomWithBeds, StudentAccount, WardenService};

use crate::config::settings::Settings;
use crate::database::{health_check, DatabaseService};

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub db: DatabaseService,
    pub auth_service: AuthService,
    pub ledger_service: LedgerService,
    pub allocation_service: AllocationService,
    pub warden_service: WardenService,
    pub owner_service: OwnerService,
    pub admin_service: AdminService,
    pub dashboard_service: DashboardService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService, settings: &Settings) -> Self {
        let documents = DocumentStore::new(&settings.storage);
        let auth_service = AuthService::new(db.users.clone());
        let ledger_service = LedgerService::new(db.clone());
        let allocation_service = AllocationService::new(db.clone());
        let warden_service = WardenService::new(
            db.clone(),
            ledger_service.clone(),
            allocation_service.clone(),
            documents,
        );
        let owner_service = OwnerService::new(db.clone());
        let admin_service = AdminService::new(db.clone(), ledger_service.clone());
        let dashboard_service = DashboardService::new(db.clone());

        Self {
            db,
            auth_service,
            ledger_service,
            allocation_service,
            warden_service,
            owner_service,
            admin_service,
            dashboard_service,
        }
    }

    /// Health check for the services' shared database
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = health_check(self.db.pool()).await.is_ok();
        ServiceHealthStatus { database_healthy }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
}

impl ServiceHealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        issues
    }
}
