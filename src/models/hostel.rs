//! Hostel model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use crate::utils::errors::{Result, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hostel {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub owner_id: i64,
    /// Running balance: paid fees minus expenses
    pub total_funds: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHostelRequest {
    pub name: String,
    pub address: String,
    pub owner_id: i64,
}

impl CreateHostelRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Hostel name is required.");
        } else if self.name.chars().count() > 100 {
            errors.add("name", "Hostel name cannot exceed 100 characters.");
        }
        if self.address.trim().is_empty() {
            errors.add("address", "Address is required.");
        }
        errors.into_result()
    }
}
