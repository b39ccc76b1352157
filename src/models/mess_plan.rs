//! Mess plan model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::{Result, ValidationErrors};
use crate::utils::helpers::is_valid_period;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessPlan {
    pub id: i64,
    pub hostel_id: i64,
    pub month: String,
    /// Path of the stored PDF, relative to the media root
    pub pdf_path: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Uploaded monthly menu
#[derive(Debug, Clone)]
pub struct UploadMessPlanRequest {
    pub month: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadMessPlanRequest {
    pub fn validate(&self, max_upload_bytes: u64) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if !is_valid_period(self.month.trim()) {
            errors.add("month", "Month must be in YYYY-MM format.");
        }
        if !self.file_name.to_ascii_lowercase().ends_with(".pdf") {
            errors.add("pdf_file", "File must be a PDF.");
        }
        if self.content.is_empty() {
            errors.add("pdf_file", "The submitted file is empty.");
        } else if self.content.len() as u64 > max_upload_bytes {
            errors.add("pdf_file", format!("File cannot exceed {} bytes.", max_upload_bytes));
        }
        errors.into_result()
    }
}
