//! Expense and expense category models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use crate::utils::errors::{Result, ValidationErrors};
use crate::utils::helpers::{is_valid_money, normalize_whitespace, to_money};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseCategory {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub hostel_id: i64,
    pub category_id: Option<i64>,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub category_id: Option<i64>,
    pub description: String,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
}

/// Edit of an existing expense; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

/// Spend per category; `None` collects uncategorized expenses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryTotal {
    pub category: Option<String>,
    pub total: Decimal,
}

fn validate_amount(amount: Decimal, errors: &mut ValidationErrors) {
    if !is_valid_money(amount) {
        errors.add("amount", "Amount must be between 0 and 99,999,999.99 with at most two decimals.");
    }
}

fn validate_description(description: &str, errors: &mut ValidationErrors) {
    if description.trim().is_empty() {
        errors.add("description", "Description is required.");
    }
}

impl CreateExpenseRequest {
    /// Validate and normalize: amount pinned to two decimals, date defaults to today
    pub fn validate(&self) -> Result<CreateExpenseRequest> {
        let mut errors = ValidationErrors::new();
        validate_description(&self.description, &mut errors);
        validate_amount(self.amount, &mut errors);
        errors.into_result()?;

        Ok(CreateExpenseRequest {
            category_id: self.category_id,
            description: self.description.trim().to_string(),
            amount: to_money(self.amount),
            date: Some(self.date.unwrap_or_else(|| Utc::now().date_naive())),
        })
    }
}

impl UpdateExpenseRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if let Some(description) = &self.description {
            validate_description(description, &mut errors);
        }
        if let Some(amount) = self.amount {
            validate_amount(amount, &mut errors);
        }
        errors.into_result()
    }
}

/// Validate a category name and collapse inner whitespace
pub fn normalize_category_name(name: &str) -> Result<String> {
    let name = normalize_whitespace(name);
    let mut errors = ValidationErrors::new();
    if name.is_empty() {
        errors.add("name", "Category name is required.");
    } else if name.chars().count() > 100 {
        errors.add("name", "Category name cannot exceed 100 characters.");
    }
    errors.into_result()?;
    Ok(name)
}
