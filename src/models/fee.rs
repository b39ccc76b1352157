//! Fee type and student fee models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::fmt;
use crate::utils::errors::{Result, ValidationErrors};
use crate::utils::helpers::{is_valid_money, is_valid_period, to_money};
use super::UnknownVariant;

/// How often a fee type falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Periodicity {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "one-time")]
    OneTime,
}

impl Periodicity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Periodicity::Monthly => "monthly",
            Periodicity::OneTime => "one-time",
        }
    }

    pub fn requires_period(&self) -> bool {
        matches!(self, Periodicity::Monthly)
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Periodicity {
    type Error = UnknownVariant;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "monthly" => Ok(Periodicity::Monthly),
            "one-time" => Ok(Periodicity::OneTime),
            _ => Err(UnknownVariant::new("periodicity", value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeeType {
    pub id: i64,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub periodicity: Periodicity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeeTypeRequest {
    pub name: String,
    pub periodicity: Periodicity,
}

impl CreateFeeTypeRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Fee type name is required.");
        } else if self.name.chars().count() > 100 {
            errors.add("name", "Fee type name cannot exceed 100 characters.");
        }
        errors.into_result()
    }
}

/// One ledger line: what a student owes and has paid for a fee type and period
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentFee {
    pub id: i64,
    pub student_id: i64,
    pub fee_type_id: i64,
    pub period: Option<String>,
    pub due_amount: Decimal,
    pub paid_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentFee {
    pub fn outstanding(&self) -> Decimal {
        (self.due_amount - self.paid_amount).max(Decimal::ZERO)
    }
}

/// A fee line joined with its student and fee type, for dashboards
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeeLine {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub hostel_id: i64,
    pub fee_type_id: i64,
    pub fee_type_name: String,
    pub period: Option<String>,
    pub due_amount: Decimal,
    pub paid_amount: Decimal,
}

impl FeeLine {
    pub fn outstanding(&self) -> Decimal {
        (self.due_amount - self.paid_amount).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeeRequest {
    pub student_id: i64,
    pub fee_type_id: i64,
    pub due_amount: Decimal,
    pub paid_amount: Decimal,
    pub period: Option<String>,
}

/// Edit of an existing fee line; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFeeRequest {
    pub due_amount: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
}

/// Amounts and period of a fee line after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFeeLine {
    pub due_amount: Decimal,
    pub paid_amount: Decimal,
    pub period: Option<String>,
}

/// Check a fee line against the rules for its fee type
///
/// Paid may never exceed due, amounts carry at most two decimals, and monthly
/// fee types need a `YYYY-MM` period. Blank periods count as absent.
pub fn validate_fee_line(
    periodicity: Periodicity,
    due_amount: Decimal,
    paid_amount: Decimal,
    period: Option<&str>,
) -> Result<ValidatedFeeLine> {
    let mut errors = ValidationErrors::new();

    if !is_valid_money(due_amount) {
        errors.add("due_amount", "Due amount must be between 0 and 99,999,999.99 with at most two decimals.");
    }
    if !is_valid_money(paid_amount) {
        errors.add("paid_amount", "Paid amount must be between 0 and 99,999,999.99 with at most two decimals.");
    } else if paid_amount > due_amount {
        errors.add("paid_amount", "Paid amount cannot exceed due amount.");
    }

    let period = period.map(str::trim).filter(|p| !p.is_empty());
    match period {
        None if periodicity.requires_period() => {
            errors.add("period", "Period (YYYY-MM) is required for monthly fees.");
        }
        Some(value) if !is_valid_period(value) => {
            errors.add("period", "Period must be in YYYY-MM format.");
        }
        _ => {}
    }

    errors.into_result()?;

    Ok(ValidatedFeeLine {
        due_amount: to_money(due_amount),
        paid_amount: to_money(paid_amount),
        period: period.map(str::to_string),
    })
}

impl CreateFeeRequest {
    pub fn validate(&self, periodicity: Periodicity) -> Result<ValidatedFeeLine> {
        validate_fee_line(periodicity, self.due_amount, self.paid_amount, self.period.as_deref())
    }
}

impl UpdateFeeRequest {
    /// Merge the edit over the stored line and validate the result
    pub fn apply_to(&self, current: &StudentFee, periodicity: Periodicity) -> Result<ValidatedFeeLine> {
        validate_fee_line(
            periodicity,
            self.due_amount.unwrap_or(current.due_amount),
            self.paid_amount.unwrap_or(current.paid_amount),
            current.period.as_deref(),
        )
    }
}

/// Itemized fee status shown per student: security, seat and mess
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeStatus {
    pub security: Option<FeeLine>,
    pub seat: Option<FeeLine>,
    pub mess: Option<FeeLine>,
}

impl FeeStatus {
    /// First line of each well-known fee type, matched case-insensitively
    pub fn from_lines(lines: &[FeeLine]) -> Self {
        let find = |name: &str| {
            lines
                .iter()
                .find(|line| line.fee_type_name.eq_ignore_ascii_case(name))
                .cloned()
        };
        Self {
            security: find("security"),
            seat: find("seat"),
            mess: find("mess"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::HostelError;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn field_errors(result: Result<ValidatedFeeLine>) -> ValidationErrors {
        match result {
            Err(HostelError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_paid_above_due_rejected() {
        let errors = field_errors(validate_fee_line(Periodicity::OneTime, dec("1000"), dec("1000.01"), None));
        assert_eq!(errors.for_field("paid_amount"), vec!["Paid amount cannot exceed due amount."]);
    }

    #[test]
    fn test_monthly_requires_period() {
        let errors = field_errors(validate_fee_line(Periodicity::Monthly, dec("500"), dec("0"), None));
        assert!(errors.has_field("period"));

        let errors = field_errors(validate_fee_line(Periodicity::Monthly, dec("500"), dec("0"), Some("  ")));
        assert!(errors.has_field("period"));

        let line = validate_fee_line(Periodicity::Monthly, dec("500"), dec("0"), Some("2024-05")).unwrap();
        assert_eq!(line.period.as_deref(), Some("2024-05"));
    }

    #[test]
    fn test_one_time_never_requires_period() {
        let line = validate_fee_line(Periodicity::OneTime, dec("5000"), dec("5000"), None).unwrap();
        assert_eq!(line.period, None);

        let line = validate_fee_line(Periodicity::OneTime, dec("5000"), dec("0"), Some("")).unwrap();
        assert_eq!(line.period, None);
    }

    #[test]
    fn test_malformed_period_rejected_for_any_periodicity() {
        let errors = field_errors(validate_fee_line(Periodicity::OneTime, dec("10"), dec("5"), Some("May 2024")));
        assert_eq!(errors.for_field("period"), vec!["Period must be in YYYY-MM format."]);
    }

    #[test]
    fn test_amounts_are_pinned_to_two_decimals() {
        let line = validate_fee_line(Periodicity::OneTime, dec("1000"), dec("600.5"), None).unwrap();
        assert_eq!(line.paid_amount.to_string(), "600.50");
        assert_eq!(line.due_amount.to_string(), "1000.00");

        let errors = field_errors(validate_fee_line(Periodicity::OneTime, dec("10.001"), dec("-1"), None));
        assert!(errors.has_field("due_amount"));
        assert!(errors.has_field("paid_amount"));
    }

    #[test]
    fn test_amounts_above_column_range_rejected() {
        let errors = field_errors(validate_fee_line(Periodicity::OneTime, dec("100000000"), dec("0"), None));
        assert!(errors.has_field("due_amount"));
        assert!(!errors.has_field("paid_amount"));

        let line = validate_fee_line(Periodicity::OneTime, dec("99999999.99"), dec("99999999.99"), None).unwrap();
        assert_eq!(line.paid_amount, dec("99999999.99"));
    }

    #[test]
    fn test_update_merges_over_stored_values() {
        let stored = StudentFee {
            id: 1,
            student_id: 1,
            fee_type_id: 1,
            period: Some("2024-05".to_string()),
            due_amount: dec("1000"),
            paid_amount: dec("600"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let edit = UpdateFeeRequest { due_amount: None, paid_amount: Some(dec("900")) };
        let line = edit.apply_to(&stored, Periodicity::Monthly).unwrap();
        assert_eq!(line.paid_amount, dec("900"));
        assert_eq!(line.due_amount, dec("1000"));

        let lowered_due = UpdateFeeRequest { due_amount: Some(dec("500")), paid_amount: None };
        assert!(lowered_due.apply_to(&stored, Periodicity::Monthly).is_err());
    }

    #[test]
    fn test_fee_status_picks_known_types() {
        let line = |id: i64, name: &str| FeeLine {
            id,
            student_id: 1,
            student_name: "Ayesha".to_string(),
            hostel_id: 1,
            fee_type_id: id,
            fee_type_name: name.to_string(),
            period: None,
            due_amount: dec("100"),
            paid_amount: dec("40"),
        };
        let status = FeeStatus::from_lines(&[line(1, "Security"), line(2, "mess"), line(3, "laundry")]);
        assert_eq!(status.security.map(|l| l.id), Some(1));
        assert_eq!(status.mess.map(|l| l.id), Some(2));
        assert!(status.seat.is_none());
        assert_eq!(line(4, "seat").outstanding(), dec("60"));
    }
}
