//! Helper functions and utilities
//!
//! Format checks shared by the request validators, money helpers and a few
//! small conveniences for file handling.

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;
use uuid::Uuid;

/// Scale of every stored monetary value
pub const MONEY_SCALE: u32 = 2;

/// Largest fee or expense amount a `NUMERIC(10, 2)` column holds
// 99_999_999_99 at scale 2, built with the const constructor
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x540B_E3FF, 0x2, 0, false, 2);

/// Longest email address the students table stores
pub const MAX_EMAIL_LEN: usize = 254;

fn period_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}$").expect("valid period regex"))
}

fn cnic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{5}-\d{7}-\d$").expect("valid cnic regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+\d{10,15}$").expect("valid phone regex"))
}

/// `YYYY-MM`, month 01..=12
pub fn is_valid_period(period: &str) -> bool {
    if !period_regex().is_match(period) {
        return false;
    }
    matches!(period[5..].parse::<u32>(), Ok(1..=12))
}

/// National identity card number, `XXXXX-XXXXXXX-X`
pub fn is_valid_cnic(cnic: &str) -> bool {
    cnic_regex().is_match(cnic)
}

/// `+` followed by 10 to 15 digits
pub fn is_valid_emergency_contact(number: &str) -> bool {
    phone_regex().is_match(number)
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@') && email.contains('.') && email.len() > 5 && email.len() <= MAX_EMAIL_LEN
}

/// Validate phone number format (basic validation)
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
        && phone.len() >= 10
}

/// Month of `timestamp` as `YYYY-MM`
pub fn month_of(timestamp: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", timestamp.year(), timestamp.month())
}

/// Current month as `YYYY-MM`
pub fn current_month() -> String {
    month_of(Utc::now())
}

/// Non-negative, at most [`MAX_AMOUNT`] and representable with two decimal places
pub fn is_valid_money(amount: Decimal) -> bool {
    !amount.is_sign_negative() && amount <= MAX_AMOUNT && amount.normalize().scale() <= MONEY_SCALE
}

/// Pin a validated amount to the storage scale
pub fn to_money(amount: Decimal) -> Decimal {
    let mut value = amount.round_dp(MONEY_SCALE);
    value.rescale(MONEY_SCALE);
    value
}

/// Format an amount for display, always with two decimals
pub fn format_money(amount: Decimal) -> String {
    to_money(amount).to_string()
}

/// Generate a new UUID v4
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Sanitize filename for safe storage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
