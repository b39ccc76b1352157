//! Student model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use crate::utils::errors::{Result, ValidationErrors};
use crate::utils::helpers::{is_valid_cnic, is_valid_email, is_valid_emergency_contact, is_valid_phone};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub hostel_id: i64,
    pub room_id: Option<i64>,
    pub bed_id: Option<i64>,
    pub name: String,
    pub contact_number: String,
    pub email: String,
    pub enrollment_date: NaiveDate,
    pub cnic: Option<String>,
    pub emergency_contact_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Warden form registering a student in the warden's hostel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub cnic: Option<String>,
    pub emergency_contact_number: Option<String>,
}

/// Warden form creating a student login together with the student record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentAccountRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub enrollment_date: NaiveDate,
    pub cnic: String,
    pub emergency_contact_number: Option<String>,
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CreateStudentRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        validate_name(&self.name, &mut errors);
        validate_contact_fields(
            blank_to_none(&self.contact_number),
            blank_to_none(&self.email),
            blank_to_none(&self.emergency_contact_number),
            &mut errors,
        );
        if let Some(cnic) = blank_to_none(&self.cnic) {
            if !is_valid_cnic(cnic) {
                errors.add("cnic", "CNIC must be in XXXXX-XXXXXXX-X format.");
            }
        }
        errors.into_result()
    }

    pub fn cnic(&self) -> Option<&str> {
        blank_to_none(&self.cnic)
    }

    pub fn contact_number(&self) -> &str {
        blank_to_none(&self.contact_number).unwrap_or_default()
    }

    pub fn email(&self) -> &str {
        blank_to_none(&self.email).unwrap_or_default()
    }

    pub fn emergency_contact_number(&self) -> &str {
        blank_to_none(&self.emergency_contact_number).unwrap_or_default()
    }
}

impl CreateStudentAccountRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        validate_credentials(&self.username, &self.password, &mut errors);
        validate_name(&self.name, &mut errors);
        validate_contact_fields(
            blank_to_none(&self.contact_number),
            blank_to_none(&self.email),
            blank_to_none(&self.emergency_contact_number),
            &mut errors,
        );
        if !is_valid_cnic(self.cnic.trim()) {
            errors.add("cnic", "CNIC must be in XXXXX-XXXXXXX-X format.");
        }
        errors.into_result()
    }

    /// The student half of the form
    pub fn student_request(&self) -> CreateStudentRequest {
        CreateStudentRequest {
            name: self.name.clone(),
            contact_number: self.contact_number.clone(),
            email: self.email.clone(),
            enrollment_date: Some(self.enrollment_date),
            cnic: Some(self.cnic.trim().to_string()),
            emergency_contact_number: self.emergency_contact_number.clone(),
        }
    }
}

/// Validate a CNIC edit; blank clears the stored value
pub fn validate_cnic_update(cnic: Option<&str>) -> Result<Option<String>> {
    let cnic = cnic.map(str::trim).filter(|c| !c.is_empty());
    let mut errors = ValidationErrors::new();
    if let Some(value) = cnic {
        if !is_valid_cnic(value) {
            errors.add("cnic", "CNIC must be in XXXXX-XXXXXXX-X format.");
        }
    }
    errors.into_result()?;
    Ok(cnic.map(str::to_string))
}

/// Validate an emergency contact edit; blank clears the stored value
pub fn validate_emergency_contact_update(number: Option<&str>) -> Result<String> {
    let number = number.map(str::trim).unwrap_or_default();
    let mut errors = ValidationErrors::new();
    if !number.is_empty() && !is_valid_emergency_contact(number) {
        errors.add(
            "emergency_contact_number",
            "Emergency contact number must be in +XXXXXXXXXX format (10-15 digits).",
        );
    }
    errors.into_result()?;
    Ok(number.to_string())
}

pub(crate) fn validate_credentials(username: &str, password: &str, errors: &mut ValidationErrors) {
    let username = username.trim();
    if username.is_empty() {
        errors.add("username", "Username is required.");
    } else if username.chars().count() > 150 {
        errors.add("username", "Username cannot exceed 150 characters.");
    }
    if password.is_empty() {
        errors.add("password", "Password is required.");
    }
}

fn validate_name(name: &str, errors: &mut ValidationErrors) {
    let name = name.trim();
    if name.is_empty() {
        errors.add("name", "Name is required.");
    } else if name.chars().count() > 100 {
        errors.add("name", "Name cannot exceed 100 characters.");
    }
}

fn validate_contact_fields(
    contact_number: Option<&str>,
    email: Option<&str>,
    emergency_contact_number: Option<&str>,
    errors: &mut ValidationErrors,
) {
    if let Some(number) = contact_number {
        if number.len() > 15 || !is_valid_phone(number) {
            errors.add("contact_number", "Enter a valid contact number, e.g. +1234567890.");
        }
    }
    if let Some(email) = email {
        if !is_valid_email(email) {
            errors.add("email", "Enter a valid email address.");
        }
    }
    if let Some(number) = emergency_contact_number {
        if !is_valid_emergency_contact(number) {
            errors.add(
                "emergency_contact_number",
                "Emergency contact number must be in +XXXXXXXXXX format (10-15 digits).",
            );
        }
    }
}
