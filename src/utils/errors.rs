//! Error handling for the hostel back-office
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use std::fmt;
use thiserror::Error;

/// Main error type for hostel operations
#[derive(Error, Debug)]
pub enum HostelError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("No free bed in room {room_id}")]
    Capacity { room_id: i64 },

    #[error("Consistency violation: {0}")]
    Consistency(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

const UNIQUE_VIOLATION: &str = "23505";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

fn has_sqlstate(err: &sqlx::Error, code: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|found| found == code)
        .unwrap_or(false)
}

/// Result type alias for hostel operations
pub type Result<T> = std::result::Result<T, HostelError>;

/// Field-level validation messages, reported back to the form that produced them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages recorded against one field
    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Turn the collected messages into a result
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(HostelError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl HostelError {
    /// Single-field validation error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        HostelError::Validation(errors)
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        HostelError::NotFound { entity, id }
    }

    /// Map a unique-constraint violation onto a field error, pass anything else through
    pub fn from_unique_violation(err: sqlx::Error, field: &'static str, message: &str) -> Self {
        if has_sqlstate(&err, UNIQUE_VIOLATION) {
            HostelError::invalid(field, message)
        } else {
            HostelError::Database(err)
        }
    }

    /// Map a numeric overflow onto a consistency error, pass anything else through
    pub fn from_numeric_overflow(err: sqlx::Error, message: impl FnOnce() -> String) -> Self {
        if has_sqlstate(&err, NUMERIC_VALUE_OUT_OF_RANGE) {
            HostelError::Consistency(message())
        } else {
            HostelError::Database(err)
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            HostelError::Database(_) => false,
            HostelError::Migration(_) => false,
            HostelError::Validation(_) => true,
            HostelError::Capacity { .. } => true,
            HostelError::Consistency(_) => false,
            HostelError::NotFound { .. } => false,
            HostelError::PermissionDenied(_) => false,
            HostelError::Config(_) => false,
            HostelError::Io(_) => true,
            HostelError::PasswordHash(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HostelError::Database(_) => ErrorSeverity::Critical,
            HostelError::Migration(_) => ErrorSeverity::Critical,
            HostelError::Config(_) => ErrorSeverity::Critical,
            HostelError::PermissionDenied(_) => ErrorSeverity::Warning,
            HostelError::Consistency(_) => ErrorSeverity::Warning,
            HostelError::Capacity { .. } => ErrorSeverity::Info,
            HostelError::Validation(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
