//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for ledger movements, bed allocations and staff actions.

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{HostelError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer when dropped, so the caller
/// keeps it alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "hostel-ledger.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| HostelError::Config(format!("Failed to install subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a change to a hostel's funds
pub fn log_funds_movement(hostel_id: i64, movement: &str, delta: Decimal, balance: Decimal) {
    info!(
        hostel_id = hostel_id,
        movement = movement,
        delta = %delta,
        balance = %balance,
        "Hostel funds updated"
    );
}

/// Log a bed assignment
pub fn log_allocation(student_id: i64, room_id: i64, bed_id: i64, released_bed_id: Option<i64>) {
    info!(
        student_id = student_id,
        room_id = room_id,
        bed_id = bed_id,
        released_bed_id = released_bed_id,
        "Bed allocated"
    );
}

/// Log warden/owner actions
pub fn log_staff_action(user_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        target = target,
        details = details,
        "Staff action performed"
    );
}

/// Log funds drift found by the audit
pub fn log_funds_drift(hostel_id: i64, recorded: Decimal, expected: Decimal) {
    warn!(
        hostel_id = hostel_id,
        recorded = %recorded,
        expected = %expected,
        "Hostel funds do not match ledger lines"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
