//! Hostel Ledger
//!
//! Main application entry point: prepares the database and audits hostel funds

use std::process::ExitCode;
use tracing::{error, info, warn};

use hostel_ledger::{
    config::Settings,
    database::{connection::{create_pool, run_migrations, DatabaseConfig}, DatabaseService},
    services::ServiceFactory,
    utils::{helpers::format_money, logging},
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", hostel_ledger::info());

    info!("Connecting to database...");
    let db_pool = create_pool(&DatabaseConfig::from(&settings.database)).await?;
    run_migrations(&db_pool).await?;

    let services = ServiceFactory::new(DatabaseService::new(db_pool), &settings);

    let health = services.health_check().await;
    if !health.is_healthy() {
        for issue in health.get_issues() {
            error!(issue = %issue, "Service unhealthy");
        }
        return Ok(ExitCode::FAILURE);
    }

    if !settings.ledger.audit_on_startup {
        info!("Funds audit disabled, database is ready");
        return Ok(ExitCode::SUCCESS);
    }

    let drifted = services.ledger_service.audit().await?;
    if drifted.is_empty() {
        info!("All hostel balances match their fee and expense lines");
        return Ok(ExitCode::SUCCESS);
    }

    for snapshot in &drifted {
        warn!(
            hostel_id = snapshot.hostel_id,
            hostel = %snapshot.hostel_name,
            recorded = %format_money(snapshot.recorded_funds),
            expected = %format_money(snapshot.expected_funds()),
            "Funds drift"
        );
    }
    error!(hostels = drifted.len(), "Funds audit found drift");
    Ok(ExitCode::FAILURE)
}
