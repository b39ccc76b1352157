//! Hostel repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use rust_decimal::Decimal;
use crate::models::hostel::{Hostel, CreateHostelRequest};
use crate::models::dashboard::FundsSnapshot;
use crate::utils::errors::HostelError;

const HOSTEL_COLUMNS: &str = "id, name, address, owner_id, total_funds, created_at, updated_at";

/// Recorded funds next to the sums of paid fees and expenses, per hostel
const FUNDS_SNAPSHOT_SQL: &str = r#"
    SELECT h.id AS hostel_id,
           h.name AS hostel_name,
           h.total_funds AS recorded_funds,
           COALESCE((SELECT SUM(f.paid_amount)
                     FROM student_fees f
                     JOIN students s ON s.id = f.student_id
                     WHERE s.hostel_id = h.id), 0) AS fees_collected,
           COALESCE((SELECT SUM(e.amount)
                     FROM expenses e
                     WHERE e.hostel_id = h.id), 0) AS expenses
    FROM hostels h
"#;

#[derive(Clone, Debug)]
pub struct HostelRepository {
    pool: PgPool,
}

impl HostelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new hostel with an empty balance
    pub async fn create(&self, request: &CreateHostelRequest) -> Result<Hostel, HostelError> {
        let hostel = sqlx::query_as::<_, Hostel>(&format!(
            r#"
            INSERT INTO hostels (name, address, owner_id, total_funds, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $4)
            RETURNING {}
            "#,
            HOSTEL_COLUMNS
        ))
        .bind(request.name.trim())
        .bind(request.address.trim())
        .bind(request.owner_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(hostel)
    }

    /// Find hostel by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Hostel>, HostelError> {
        let hostel = sqlx::query_as::<_, Hostel>(&format!(
            "SELECT {} FROM hostels WHERE id = $1",
            HOSTEL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hostel)
    }

    /// Lock the hostel row for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> Result<Hostel, HostelError> {
        sqlx::query_as::<_, Hostel>(&format!(
            "SELECT {} FROM hostels WHERE id = $1 FOR UPDATE",
            HOSTEL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| HostelError::not_found("Hostel", id))
    }

    /// Add `delta` (negative for money going out) to the hostel's funds
    pub async fn adjust_funds(&self, conn: &mut PgConnection, id: i64, delta: Decimal) -> Result<Hostel, HostelError> {
        sqlx::query_as::<_, Hostel>(&format!(
            r#"
            UPDATE hostels
            SET total_funds = total_funds + $2,
                updated_at = $3
            WHERE id = $1
            RETURNING {}
            "#,
            HOSTEL_COLUMNS
        ))
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| HostelError::from_numeric_overflow(e, || format!("Funds of hostel {} would leave the storable range", id)))?
        .ok_or_else(|| HostelError::not_found("Hostel", id))
    }

    /// Hostels owned by a user
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Hostel>, HostelError> {
        let hostels = sqlx::query_as::<_, Hostel>(&format!(
            "SELECT {} FROM hostels WHERE owner_id = $1 ORDER BY name ASC, id ASC",
            HOSTEL_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(hostels)
    }

    /// List all hostels
    pub async fn list(&self) -> Result<Vec<Hostel>, HostelError> {
        let hostels = sqlx::query_as::<_, Hostel>(&format!(
            "SELECT {} FROM hostels ORDER BY name ASC, id ASC",
            HOSTEL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(hostels)
    }

    /// Funds snapshot of one hostel
    pub async fn funds_snapshot(&self, id: i64) -> Result<Option<FundsSnapshot>, HostelError> {
        let snapshot = sqlx::query_as::<_, FundsSnapshot>(&format!("{} WHERE h.id = $1", FUNDS_SNAPSHOT_SQL))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(snapshot)
    }

    /// Funds snapshots of the given hostels
    pub async fn funds_snapshots(&self, hostel_ids: &[i64]) -> Result<Vec<FundsSnapshot>, HostelError> {
        let snapshots = sqlx::query_as::<_, FundsSnapshot>(&format!(
            "{} WHERE h.id = ANY($1) ORDER BY h.name ASC, h.id ASC",
            FUNDS_SNAPSHOT_SQL
        ))
        .bind(hostel_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(snapshots)
    }

    /// Funds snapshots of every hostel
    pub async fn all_funds_snapshots(&self) -> Result<Vec<FundsSnapshot>, HostelError> {
        let snapshots = sqlx::query_as::<_, FundsSnapshot>(&format!(
            "{} ORDER BY h.name ASC, h.id ASC",
            FUNDS_SNAPSHOT_SQL
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(snapshots)
    }
}
