//! Fee type and student fee repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::fee::{CreateFeeTypeRequest, FeeLine, FeeType, StudentFee, ValidatedFeeLine};
use crate::utils::errors::HostelError;

const FEE_COLUMNS: &str = "id, student_id, fee_type_id, period, due_amount, paid_amount, created_at, updated_at";

const DUPLICATE_LINE: &str = "A fee of this type is already recorded for the student and period.";

/// Fee lines joined with their student and fee type names
const FEE_LINE_SQL: &str = r#"
    SELECT f.id,
           f.student_id,
           s.name AS student_name,
           s.hostel_id,
           f.fee_type_id,
           t.name AS fee_type_name,
           f.period,
           f.due_amount,
           f.paid_amount
    FROM student_fees f
    JOIN students s ON s.id = f.student_id
    JOIN fee_types t ON t.id = f.fee_type_id
"#;

#[derive(Clone, Debug)]
pub struct FeeRepository {
    pool: PgPool,
}

impl FeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Fee types

    pub async fn create_fee_type(&self, request: &CreateFeeTypeRequest) -> Result<FeeType, HostelError> {
        let fee_type = sqlx::query_as::<_, FeeType>(
            "INSERT INTO fee_types (name, periodicity) VALUES ($1, $2) RETURNING id, name, periodicity"
        )
        .bind(request.name.trim())
        .bind(request.periodicity.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(fee_type)
    }

    pub async fn find_fee_type(&self, id: i64) -> Result<Option<FeeType>, HostelError> {
        let fee_type = sqlx::query_as::<_, FeeType>("SELECT id, name, periodicity FROM fee_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(fee_type)
    }

    pub async fn list_fee_types(&self) -> Result<Vec<FeeType>, HostelError> {
        let fee_types = sqlx::query_as::<_, FeeType>("SELECT id, name, periodicity FROM fee_types ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(fee_types)
    }

    // Student fees

    /// Insert a validated fee line
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        student_id: i64,
        fee_type_id: i64,
        line: &ValidatedFeeLine,
    ) -> Result<StudentFee, HostelError> {
        let now = Utc::now();
        sqlx::query_as::<_, StudentFee>(&format!(
            r#"
            INSERT INTO student_fees (student_id, fee_type_id, period, due_amount, paid_amount, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            FEE_COLUMNS
        ))
        .bind(student_id)
        .bind(fee_type_id)
        .bind(line.period.as_deref())
        .bind(line.due_amount)
        .bind(line.paid_amount)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| HostelError::from_unique_violation(e, "fee_type", DUPLICATE_LINE))
    }

    /// Find fee line by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<StudentFee>, HostelError> {
        let fee = sqlx::query_as::<_, StudentFee>(&format!("SELECT {} FROM student_fees WHERE id = $1", FEE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(fee)
    }

    /// Lock a fee line for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> Result<StudentFee, HostelError> {
        sqlx::query_as::<_, StudentFee>(&format!("SELECT {} FROM student_fees WHERE id = $1 FOR UPDATE", FEE_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| HostelError::not_found("StudentFee", id))
    }

    /// Whether the student already has a line of this type for the period
    pub async fn line_exists(
        &self,
        conn: &mut PgConnection,
        student_id: i64,
        fee_type_id: i64,
        period: Option<&str>,
    ) -> Result<bool, HostelError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM student_fees
                WHERE student_id = $1
                  AND fee_type_id = $2
                  AND COALESCE(period, '') = COALESCE($3, '')
            )
            "#
        )
        .bind(student_id)
        .bind(fee_type_id)
        .bind(period)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }

    /// Overwrite the amounts of a line; the period is fixed at creation
    pub async fn update_amounts(&self, conn: &mut PgConnection, id: i64, line: &ValidatedFeeLine) -> Result<StudentFee, HostelError> {
        let fee = sqlx::query_as::<_, StudentFee>(&format!(
            r#"
            UPDATE student_fees
            SET due_amount = $2, paid_amount = $3, updated_at = $4
            WHERE id = $1
            RETURNING {}
            "#,
            FEE_COLUMNS
        ))
        .bind(id)
        .bind(line.due_amount)
        .bind(line.paid_amount)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(fee)
    }

    pub async fn delete(&self, conn: &mut PgConnection, id: i64) -> Result<(), HostelError> {
        sqlx::query("DELETE FROM student_fees WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Fee lines of one student, oldest first
    pub async fn lines_for_student(&self, student_id: i64) -> Result<Vec<FeeLine>, HostelError> {
        let lines = sqlx::query_as::<_, FeeLine>(&format!(
            "{} WHERE f.student_id = $1 ORDER BY f.created_at ASC, f.id ASC",
            FEE_LINE_SQL
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Fee lines of every student in the given hostels, oldest first
    pub async fn lines_for_hostels(&self, hostel_ids: &[i64]) -> Result<Vec<FeeLine>, HostelError> {
        let lines = sqlx::query_as::<_, FeeLine>(&format!(
            "{} WHERE s.hostel_id = ANY($1) ORDER BY f.created_at ASC, f.id ASC",
            FEE_LINE_SQL
        ))
        .bind(hostel_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}
