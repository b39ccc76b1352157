//! Mess plan repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::mess_plan::MessPlan;
use crate::utils::errors::HostelError;

const MESS_PLAN_COLUMNS: &str = "id, hostel_id, month, pdf_path, uploaded_at";

#[derive(Clone, Debug)]
pub struct MessPlanRepository {
    pool: PgPool,
}

impl MessPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a stored plan document
    pub async fn create(&self, hostel_id: i64, month: &str, pdf_path: &str) -> Result<MessPlan, HostelError> {
        let plan = sqlx::query_as::<_, MessPlan>(&format!(
            r#"
            INSERT INTO mess_plans (hostel_id, month, pdf_path, uploaded_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            MESS_PLAN_COLUMNS
        ))
        .bind(hostel_id)
        .bind(month)
        .bind(pdf_path)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(plan)
    }

    /// Most recently uploaded plan of a hostel for a month
    pub async fn latest_for_month(&self, hostel_id: i64, month: &str) -> Result<Option<MessPlan>, HostelError> {
        let plan = sqlx::query_as::<_, MessPlan>(&format!(
            r#"
            SELECT {} FROM mess_plans
            WHERE hostel_id = $1 AND month = $2
            ORDER BY uploaded_at DESC, id DESC
            LIMIT 1
            "#,
            MESS_PLAN_COLUMNS
        ))
        .bind(hostel_id)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    /// Plans uploaded for a month across several hostels
    pub async fn for_hostels_in_month(&self, hostel_ids: &[i64], month: &str) -> Result<Vec<MessPlan>, HostelError> {
        let plans = sqlx::query_as::<_, MessPlan>(&format!(
            r#"
            SELECT {} FROM mess_plans
            WHERE hostel_id = ANY($1) AND month = $2
            ORDER BY hostel_id ASC, uploaded_at DESC, id DESC
            "#,
            MESS_PLAN_COLUMNS
        ))
        .bind(hostel_ids)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }
}
