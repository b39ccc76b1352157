//! System-wide counters for the admin dashboard

use sqlx::PgPool;
use crate::models::dashboard::SystemCounts;
use crate::models::user::RoleCount;
use crate::utils::errors::HostelError;

#[derive(Clone, Debug)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Row counts across the whole system
    pub async fn system_counts(&self) -> Result<SystemCounts, HostelError> {
        let counts = sqlx::query_as::<_, SystemCounts>(
            r#"
            SELECT (SELECT COUNT(*) FROM hostels) AS hostels,
                   (SELECT COUNT(*) FROM rooms) AS rooms,
                   (SELECT COUNT(*) FROM beds) AS beds,
                   (SELECT COUNT(*) FROM beds WHERE student_id IS NOT NULL) AS occupied_beds,
                   (SELECT COUNT(*) FROM students) AS students,
                   (SELECT COUNT(*) FROM users) AS users
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Number of accounts per role
    pub async fn users_by_role(&self) -> Result<Vec<RoleCount>, HostelError> {
        let counts = sqlx::query_as::<_, RoleCount>(
            "SELECT role, COUNT(*) AS count FROM users GROUP BY role ORDER BY role ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
