//! User repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::user::{User, CreateUserRequest};
use crate::utils::errors::HostelError;

const USER_COLUMNS: &str = "id, username, password_hash, role, is_superuser, hostel_id, student_id, created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user; the password must already be hashed
    pub async fn create(&self, conn: &mut PgConnection, request: &CreateUserRequest, password_hash: &str) -> Result<User, HostelError> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password_hash, role, is_superuser, hostel_id, student_id, created_at, updated_at)
            VALUES ($1, $2, $3, FALSE, $4, $5, $6, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(request.username.trim())
        .bind(password_hash)
        .bind(request.role.as_str())
        .bind(request.hostel_id)
        .bind(request.student_id)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| HostelError::from_unique_violation(e, "username", "A user with that username already exists."))
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, HostelError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by login name
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, HostelError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, HostelError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username.trim())
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// List users with pagination
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, HostelError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Wardens assigned to any of the given hostels
    pub async fn wardens_for_hostels(&self, hostel_ids: &[i64]) -> Result<Vec<User>, HostelError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE role = 'Warden' AND hostel_id = ANY($1) ORDER BY username ASC",
            USER_COLUMNS
        ))
        .bind(hostel_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
