//! Student repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::student::{Student, CreateStudentRequest};
use crate::models::dashboard::StudentPlacement;
use crate::utils::errors::HostelError;

const STUDENT_COLUMNS: &str = "id, hostel_id, room_id, bed_id, name, contact_number, email, enrollment_date, cnic, emergency_contact_number, created_at, updated_at";

const CNIC_TAKEN: &str = "A student with this CNIC already exists.";

#[derive(Clone, Debug)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a student in a hostel, without a room
    pub async fn create(&self, conn: &mut PgConnection, hostel_id: i64, request: &CreateStudentRequest) -> Result<Student, HostelError> {
        let now = Utc::now();
        sqlx::query_as::<_, Student>(&format!(
            r#"
            INSERT INTO students (hostel_id, name, contact_number, email, enrollment_date, cnic, emergency_contact_number, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(hostel_id)
        .bind(request.name.trim())
        .bind(request.contact_number())
        .bind(request.email())
        .bind(request.enrollment_date.unwrap_or_else(|| now.date_naive()))
        .bind(request.cnic())
        .bind(request.emergency_contact_number())
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| HostelError::from_unique_violation(e, "cnic", CNIC_TAKEN))
    }

    /// Find student by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Student>, HostelError> {
        let student = sqlx::query_as::<_, Student>(&format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(student)
    }

    /// Lock the student row for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> Result<Student, HostelError> {
        sqlx::query_as::<_, Student>(&format!("SELECT {} FROM students WHERE id = $1 FOR UPDATE", STUDENT_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| HostelError::not_found("Student", id))
    }

    /// Record the room and bed a student holds
    pub async fn set_placement(&self, conn: &mut PgConnection, id: i64, room_id: i64, bed_id: i64) -> Result<Student, HostelError> {
        let student = sqlx::query_as::<_, Student>(&format!(
            r#"
            UPDATE students
            SET room_id = $2, bed_id = $3, updated_at = $4
            WHERE id = $1
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(id)
        .bind(room_id)
        .bind(bed_id)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(student)
    }

    /// Replace the CNIC; `None` clears it
    pub async fn update_cnic(&self, id: i64, cnic: Option<&str>) -> Result<Student, HostelError> {
        sqlx::query_as::<_, Student>(&format!(
            "UPDATE students SET cnic = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .bind(cnic)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| HostelError::from_unique_violation(e, "cnic", CNIC_TAKEN))?
        .ok_or_else(|| HostelError::not_found("Student", id))
    }

    pub async fn update_emergency_contact(&self, id: i64, number: &str) -> Result<Student, HostelError> {
        sqlx::query_as::<_, Student>(&format!(
            "UPDATE students SET emergency_contact_number = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .bind(number)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HostelError::not_found("Student", id))
    }

    /// Whether another student already carries this CNIC
    pub async fn cnic_exists(&self, cnic: &str, except_id: Option<i64>) -> Result<bool, HostelError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM students WHERE cnic = $1 AND ($2::BIGINT IS NULL OR id <> $2))"
        )
        .bind(cnic)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Students of a hostel with their room and bed numbers
    pub async fn placements_for_hostel(&self, hostel_id: i64) -> Result<Vec<StudentPlacement>, HostelError> {
        let placements = sqlx::query_as::<_, StudentPlacement>(
            r#"
            SELECT s.id AS student_id,
                   s.name,
                   s.cnic,
                   s.room_id,
                   r.room_number,
                   s.bed_id,
                   b.bed_number
            FROM students s
            LEFT JOIN rooms r ON r.id = s.room_id
            LEFT JOIN beds b ON b.id = s.bed_id
            WHERE s.hostel_id = $1
            ORDER BY s.name ASC, s.id ASC
            "#
        )
        .bind(hostel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(placements)
    }
}
