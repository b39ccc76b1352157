//! Room and bed repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::room::{Bed, CreateRoomRequest, Room, RoomOccupancy};
use crate::utils::errors::HostelError;

const ROOM_COLUMNS: &str = "id, hostel_id, room_number, bed_type, number_of_beds, created_at";
const BED_COLUMNS: &str = "id, room_id, bed_number, student_id";

#[derive(Clone, Debug)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a room; beds are added separately within the same transaction
    pub async fn create(&self, conn: &mut PgConnection, hostel_id: i64, request: &CreateRoomRequest) -> Result<Room, HostelError> {
        sqlx::query_as::<_, Room>(&format!(
            r#"
            INSERT INTO rooms (hostel_id, room_number, bed_type, number_of_beds, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ROOM_COLUMNS
        ))
        .bind(hostel_id)
        .bind(request.room_number.trim())
        .bind(request.bed_type.as_str())
        .bind(request.number_of_beds)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| HostelError::from_unique_violation(e, "room_number", "A room with this number already exists in the hostel."))
    }

    /// Insert an empty bed
    pub async fn create_bed(&self, conn: &mut PgConnection, room_id: i64, bed_number: i32) -> Result<Bed, HostelError> {
        let bed = sqlx::query_as::<_, Bed>(&format!(
            "INSERT INTO beds (room_id, bed_number) VALUES ($1, $2) RETURNING {}",
            BED_COLUMNS
        ))
        .bind(room_id)
        .bind(bed_number)
        .fetch_one(&mut *conn)
        .await?;

        Ok(bed)
    }

    /// Find room by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Room>, HostelError> {
        let room = sqlx::query_as::<_, Room>(&format!("SELECT {} FROM rooms WHERE id = $1", ROOM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(room)
    }

    /// Lock room rows in ascending id order; serializes allocations touching them
    pub async fn lock_rooms(&self, conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Room>, HostelError> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {} FROM rooms WHERE id = ANY($1) ORDER BY id ASC FOR UPDATE",
            ROOM_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rooms)
    }

    /// Beds of a room, lowest bed number first
    pub async fn beds_for_room(&self, room_id: i64) -> Result<Vec<Bed>, HostelError> {
        let beds = sqlx::query_as::<_, Bed>(&format!(
            "SELECT {} FROM beds WHERE room_id = $1 ORDER BY bed_number ASC, id ASC",
            BED_COLUMNS
        ))
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(beds)
    }

    /// Beds of the given rooms, locked in ascending id order
    pub async fn lock_beds_for_rooms(&self, conn: &mut PgConnection, room_ids: &[i64]) -> Result<Vec<Bed>, HostelError> {
        let beds = sqlx::query_as::<_, Bed>(&format!(
            "SELECT {} FROM beds WHERE room_id = ANY($1) ORDER BY id ASC FOR UPDATE",
            BED_COLUMNS
        ))
        .bind(room_ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(beds)
    }

    /// Find bed by ID
    pub async fn find_bed(&self, bed_id: i64) -> Result<Option<Bed>, HostelError> {
        let bed = sqlx::query_as::<_, Bed>(&format!("SELECT {} FROM beds WHERE id = $1", BED_COLUMNS))
            .bind(bed_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(bed)
    }

    /// Point a bed at a student, or clear it
    pub async fn set_bed_student(&self, conn: &mut PgConnection, bed_id: i64, student_id: Option<i64>) -> Result<Bed, HostelError> {
        let bed = sqlx::query_as::<_, Bed>(&format!(
            "UPDATE beds SET student_id = $2 WHERE id = $1 RETURNING {}",
            BED_COLUMNS
        ))
        .bind(bed_id)
        .bind(student_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(bed)
    }

    /// Rooms of a hostel that still have a free bed
    pub async fn rooms_with_free_beds(&self, hostel_id: i64) -> Result<Vec<Room>, HostelError> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            r#"
            SELECT {} FROM rooms r
            WHERE r.hostel_id = $1
              AND EXISTS (SELECT 1 FROM beds b WHERE b.room_id = r.id AND b.student_id IS NULL)
            ORDER BY r.room_number ASC, r.id ASC
            "#,
            "r.id, r.hostel_id, r.room_number, r.bed_type, r.number_of_beds, r.created_at"
        ))
        .bind(hostel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Occupied and total beds per room for the given hostels
    pub async fn occupancy_for_hostels(&self, hostel_ids: &[i64]) -> Result<Vec<RoomOccupancy>, HostelError> {
        let occupancy = sqlx::query_as::<_, RoomOccupancy>(
            r#"
            SELECT h.id AS hostel_id,
                   h.name AS hostel_name,
                   r.id AS room_id,
                   r.room_number,
                   COUNT(b.id) AS total_beds,
                   COUNT(b.student_id) AS occupied
            FROM rooms r
            JOIN hostels h ON h.id = r.hostel_id
            LEFT JOIN beds b ON b.room_id = r.id
            WHERE r.hostel_id = ANY($1)
            GROUP BY h.id, h.name, r.id, r.room_number
            ORDER BY h.name ASC, r.room_number ASC, r.id ASC
            "#
        )
        .bind(hostel_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(occupancy)
    }
}
