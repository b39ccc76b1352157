//! Bed allocation
//!
//! Places one student on one bed. The student row is locked first, then the
//! rooms the move touches in ascending id order, then all of their beds in
//! ascending id order. Allocations into the same room serialize on the room
//! row, and moves in opposite directions take their locks in the same order.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::database::DatabaseService;
use crate::models::room::{Bed, Room};
use crate::models::student::Student;
use crate::utils::errors::{HostelError, Result};
use crate::utils::logging::log_allocation;

/// What an allocation request has to change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationPlan {
    /// The student already sleeps in this room
    Unchanged { bed_id: i64 },
    /// Claim a free bed, releasing the bed the student held elsewhere
    Assign { release: Option<i64>, claim: i64 },
}

/// Decide which bed a student gets in `room`
///
/// Free beds are taken lowest bed number first. `beds` must be the room's
/// complete bed list.
pub fn plan_allocation(student: &Student, room: &Room, beds: &[Bed]) -> Result<AllocationPlan> {
    if student.hostel_id != room.hostel_id {
        return Err(HostelError::Consistency(format!(
            "Student {} belongs to hostel {} but room {} belongs to hostel {}",
            student.id, student.hostel_id, room.id, room.hostel_id
        )));
    }

    if let Some(current) = beds.iter().find(|bed| {
        bed.student_id == Some(student.id) || Some(bed.id) == student.bed_id
    }) {
        return Ok(AllocationPlan::Unchanged { bed_id: current.id });
    }

    let free = beds
        .iter()
        .filter(|bed| bed.room_id == room.id && bed.is_free())
        .min_by_key(|bed| (bed.bed_number, bed.id))
        .ok_or(HostelError::Capacity { room_id: room.id })?;

    Ok(AllocationPlan::Assign {
        release: student.bed_id,
        claim: free.id,
    })
}

/// Rooms an allocation has to lock: the target and the room the student
/// leaves, ascending by id
pub fn rooms_to_lock(student: &Student, room_id: i64) -> Vec<i64> {
    let mut ids = vec![room_id];
    if let Some(current) = student.room_id.filter(|&current| current != room_id) {
        ids.push(current);
    }
    ids.sort_unstable();
    ids
}

/// Outcome of an allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub student: Student,
    pub room: Room,
    pub bed: Bed,
    /// False when the student already held a bed in the room
    pub changed: bool,
}

/// Allocation service for placing students on beds
#[derive(Clone, Debug)]
pub struct AllocationService {
    db: DatabaseService,
}

impl AllocationService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Put a student on the first free bed of a room
    ///
    /// Asking again for the room the student already sleeps in returns the
    /// current bed untouched.
    pub async fn allocate_bed(&self, student_id: i64, room_id: i64) -> Result<Allocation> {
        let mut tx = self.db.begin().await?;

        let student = self.db.students.lock(&mut *tx, student_id).await?;
        let room_ids = rooms_to_lock(&student, room_id);
        let room = self
            .db
            .rooms
            .lock_rooms(&mut *tx, &room_ids)
            .await?
            .into_iter()
            .find(|room| room.id == room_id)
            .ok_or_else(|| HostelError::not_found("Room", room_id))?;
        let locked_beds = self.db.rooms.lock_beds_for_rooms(&mut *tx, &room_ids).await?;
        let beds: Vec<Bed> = locked_beds.iter().filter(|bed| bed.room_id == room_id).cloned().collect();

        match plan_allocation(&student, &room, &beds)? {
            AllocationPlan::Unchanged { bed_id } => {
                debug!(student_id = student_id, room_id = room_id, bed_id = bed_id, "Student already placed in room");
                let bed = beds
                    .into_iter()
                    .find(|bed| bed.id == bed_id)
                    .ok_or_else(|| HostelError::not_found("Bed", bed_id))?;
                tx.commit().await?;
                Ok(Allocation { student, room, bed, changed: false })
            }
            AllocationPlan::Assign { release, claim } => {
                if let Some(old_bed_id) = release {
                    let old_bed = locked_beds.iter().find(|bed| bed.id == old_bed_id).ok_or_else(|| {
                        HostelError::Consistency(format!(
                            "Student {} holds bed {} outside room {:?}",
                            student.id, old_bed_id, student.room_id
                        ))
                    })?;
                    if old_bed.student_id == Some(student.id) {
                        self.db.rooms.set_bed_student(&mut *tx, old_bed_id, None).await?;
                    }
                }
                let bed = self.db.rooms.set_bed_student(&mut *tx, claim, Some(student.id)).await?;
                let student = self.db.students.set_placement(&mut *tx, student.id, room.id, bed.id).await?;
                tx.commit().await?;

                log_allocation(student.id, room.id, bed.id, release);
                info!(student_id = student.id, room = %room.room_number, bed_number = bed.bed_number, "Room allocated");
                Ok(Allocation { student, room, bed, changed: true })
            }
        }
    }
}
