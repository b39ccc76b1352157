//! Room and bed models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use crate::utils::errors::{Result, ValidationErrors};
use super::UnknownVariant;

/// Room layout; fixes how many beds the room holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BedType {
    #[serde(rename = "1-bed")]
    Single,
    #[serde(rename = "2-bed")]
    Double,
    #[serde(rename = "3-bed")]
    Triple,
}

impl BedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BedType::Single => "1-bed",
            BedType::Double => "2-bed",
            BedType::Triple => "3-bed",
        }
    }

    pub fn bed_count(&self) -> i32 {
        match self {
            BedType::Single => 1,
            BedType::Double => 2,
            BedType::Triple => 3,
        }
    }
}

impl fmt::Display for BedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for BedType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "1-bed" => Ok(BedType::Single),
            "2-bed" => Ok(BedType::Double),
            "3-bed" => Ok(BedType::Triple),
            _ => Err(UnknownVariant::new("bed_type", value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub id: i64,
    pub hostel_id: i64,
    pub room_number: String,
    #[sqlx(try_from = "String")]
    pub bed_type: BedType,
    pub number_of_beds: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Bed {
    pub id: i64,
    pub room_id: i64,
    pub bed_number: i32,
    pub student_id: Option<i64>,
}

impl Bed {
    pub fn is_free(&self) -> bool {
        self.student_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub room_number: String,
    pub bed_type: BedType,
    pub number_of_beds: i32,
}

impl CreateRoomRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        let room_number = self.room_number.trim();
        if room_number.is_empty() {
            errors.add("room_number", "Room number is required.");
        } else if room_number.chars().count() > 10 {
            errors.add("room_number", "Room number cannot exceed 10 characters.");
        }

        let expected = self.bed_type.bed_count();
        if self.number_of_beds != expected {
            errors.add(
                "number_of_beds",
                format!("Number of beds must be {} for {} room.", expected, self.bed_type),
            );
        }
        errors.into_result()
    }
}

/// Bed usage of one room, as shown on the owner dashboard
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoomOccupancy {
    pub hostel_id: i64,
    pub hostel_name: String,
    pub room_id: i64,
    pub room_number: String,
    pub total_beds: i64,
    pub occupied: i64,
}

impl RoomOccupancy {
    pub fn available(&self) -> i64 {
        (self.total_beds - self.occupied).max(0)
    }
}

/// Bed usage across a hostel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancySummary {
    pub total_beds: i64,
    pub occupied: i64,
}

impl OccupancySummary {
    pub fn from_rooms(rooms: &[RoomOccupancy]) -> Self {
        rooms.iter().fold(Self::default(), |acc, room| Self {
            total_beds: acc.total_beds + room.total_beds,
            occupied: acc.occupied + room.occupied,
        })
    }

    pub fn available(&self) -> i64 {
        (self.total_beds - self.occupied).max(0)
    }
}
