//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use super::UnknownVariant;

/// Dashboard role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    Warden,
    Owner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Warden => "Warden",
            Role::Owner => "Owner",
            Role::Admin => "Admin",
        }
    }

    pub fn all() -> [Role; 4] {
        [Role::Student, Role::Warden, Role::Owner, Role::Admin]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Student" => Ok(Role::Student),
            "Warden" => Ok(Role::Warden),
            "Owner" => Ok(Role::Owner),
            "Admin" => Ok(Role::Admin),
            _ => Err(UnknownVariant::new("role", value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_superuser: bool,
    pub hostel_id: Option<i64>,
    pub student_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub hostel_id: Option<i64>,
    pub student_id: Option<i64>,
}

/// Owner-side form creating a warden account for one of their hostels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWardenRequest {
    pub username: String,
    pub password: String,
    pub hostel_id: i64,
}

/// Number of accounts holding a role
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleCount {
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub count: i64,
}
