//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod hostel;
pub mod room;
pub mod student;
pub mod fee;
pub mod expense;
pub mod mess_plan;
pub mod dashboard;

// Re-export commonly used models
pub use user::{User, Role, RoleCount, CreateUserRequest, CreateWardenRequest};
pub use hostel::{Hostel, CreateHostelRequest};
pub use room::{Room, Bed, BedType, CreateRoomRequest, RoomOccupancy, OccupancySummary};
pub use student::{Student, CreateStudentRequest, CreateStudentAccountRequest};
pub use fee::{FeeType, Periodicity, StudentFee, FeeLine, FeeStatus, CreateFeeTypeRequest, CreateFeeRequest, UpdateFeeRequest, ValidatedFeeLine};
pub use expense::{Expense, ExpenseCategory, CategoryTotal, CreateExpenseRequest, UpdateExpenseRequest};
pub use mess_plan::{MessPlan, UploadMessPlanRequest};
pub use dashboard::{
    AdminDashboard, FundsSnapshot, HostelRevenue, OwnerDashboard, PendingFees, StudentDashboard,
    StudentPlacement, SystemCounts, WardenDashboard,
};

/// Text column holding a value outside its enum
#[derive(Debug, thiserror::Error)]
#[error("unknown {column} value: {value}")]
pub struct UnknownVariant {
    pub column: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(column: &'static str, value: String) -> Self {
        Self { column, value }
    }
}
