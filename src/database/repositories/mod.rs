//! Database repositories module
//!
//! This module contains all repository implementations for data access.
//! Methods taking a `&mut PgConnection` run inside the caller's transaction.

pub mod user;
pub mod hostel;
pub mod room;
pub mod student;
pub mod fee;
pub mod expense;
pub mod mess_plan;
pub mod admin;

// Re-export repositories
pub use user::UserRepository;
pub use hostel::HostelRepository;
pub use room::RoomRepository;
pub use student::StudentRepository;
pub use fee::FeeRepository;
pub use expense::ExpenseRepository;
pub use mess_plan::MessPlanRepository;
pub use admin::AdminRepository;
