//! Test helpers module
//!
//! Database setup and hostel fixtures shared by the integration tests.

#![allow(dead_code)]

pub mod database_helper;
pub mod fixtures;

pub use database_helper::*;
pub use fixtures::*;
