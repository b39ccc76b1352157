//! Database service layer
//!
//! This module bundles the repositories over one pool and hands out transactions

use sqlx::{Postgres, Transaction};
use crate::database::{
    AdminRepository, DatabasePool, ExpenseRepository, FeeRepository, HostelRepository,
    MessPlanRepository, RoomRepository, StudentRepository, UserRepository,
};
use crate::utils::errors::HostelError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub hostels: HostelRepository,
    pub rooms: RoomRepository,
    pub students: StudentRepository,
    pub fees: FeeRepository,
    pub expenses: ExpenseRepository,
    pub mess_plans: MessPlanRepository,
    pub admin: AdminRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            hostels: HostelRepository::new(pool.clone()),
            rooms: RoomRepository::new(pool.clone()),
            students: StudentRepository::new(pool.clone()),
            fees: FeeRepository::new(pool.clone()),
            expenses: ExpenseRepository::new(pool.clone()),
            mess_plans: MessPlanRepository::new(pool.clone()),
            admin: AdminRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Start a transaction; dropping it without commit rolls back
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, HostelError> {
        Ok(self.pool.begin().await?)
    }
}
