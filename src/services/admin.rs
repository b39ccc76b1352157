//! Admin workflows: accounts and funds audit

use crate::database::DatabaseService;
use crate::models::dashboard::FundsSnapshot;
use crate::models::student::validate_credentials;
use crate::models::user::{CreateUserRequest, Role, User};
use crate::services::auth::{hash_password, AuthContext};
use crate::services::ledger::LedgerService;
use crate::utils::errors::{HostelError, Result, ValidationErrors};
use crate::utils::logging::log_staff_action;

const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone, Debug)]
pub struct AdminService {
    db: DatabaseService,
    ledger: LedgerService,
}

impl AdminService {
    pub fn new(db: DatabaseService, ledger: LedgerService) -> Self {
        Self { db, ledger }
    }

    /// Create an account of any role
    pub async fn create_user(&self, ctx: &AuthContext, request: &CreateUserRequest) -> Result<User> {
        ctx.require_role(&[Role::Admin])?;

        let mut errors = ValidationErrors::new();
        validate_credentials(&request.username, &request.password, &mut errors);
        if request.role == Role::Warden && request.hostel_id.is_none() {
            errors.add("hostel", "Wardens must be assigned to a hostel.");
        }
        if request.role == Role::Student && request.student_id.is_none() {
            errors.add("student", "Student accounts must be linked to a student.");
        }
        errors.into_result()?;

        if self.db.users.username_exists(&request.username).await? {
            return Err(HostelError::invalid("username", "A user with that username already exists."));
        }
        let password_hash = hash_password(&request.password)?;

        let mut tx = self.db.begin().await?;
        let user = self.db.users.create(&mut *tx, request, &password_hash).await?;
        tx.commit().await?;

        log_staff_action(ctx.user_id, "create_user", Some(user.username.as_str()), Some(user.role.as_str()));
        Ok(user)
    }

    /// Accounts, newest first; `limit` is capped at 100
    pub async fn users(&self, ctx: &AuthContext, limit: i64, offset: i64) -> Result<Vec<User>> {
        ctx.require_role(&[Role::Admin])?;
        self.db.users.list(limit.clamp(1, MAX_PAGE_SIZE), offset.max(0)).await
    }

    /// Hostels whose stored funds disagree with their fee and expense lines
    pub async fn audit_funds(&self, ctx: &AuthContext) -> Result<Vec<FundsSnapshot>> {
        ctx.require_role(&[Role::Admin])?;
        self.ledger.audit().await
    }
}
