//! Owner workflows: hostels and their wardens

use tracing::info;
use crate::database::DatabaseService;
use crate::models::hostel::{CreateHostelRequest, Hostel};
use crate::models::student::validate_credentials;
use crate::models::user::{CreateUserRequest, CreateWardenRequest, Role, User};
use crate::services::auth::{hash_password, AuthContext};
use crate::utils::errors::{HostelError, Result, ValidationErrors};
use crate::utils::logging::log_staff_action;

#[derive(Clone, Debug)]
pub struct OwnerService {
    db: DatabaseService,
}

impl OwnerService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Open a hostel owned by the signed-in owner
    pub async fn create_hostel(&self, ctx: &AuthContext, name: &str, address: &str) -> Result<Hostel> {
        ctx.require_role(&[Role::Owner])?;
        let request = CreateHostelRequest {
            name: name.to_string(),
            address: address.to_string(),
            owner_id: ctx.user_id,
        };
        request.validate()?;

        let hostel = self.db.hostels.create(&request).await?;
        info!(hostel_id = hostel.id, owner_id = ctx.user_id, "Hostel created");
        log_staff_action(ctx.user_id, "create_hostel", Some(hostel.name.as_str()), None);
        Ok(hostel)
    }

    /// Hostels of the signed-in owner
    pub async fn hostels(&self, ctx: &AuthContext) -> Result<Vec<Hostel>> {
        ctx.require_role(&[Role::Owner])?;
        self.db.hostels.list_by_owner(ctx.user_id).await
    }

    /// Create a warden login for one of the owner's hostels
    pub async fn create_warden(&self, ctx: &AuthContext, request: &CreateWardenRequest) -> Result<User> {
        ctx.require_role(&[Role::Owner])?;

        let mut errors = ValidationErrors::new();
        validate_credentials(&request.username, &request.password, &mut errors);
        errors.into_result()?;

        let hostel = self
            .db
            .hostels
            .find_by_id(request.hostel_id)
            .await?
            .ok_or_else(|| HostelError::invalid("hostel", "Select a valid hostel."))?;
        if hostel.owner_id != ctx.user_id && !ctx.is_superuser {
            return Err(HostelError::PermissionDenied(format!(
                "Hostel {} is not owned by this account",
                hostel.id
            )));
        }

        if self.db.users.username_exists(&request.username).await? {
            return Err(HostelError::invalid("username", "A user with that username already exists."));
        }
        let password_hash = hash_password(&request.password)?;

        let user_request = CreateUserRequest {
            username: request.username.clone(),
            password: request.password.clone(),
            role: Role::Warden,
            hostel_id: Some(hostel.id),
            student_id: None,
        };
        let mut tx = self.db.begin().await?;
        let user = self.db.users.create(&mut *tx, &user_request, &password_hash).await?;
        tx.commit().await?;

        log_staff_action(ctx.user_id, "create_warden", Some(user.username.as_str()), Some(hostel.name.as_str()));
        Ok(user)
    }
}
