//! Authentication service implementation
//!
//! This service checks credentials, builds the authentication context of a
//! signed-in user and gates operations by role and hostel scope.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::{debug, info, warn};
use crate::database::repositories::UserRepository;
use crate::models::user::{Role, User};
use crate::utils::errors::{HostelError, Result};

/// Authentication context for a signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub is_superuser: bool,
    /// Hostel a warden works in
    pub hostel_id: Option<i64>,
    /// Student record behind a student account
    pub student_id: Option<i64>,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            is_superuser: user.is_superuser,
            hostel_id: user.hostel_id,
            student_id: user.student_id,
        }
    }

    /// Check the user holds one of `roles`; superusers always pass
    pub fn require_role(&self, roles: &[Role]) -> Result<()> {
        if self.is_superuser || roles.contains(&self.role) {
            return Ok(());
        }
        warn!(user_id = self.user_id, role = %self.role, "Role gate rejected user");
        Err(HostelError::PermissionDenied(format!(
            "{} accounts cannot perform this operation",
            self.role
        )))
    }

    /// Check a warden works in `hostel_id`; superusers always pass
    pub fn require_hostel(&self, hostel_id: i64) -> Result<()> {
        if self.is_superuser || self.hostel_id == Some(hostel_id) {
            return Ok(());
        }
        warn!(user_id = self.user_id, hostel_id = hostel_id, "Hostel scope rejected user");
        Err(HostelError::PermissionDenied(format!(
            "No access to hostel {}",
            hostel_id
        )))
    }

    /// Hostel the user is attached to
    pub fn staff_hostel(&self) -> Result<i64> {
        self.hostel_id
            .ok_or_else(|| HostelError::PermissionDenied("No hostel assigned to this account".to_string()))
    }

    /// Student record behind the account
    pub fn own_student(&self) -> Result<i64> {
        self.student_id
            .ok_or_else(|| HostelError::PermissionDenied("No student profile linked to this account".to_string()))
    }
}

/// Hash a password with argon2 and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HostelError::PasswordHash(e.to_string()))
}

/// Check a password against a stored argon2 hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| HostelError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Authentication service for credential checks
#[derive(Clone, Debug)]
pub struct AuthService {
    users: UserRepository,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Check a username and password, returning the user's context
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthContext> {
        debug!(username = username, "Authenticating user");

        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(username = username, "Login with unknown username");
                return Err(invalid_credentials());
            }
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = user.id, "Login with wrong password");
            return Err(invalid_credentials());
        }

        info!(user_id = user.id, role = %user.role, "User authenticated");
        Ok(AuthContext::from_user(&user))
    }

    /// Context of an already identified user, e.g. from a session
    pub async fn context_for(&self, user_id: i64) -> Result<AuthContext> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| HostelError::not_found("User", user_id))?;
        Ok(AuthContext::from_user(&user))
    }
}

fn invalid_credentials() -> HostelError {
    HostelError::PermissionDenied("Invalid username or password".to_string())
}
