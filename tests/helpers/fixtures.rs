//! Hostel fixtures built through the public services

use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::TempDir;
use hostel_ledger::config::Settings;
use hostel_ledger::database::DatabaseService;
use hostel_ledger::models::fee::{CreateFeeTypeRequest, FeeType, Periodicity};
use hostel_ledger::models::hostel::Hostel;
use hostel_ledger::models::room::{BedType, CreateRoomRequest};
use hostel_ledger::models::student::{CreateStudentRequest, Student};
use hostel_ledger::models::user::{CreateUserRequest, CreateWardenRequest, Role};
use hostel_ledger::services::auth::hash_password;
use hostel_ledger::services::{AuthContext, RoomWithBeds, ServiceFactory};

use super::TestDatabase;

pub const PASSWORD: &str = "correct-horse-42";

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

/// One owner with one hostel and its warden
pub struct HostelFixture {
    pub services: ServiceFactory,
    pub owner: AuthContext,
    pub warden: AuthContext,
    pub hostel: Hostel,
    pub media: TempDir,
}

impl HostelFixture {
    pub async fn new(db: &TestDatabase) -> Self {
        let media = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.storage.media_root = media.path().to_string_lossy().into_owned();
        settings.storage.max_upload_bytes = 4096;

        let services = ServiceFactory::new(DatabaseService::new(db.pool.clone()), &settings);
        let owner = create_account(&services, "owner", Role::Owner).await;
        let hostel = services
            .owner_service
            .create_hostel(&owner, "North Wing", "12 Campus Road")
            .await
            .unwrap();
        let warden_user = services
            .owner_service
            .create_warden(
                &owner,
                &CreateWardenRequest {
                    username: "warden".to_string(),
                    password: PASSWORD.to_string(),
                    hostel_id: hostel.id,
                },
            )
            .await
            .unwrap();
        let warden = AuthContext::from_user(&warden_user);

        Self { services, owner, warden, hostel, media }
    }

    /// Second hostel of the same owner with its own warden
    pub async fn other_hostel(&self) -> (Hostel, AuthContext) {
        let hostel = self
            .services
            .owner_service
            .create_hostel(&self.owner, "South Wing", "14 Campus Road")
            .await
            .unwrap();
        let user = self
            .services
            .owner_service
            .create_warden(
                &self.owner,
                &CreateWardenRequest {
                    username: "south-warden".to_string(),
                    password: PASSWORD.to_string(),
                    hostel_id: hostel.id,
                },
            )
            .await
            .unwrap();
        (hostel, AuthContext::from_user(&user))
    }

    pub async fn student(&self, warden: &AuthContext, name: &str) -> Student {
        self.services
            .warden_service
            .register_student(
                warden,
                &CreateStudentRequest {
                    name: name.to_string(),
                    contact_number: None,
                    email: None,
                    enrollment_date: None,
                    cnic: None,
                    emergency_contact_number: None,
                },
            )
            .await
            .unwrap()
    }

    pub async fn room(&self, warden: &AuthContext, number: &str, bed_type: BedType) -> RoomWithBeds {
        self.services
            .warden_service
            .create_room(
                warden,
                &CreateRoomRequest {
                    room_number: number.to_string(),
                    bed_type,
                    number_of_beds: bed_type.bed_count(),
                },
            )
            .await
            .unwrap()
    }

    pub async fn fee_type(&self, name: &str, periodicity: Periodicity) -> FeeType {
        self.services
            .warden_service
            .create_fee_type(
                &self.warden,
                &CreateFeeTypeRequest { name: name.to_string(), periodicity },
            )
            .await
            .unwrap()
    }

    /// Recorded balance of a hostel as stored right now
    pub async fn funds(&self, hostel_id: i64) -> Decimal {
        self.services
            .ledger_service
            .funds(hostel_id)
            .await
            .unwrap()
            .recorded_funds
    }
}

/// Create an account directly, bypassing role gates
pub async fn create_account(services: &ServiceFactory, username: &str, role: Role) -> AuthContext {
    let hash = hash_password(PASSWORD).unwrap();
    let request = CreateUserRequest {
        username: username.to_string(),
        password: PASSWORD.to_string(),
        role,
        hostel_id: None,
        student_id: None,
    };
    let mut tx = services.db.begin().await.unwrap();
    let user = services.db.users.create(&mut *tx, &request, &hash).await.unwrap();
    tx.commit().await.unwrap();
    AuthContext::from_user(&user)
}
