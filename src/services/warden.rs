//! Warden workflows
//!
//! Everything a warden does from their dashboard, scoped to the hostel the
//! warden is attached to. Ledger writes go through [`LedgerService`] and bed
//! moves through [`AllocationService`].

use serde::{Deserialize, Serialize};
use tracing::info;
use crate::database::DatabaseService;
use crate::models::expense::{normalize_category_name, CreateExpenseRequest, Expense, ExpenseCategory, UpdateExpenseRequest};
use crate::models::fee::{CreateFeeRequest, CreateFeeTypeRequest, FeeType, StudentFee, UpdateFeeRequest};
use crate::models::mess_plan::{MessPlan, UploadMessPlanRequest};
use crate::models::room::{Bed, CreateRoomRequest, Room};
use crate::models::student::{
    validate_cnic_update, validate_emergency_contact_update, CreateStudentAccountRequest,
    CreateStudentRequest, Student,
};
use crate::models::user::{CreateUserRequest, Role, User};
use crate::services::allocation::{Allocation, AllocationService};
use crate::services::auth::{hash_password, AuthContext};
use crate::services::documents::DocumentStore;
use crate::services::ledger::LedgerService;
use crate::utils::errors::{HostelError, Result};
use crate::utils::logging::log_staff_action;

const STAFF: &[Role] = &[Role::Warden];
const FEE_TYPE_EDITORS: &[Role] = &[Role::Warden, Role::Admin];

/// A room together with the beds created for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomWithBeds {
    pub room: Room,
    pub beds: Vec<Bed>,
}

/// Login and student record created together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAccount {
    pub user: User,
    pub student: Student,
}

#[derive(Clone, Debug)]
pub struct WardenService {
    db: DatabaseService,
    ledger: LedgerService,
    allocation: AllocationService,
    documents: DocumentStore,
}

impl WardenService {
    pub fn new(
        db: DatabaseService,
        ledger: LedgerService,
        allocation: AllocationService,
        documents: DocumentStore,
    ) -> Self {
        Self { db, ledger, allocation, documents }
    }

    /// Load a student the warden may act on
    async fn scoped_student(&self, ctx: &AuthContext, student_id: i64) -> Result<Student> {
        let student = self
            .db
            .students
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| HostelError::not_found("Student", student_id))?;
        ctx.require_hostel(student.hostel_id)?;
        Ok(student)
    }

    async fn scoped_fee(&self, ctx: &AuthContext, fee_id: i64) -> Result<StudentFee> {
        let fee = self
            .db
            .fees
            .find_by_id(fee_id)
            .await?
            .ok_or_else(|| HostelError::not_found("StudentFee", fee_id))?;
        self.scoped_student(ctx, fee.student_id).await?;
        Ok(fee)
    }

    async fn scoped_expense(&self, ctx: &AuthContext, expense_id: i64) -> Result<Expense> {
        let expense = self
            .db
            .expenses
            .find_by_id(expense_id)
            .await?
            .ok_or_else(|| HostelError::not_found("Expense", expense_id))?;
        ctx.require_hostel(expense.hostel_id)?;
        Ok(expense)
    }

    // Students

    /// Register a student in the warden's hostel
    pub async fn register_student(&self, ctx: &AuthContext, request: &CreateStudentRequest) -> Result<Student> {
        ctx.require_role(STAFF)?;
        let hostel_id = ctx.staff_hostel()?;
        request.validate()?;

        if let Some(cnic) = request.cnic() {
            if self.db.students.cnic_exists(cnic, None).await? {
                return Err(HostelError::invalid("cnic", "A student with this CNIC already exists."));
            }
        }

        let mut tx = self.db.begin().await?;
        let student = self.db.students.create(&mut *tx, hostel_id, request).await?;
        tx.commit().await?;

        log_staff_action(ctx.user_id, "register_student", Some(student.name.as_str()), None);
        Ok(student)
    }

    /// Create a student login and its student record in one transaction
    pub async fn create_student_account(
        &self,
        ctx: &AuthContext,
        request: &CreateStudentAccountRequest,
    ) -> Result<StudentAccount> {
        ctx.require_role(STAFF)?;
        let hostel_id = ctx.staff_hostel()?;
        request.validate()?;

        if self.db.users.username_exists(&request.username).await? {
            return Err(HostelError::invalid("username", "A user with that username already exists."));
        }
        let student_request = request.student_request();
        if let Some(cnic) = student_request.cnic() {
            if self.db.students.cnic_exists(cnic, None).await? {
                return Err(HostelError::invalid("cnic", "A student with this CNIC already exists."));
            }
        }
        let password_hash = hash_password(&request.password)?;

        let mut tx = self.db.begin().await?;
        let student = self.db.students.create(&mut *tx, hostel_id, &student_request).await?;
        let user_request = CreateUserRequest {
            username: request.username.clone(),
            password: request.password.clone(),
            role: Role::Student,
            hostel_id: Some(hostel_id),
            student_id: Some(student.id),
        };
        let user = self.db.users.create(&mut *tx, &user_request, &password_hash).await?;
        tx.commit().await?;

        log_staff_action(ctx.user_id, "create_student_account", Some(user.username.as_str()), None);
        Ok(StudentAccount { user, student })
    }

    /// Change or clear a student's CNIC
    pub async fn update_student_cnic(&self, ctx: &AuthContext, student_id: i64, cnic: Option<&str>) -> Result<Student> {
        ctx.require_role(STAFF)?;
        self.scoped_student(ctx, student_id).await?;
        let cnic = validate_cnic_update(cnic)?;

        if let Some(value) = cnic.as_deref() {
            if self.db.students.cnic_exists(value, Some(student_id)).await? {
                return Err(HostelError::invalid("cnic", "A student with this CNIC already exists."));
            }
        }

        let student = self.db.students.update_cnic(student_id, cnic.as_deref()).await?;
        log_staff_action(ctx.user_id, "update_cnic", Some(student.name.as_str()), None);
        Ok(student)
    }

    /// Change or clear a student's emergency contact
    pub async fn update_emergency_contact(
        &self,
        ctx: &AuthContext,
        student_id: i64,
        number: Option<&str>,
    ) -> Result<Student> {
        ctx.require_role(STAFF)?;
        self.scoped_student(ctx, student_id).await?;
        let number = validate_emergency_contact_update(number)?;

        let student = self.db.students.update_emergency_contact(student_id, &number).await?;
        log_staff_action(ctx.user_id, "update_emergency_contact", Some(student.name.as_str()), None);
        Ok(student)
    }

    // Rooms

    /// Create a room and its beds numbered from 1
    pub async fn create_room(&self, ctx: &AuthContext, request: &CreateRoomRequest) -> Result<RoomWithBeds> {
        ctx.require_role(STAFF)?;
        let hostel_id = ctx.staff_hostel()?;
        request.validate()?;

        let mut tx = self.db.begin().await?;
        let room = self.db.rooms.create(&mut *tx, hostel_id, request).await?;
        let mut beds = Vec::with_capacity(room.number_of_beds as usize);
        for bed_number in 1..=room.number_of_beds {
            beds.push(self.db.rooms.create_bed(&mut *tx, room.id, bed_number).await?);
        }
        tx.commit().await?;

        info!(hostel_id = hostel_id, room_id = room.id, beds = beds.len(), "Room created");
        log_staff_action(ctx.user_id, "create_room", Some(room.room_number.as_str()), Some(room.bed_type.as_str()));
        Ok(RoomWithBeds { room, beds })
    }

    /// Rooms of the warden's hostel that still have a free bed
    pub async fn available_rooms(&self, ctx: &AuthContext) -> Result<Vec<Room>> {
        ctx.require_role(STAFF)?;
        self.db.rooms.rooms_with_free_beds(ctx.staff_hostel()?).await
    }

    /// Put a student on a free bed of a room
    pub async fn allocate_room(&self, ctx: &AuthContext, student_id: i64, room_id: i64) -> Result<Allocation> {
        ctx.require_role(STAFF)?;
        self.scoped_student(ctx, student_id).await?;

        let allocation = self.allocation.allocate_bed(student_id, room_id).await?;
        if allocation.changed {
            log_staff_action(
                ctx.user_id,
                "allocate_room",
                Some(allocation.student.name.as_str()),
                Some(allocation.room.room_number.as_str()),
            );
        }
        Ok(allocation)
    }

    // Fees

    pub async fn create_fee_type(&self, ctx: &AuthContext, request: &CreateFeeTypeRequest) -> Result<FeeType> {
        ctx.require_role(FEE_TYPE_EDITORS)?;
        request.validate()?;
        let fee_type = self.db.fees.create_fee_type(request).await?;
        log_staff_action(ctx.user_id, "create_fee_type", Some(fee_type.name.as_str()), Some(fee_type.periodicity.as_str()));
        Ok(fee_type)
    }

    pub async fn fee_types(&self) -> Result<Vec<FeeType>> {
        self.db.fees.list_fee_types().await
    }

    /// Record a fee for a student of the warden's hostel
    pub async fn create_fee(&self, ctx: &AuthContext, request: &CreateFeeRequest) -> Result<StudentFee> {
        ctx.require_role(STAFF)?;
        self.scoped_student(ctx, request.student_id).await?;
        let fee = self.ledger.create_fee(request).await?;
        log_staff_action(ctx.user_id, "create_fee", None, Some(fee.id.to_string().as_str()));
        Ok(fee)
    }

    pub async fn update_fee(&self, ctx: &AuthContext, fee_id: i64, request: &UpdateFeeRequest) -> Result<StudentFee> {
        ctx.require_role(STAFF)?;
        self.scoped_fee(ctx, fee_id).await?;
        let fee = self.ledger.update_fee(fee_id, request).await?;
        log_staff_action(ctx.user_id, "update_fee", None, Some(fee.id.to_string().as_str()));
        Ok(fee)
    }

    pub async fn delete_fee(&self, ctx: &AuthContext, fee_id: i64) -> Result<StudentFee> {
        ctx.require_role(STAFF)?;
        self.scoped_fee(ctx, fee_id).await?;
        let fee = self.ledger.delete_fee(fee_id).await?;
        log_staff_action(ctx.user_id, "delete_fee", None, Some(fee.id.to_string().as_str()));
        Ok(fee)
    }

    // Expenses

    /// Record an expense against the warden's hostel
    pub async fn add_expense(&self, ctx: &AuthContext, request: &CreateExpenseRequest) -> Result<Expense> {
        ctx.require_role(STAFF)?;
        let hostel_id = ctx.staff_hostel()?;
        let expense = self.ledger.create_expense(hostel_id, request).await?;
        log_staff_action(ctx.user_id, "add_expense", Some(expense.description.as_str()), Some(expense.amount.to_string().as_str()));
        Ok(expense)
    }

    pub async fn update_expense(&self, ctx: &AuthContext, expense_id: i64, request: &UpdateExpenseRequest) -> Result<Expense> {
        ctx.require_role(STAFF)?;
        self.scoped_expense(ctx, expense_id).await?;
        let expense = self.ledger.update_expense(expense_id, request).await?;
        log_staff_action(ctx.user_id, "update_expense", Some(expense.description.as_str()), Some(expense.amount.to_string().as_str()));
        Ok(expense)
    }

    pub async fn delete_expense(&self, ctx: &AuthContext, expense_id: i64) -> Result<Expense> {
        ctx.require_role(STAFF)?;
        self.scoped_expense(ctx, expense_id).await?;
        let expense = self.ledger.delete_expense(expense_id).await?;
        log_staff_action(ctx.user_id, "delete_expense", Some(expense.description.as_str()), None);
        Ok(expense)
    }

    /// Get or create an expense category by name
    pub async fn add_category(&self, ctx: &AuthContext, name: &str) -> Result<ExpenseCategory> {
        ctx.require_role(STAFF)?;
        let name = normalize_category_name(name)?;
        let category = self.db.expenses.get_or_create_category(&name).await?;
        log_staff_action(ctx.user_id, "add_category", Some(category.name.as_str()), None);
        Ok(category)
    }

    pub async fn categories(&self) -> Result<Vec<ExpenseCategory>> {
        self.db.expenses.list_categories().await
    }

    // Mess plans

    /// Store a monthly mess plan PDF for the warden's hostel
    pub async fn upload_mess_plan(&self, ctx: &AuthContext, request: &UploadMessPlanRequest) -> Result<MessPlan> {
        ctx.require_role(STAFF)?;
        let hostel_id = ctx.staff_hostel()?;
        request.validate(self.documents.max_upload_bytes())?;

        let pdf_path = self.documents.save_mess_plan(&request.file_name, &request.content).await?;
        let plan = match self.db.mess_plans.create(hostel_id, request.month.trim(), &pdf_path).await {
            Ok(plan) => plan,
            Err(e) => {
                self.documents.remove(&pdf_path).await?;
                return Err(e);
            }
        };

        log_staff_action(ctx.user_id, "upload_mess_plan", Some(plan.month.as_str()), Some(plan.pdf_path.as_str()));
        Ok(plan)
    }
}
