//! Funds ledger service
//!
//! Every fee or expense write moves the owning hostel's `total_funds` in the
//! same transaction, with the hostel row locked. The stored balance therefore
//! always equals paid fees minus expenses for that hostel.

use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::{debug, info};
use crate::database::DatabaseService;
use crate::models::dashboard::FundsSnapshot;
use crate::models::expense::{CreateExpenseRequest, Expense, UpdateExpenseRequest};
use crate::models::fee::{CreateFeeRequest, StudentFee, UpdateFeeRequest};
use crate::models::student::Student;
use crate::utils::errors::{HostelError, Result};
use crate::utils::helpers::to_money;
use crate::utils::logging::{log_funds_drift, log_funds_movement};

/// A change to a hostel's balance caused by one ledger write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundsMovement {
    FeeRecorded { paid: Decimal },
    FeeAdjusted { old_paid: Decimal, new_paid: Decimal },
    FeeRemoved { paid: Decimal },
    ExpenseRecorded { amount: Decimal },
    ExpenseAdjusted { old_amount: Decimal, new_amount: Decimal },
    ExpenseRemoved { amount: Decimal },
}

impl FundsMovement {
    /// Net change to the hostel balance
    pub fn delta(&self) -> Decimal {
        match *self {
            FundsMovement::FeeRecorded { paid } => paid,
            FundsMovement::FeeAdjusted { old_paid, new_paid } => new_paid - old_paid,
            FundsMovement::FeeRemoved { paid } => -paid,
            FundsMovement::ExpenseRecorded { amount } => -amount,
            FundsMovement::ExpenseAdjusted { old_amount, new_amount } => old_amount - new_amount,
            FundsMovement::ExpenseRemoved { amount } => amount,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FundsMovement::FeeRecorded { .. } => "fee_recorded",
            FundsMovement::FeeAdjusted { .. } => "fee_adjusted",
            FundsMovement::FeeRemoved { .. } => "fee_removed",
            FundsMovement::ExpenseRecorded { .. } => "expense_recorded",
            FundsMovement::ExpenseAdjusted { .. } => "expense_adjusted",
            FundsMovement::ExpenseRemoved { .. } => "expense_removed",
        }
    }

    fn is_expense(&self) -> bool {
        matches!(
            self,
            FundsMovement::ExpenseRecorded { .. }
                | FundsMovement::ExpenseAdjusted { .. }
                | FundsMovement::ExpenseRemoved { .. }
        )
    }
}

/// Balance reached by applying `movements` to an empty hostel
pub fn replay(movements: &[FundsMovement]) -> Decimal {
    movements.iter().map(FundsMovement::delta).sum()
}

/// Ledger service for fee and expense writes
#[derive(Clone, Debug)]
pub struct LedgerService {
    db: DatabaseService,
}

impl LedgerService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Add a payment delta to the hostel balance; negative reverses
    pub async fn apply_payment(&self, conn: &mut PgConnection, hostel_id: i64, delta: Decimal) -> Result<Decimal> {
        let hostel = self.db.hostels.adjust_funds(conn, hostel_id, to_money(delta)).await?;
        Ok(hostel.total_funds)
    }

    /// Take an expense amount out of the hostel balance; negative credits back
    pub async fn apply_expense(&self, conn: &mut PgConnection, hostel_id: i64, amount: Decimal) -> Result<Decimal> {
        let hostel = self.db.hostels.adjust_funds(conn, hostel_id, -to_money(amount)).await?;
        Ok(hostel.total_funds)
    }

    async fn record(&self, conn: &mut PgConnection, hostel_id: i64, movement: FundsMovement) -> Result<Decimal> {
        let delta = movement.delta();
        if delta.is_zero() {
            debug!(hostel_id = hostel_id, movement = movement.name(), "Ledger write leaves funds unchanged");
            return Ok(self.db.hostels.lock(conn, hostel_id).await?.total_funds);
        }

        let balance = if movement.is_expense() {
            self.apply_expense(conn, hostel_id, -delta).await?
        } else {
            self.apply_payment(conn, hostel_id, delta).await?
        };
        log_funds_movement(hostel_id, movement.name(), delta, balance);
        Ok(balance)
    }

    async fn student(&self, student_id: i64) -> Result<Student> {
        self.db
            .students
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| HostelError::not_found("Student", student_id))
    }

    async fn fee_owner(&self, fee_id: i64) -> Result<Student> {
        let fee = self
            .db
            .fees
            .find_by_id(fee_id)
            .await?
            .ok_or_else(|| HostelError::not_found("StudentFee", fee_id))?;
        self.student(fee.student_id).await
    }

    async fn ensure_category(&self, category_id: Option<i64>) -> Result<()> {
        if let Some(id) = category_id {
            if self.db.expenses.find_category(id).await?.is_none() {
                return Err(HostelError::invalid("category", "Select a valid expense category."));
            }
        }
        Ok(())
    }

    /// Record a fee line and credit its paid amount
    pub async fn create_fee(&self, request: &CreateFeeRequest) -> Result<StudentFee> {
        let student = self.student(request.student_id).await?;
        let fee_type = self
            .db
            .fees
            .find_fee_type(request.fee_type_id)
            .await?
            .ok_or_else(|| HostelError::invalid("fee_type", "Select a valid fee type."))?;
        let line = request.validate(fee_type.periodicity)?;

        let mut tx = self.db.begin().await?;
        self.db.hostels.lock(&mut *tx, student.hostel_id).await?;

        if self
            .db
            .fees
            .line_exists(&mut *tx, student.id, fee_type.id, line.period.as_deref())
            .await?
        {
            return Err(HostelError::invalid(
                "fee_type",
                "A fee of this type is already recorded for the student and period.",
            ));
        }

        let fee = self.db.fees.create(&mut *tx, student.id, fee_type.id, &line).await?;
        self.record(&mut *tx, student.hostel_id, FundsMovement::FeeRecorded { paid: fee.paid_amount })
            .await?;
        tx.commit().await?;

        info!(fee_id = fee.id, student_id = student.id, fee_type = %fee_type.name, "Fee recorded");
        Ok(fee)
    }

    /// Change the amounts of a fee line; the balance moves by the paid delta
    pub async fn update_fee(&self, fee_id: i64, request: &UpdateFeeRequest) -> Result<StudentFee> {
        let student = self.fee_owner(fee_id).await?;

        let mut tx = self.db.begin().await?;
        self.db.hostels.lock(&mut *tx, student.hostel_id).await?;
        let current = self.db.fees.lock(&mut *tx, fee_id).await?;
        let fee_type = self
            .db
            .fees
            .find_fee_type(current.fee_type_id)
            .await?
            .ok_or_else(|| HostelError::not_found("FeeType", current.fee_type_id))?;

        let line = request.apply_to(&current, fee_type.periodicity)?;
        let fee = self.db.fees.update_amounts(&mut *tx, fee_id, &line).await?;
        self.record(
            &mut *tx,
            student.hostel_id,
            FundsMovement::FeeAdjusted { old_paid: current.paid_amount, new_paid: fee.paid_amount },
        )
        .await?;
        tx.commit().await?;

        info!(fee_id = fee.id, student_id = student.id, "Fee updated");
        Ok(fee)
    }

    /// Remove a fee line and reverse its paid amount
    pub async fn delete_fee(&self, fee_id: i64) -> Result<StudentFee> {
        let student = self.fee_owner(fee_id).await?;

        let mut tx = self.db.begin().await?;
        self.db.hostels.lock(&mut *tx, student.hostel_id).await?;
        let fee = self.db.fees.lock(&mut *tx, fee_id).await?;
        self.db.fees.delete(&mut *tx, fee_id).await?;
        self.record(&mut *tx, student.hostel_id, FundsMovement::FeeRemoved { paid: fee.paid_amount })
            .await?;
        tx.commit().await?;

        info!(fee_id = fee.id, student_id = student.id, "Fee deleted");
        Ok(fee)
    }

    /// Record an expense and debit its amount
    pub async fn create_expense(&self, hostel_id: i64, request: &CreateExpenseRequest) -> Result<Expense> {
        let request = request.validate()?;
        self.ensure_category(request.category_id).await?;

        let mut tx = self.db.begin().await?;
        self.db.hostels.lock(&mut *tx, hostel_id).await?;
        let expense = self.db.expenses.create(&mut *tx, hostel_id, &request).await?;
        self.record(&mut *tx, hostel_id, FundsMovement::ExpenseRecorded { amount: expense.amount })
            .await?;
        tx.commit().await?;

        info!(expense_id = expense.id, hostel_id = hostel_id, amount = %expense.amount, "Expense recorded");
        Ok(expense)
    }

    /// Edit an expense; the balance moves by the amount delta
    pub async fn update_expense(&self, expense_id: i64, request: &UpdateExpenseRequest) -> Result<Expense> {
        request.validate()?;
        self.ensure_category(request.category_id).await?;
        let existing = self
            .db
            .expenses
            .find_by_id(expense_id)
            .await?
            .ok_or_else(|| HostelError::not_found("Expense", expense_id))?;

        let mut tx = self.db.begin().await?;
        self.db.hostels.lock(&mut *tx, existing.hostel_id).await?;
        let current = self.db.expenses.lock(&mut *tx, expense_id).await?;

        let merged = Expense {
            category_id: request.category_id.or(current.category_id),
            description: request
                .description
                .as_deref()
                .map(|d| d.trim().to_string())
                .unwrap_or_else(|| current.description.clone()),
            amount: request.amount.map(to_money).unwrap_or(current.amount),
            date: request.date.unwrap_or(current.date),
            ..current.clone()
        };
        let expense = self.db.expenses.update(&mut *tx, &merged).await?;
        self.record(
            &mut *tx,
            expense.hostel_id,
            FundsMovement::ExpenseAdjusted { old_amount: current.amount, new_amount: expense.amount },
        )
        .await?;
        tx.commit().await?;

        info!(expense_id = expense.id, hostel_id = expense.hostel_id, "Expense updated");
        Ok(expense)
    }

    /// Remove an expense and credit its amount back
    pub async fn delete_expense(&self, expense_id: i64) -> Result<Expense> {
        let existing = self
            .db
            .expenses
            .find_by_id(expense_id)
            .await?
            .ok_or_else(|| HostelError::not_found("Expense", expense_id))?;

        let mut tx = self.db.begin().await?;
        self.db.hostels.lock(&mut *tx, existing.hostel_id).await?;
        let expense = self.db.expenses.lock(&mut *tx, expense_id).await?;
        self.db.expenses.delete(&mut *tx, expense_id).await?;
        self.record(&mut *tx, expense.hostel_id, FundsMovement::ExpenseRemoved { amount: expense.amount })
            .await?;
        tx.commit().await?;

        info!(expense_id = expense.id, hostel_id = expense.hostel_id, "Expense deleted");
        Ok(expense)
    }

    /// Funds snapshot of one hostel
    pub async fn funds(&self, hostel_id: i64) -> Result<FundsSnapshot> {
        self.db
            .hostels
            .funds_snapshot(hostel_id)
            .await?
            .ok_or_else(|| HostelError::not_found("Hostel", hostel_id))
    }

    /// Hostels whose stored balance disagrees with their fee and expense lines
    pub async fn audit(&self) -> Result<Vec<FundsSnapshot>> {
        let snapshots = self.db.hostels.all_funds_snapshots().await?;
        let checked = snapshots.len();

        let drifted: Vec<FundsSnapshot> = snapshots
            .into_iter()
            .filter(|snapshot| !snapshot.is_balanced())
            .collect();
        for snapshot in &drifted {
            log_funds_drift(snapshot.hostel_id, snapshot.recorded_funds, snapshot.expected_funds());
        }

        info!(checked = checked, drifted = drifted.len(), "Funds audit finished");
        Ok(drifted)
    }
}
