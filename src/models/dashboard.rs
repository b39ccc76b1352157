//! Read projections served to the role dashboards

use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::collections::BTreeMap;
use super::{
    Bed, CategoryTotal, Expense, FeeLine, FeeStatus, Hostel, MessPlan, OccupancySummary, Room,
    RoomOccupancy, RoleCount, Student, User,
};

/// Recorded balance of a hostel next to the sums it should equal
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FundsSnapshot {
    pub hostel_id: i64,
    pub hostel_name: String,
    pub recorded_funds: Decimal,
    pub fees_collected: Decimal,
    pub expenses: Decimal,
}

impl FundsSnapshot {
    /// Paid fees minus expenses
    pub fn expected_funds(&self) -> Decimal {
        self.fees_collected - self.expenses
    }

    pub fn drift(&self) -> Decimal {
        self.recorded_funds - self.expected_funds()
    }

    pub fn is_balanced(&self) -> bool {
        self.drift().is_zero()
    }
}

/// A student with the numbers of the room and bed they hold
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentPlacement {
    pub student_id: i64,
    pub name: String,
    pub cnic: Option<String>,
    pub room_id: Option<i64>,
    pub room_number: Option<String>,
    pub bed_id: Option<i64>,
    pub bed_number: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDashboard {
    pub student: Student,
    pub room: Option<Room>,
    pub bed: Option<Bed>,
    pub fees: Vec<FeeLine>,
    pub fee_status: FeeStatus,
    pub mess_plan: Option<MessPlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardenDashboard {
    pub hostel: Hostel,
    pub students: Vec<StudentPlacement>,
    /// Student id -> lower-cased fee type name -> latest line
    pub fees_summary: BTreeMap<i64, BTreeMap<String, FeeLine>>,
    pub total_fees: Decimal,
    pub total_expenses: Decimal,
    /// Paid fees minus expenses, computed from the lines
    pub current_funds: Decimal,
    /// Balance stored on the hostel row
    pub recorded_funds: Decimal,
    pub recent_expenses: Vec<Expense>,
    pub mess_plan: Option<MessPlan>,
    pub occupancy: OccupancySummary,
    pub rooms: Vec<RoomOccupancy>,
}

/// Outstanding amount of one student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFees {
    pub student_id: i64,
    pub student: String,
    pub hostel_id: i64,
    pub hostel: String,
    pub pending_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostelRevenue {
    pub hostel_id: i64,
    pub hostel: String,
    pub fees_collected: Decimal,
    pub expenses: Decimal,
    pub revenue: Decimal,
}

impl From<&FundsSnapshot> for HostelRevenue {
    fn from(snapshot: &FundsSnapshot) -> Self {
        Self {
            hostel_id: snapshot.hostel_id,
            hostel: snapshot.hostel_name.clone(),
            fees_collected: snapshot.fees_collected,
            expenses: snapshot.expenses,
            revenue: snapshot.expected_funds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerDashboard {
    pub hostels: Vec<Hostel>,
    pub wardens: Vec<User>,
    /// Plans uploaded for the current month
    pub mess_plans: Vec<MessPlan>,
    pub seat_availability: Vec<RoomOccupancy>,
    pub unpaid_students: Vec<PendingFees>,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub security_fees: Decimal,
    pub total_revenue: Decimal,
    pub hostel_revenue: Vec<HostelRevenue>,
}

/// Whole-system counts
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct SystemCounts {
    pub hostels: i64,
    pub rooms: i64,
    pub beds: i64,
    pub occupied_beds: i64,
    pub students: i64,
    pub users: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub counts: SystemCounts,
    pub users_by_role: Vec<RoleCount>,
    pub funds_drift: Vec<FundsSnapshot>,
}

/// Group fee lines per student and per lower-cased fee type name
///
/// When a student has several lines of one type (monthly fees) the line
/// listed last wins, so callers pass lines oldest first.
pub fn summarize_fees(lines: &[FeeLine]) -> BTreeMap<i64, BTreeMap<String, FeeLine>> {
    let mut summary: BTreeMap<i64, BTreeMap<String, FeeLine>> = BTreeMap::new();
    for line in lines {
        summary
            .entry(line.student_id)
            .or_default()
            .insert(line.fee_type_name.to_lowercase(), line.clone());
    }
    summary
}

/// Students whose lines still have an outstanding balance
pub fn pending_fees(lines: &[FeeLine], hostel_names: &BTreeMap<i64, String>) -> Vec<PendingFees> {
    let mut per_student: BTreeMap<i64, PendingFees> = BTreeMap::new();
    for line in lines {
        let outstanding = line.outstanding();
        if outstanding.is_zero() {
            continue;
        }
        per_student
            .entry(line.student_id)
            .or_insert_with(|| PendingFees {
                student_id: line.student_id,
                student: line.student_name.clone(),
                hostel_id: line.hostel_id,
                hostel: hostel_names.get(&line.hostel_id).cloned().unwrap_or_default(),
                pending_amount: Decimal::ZERO,
            })
            .pending_amount += outstanding;
    }
    per_student.into_values().collect()
}

/// Sum of paid amounts on lines of one fee type name, case-insensitive
pub fn paid_for_fee_type(lines: &[FeeLine], fee_type_name: &str) -> Decimal {
    lines
        .iter()
        .filter(|line| line.fee_type_name.eq_ignore_ascii_case(fee_type_name))
        .map(|line| line.paid_amount)
        .sum()
}
