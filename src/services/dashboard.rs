//! Role dashboards
//!
//! Read-only projections over committed ledger and allocation state.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;
use crate::database::DatabaseService;
use crate::models::dashboard::{
    paid_for_fee_type, pending_fees, summarize_fees, AdminDashboard, HostelRevenue,
    OwnerDashboard, StudentDashboard, WardenDashboard,
};
use crate::models::fee::FeeStatus;
use crate::models::room::OccupancySummary;
use crate::models::user::Role;
use crate::services::auth::AuthContext;
use crate::utils::errors::{HostelError, Result};
use crate::utils::helpers::current_month;

const RECENT_EXPENSES: i64 = 5;

#[derive(Clone, Debug)]
pub struct DashboardService {
    db: DatabaseService,
}

impl DashboardService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Own record, bed, fees and this month's mess plan
    pub async fn student_dashboard(&self, ctx: &AuthContext) -> Result<StudentDashboard> {
        ctx.require_role(&[Role::Student])?;
        let student_id = ctx.own_student()?;

        let student = self
            .db
            .students
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| HostelError::not_found("Student", student_id))?;

        let room = match student.room_id {
            Some(room_id) => self.db.rooms.find_by_id(room_id).await?,
            None => None,
        };
        let bed = match student.bed_id {
            Some(bed_id) => self.db.rooms.find_bed(bed_id).await?,
            None => None,
        };
        let fees = self.db.fees.lines_for_student(student.id).await?;
        let fee_status = FeeStatus::from_lines(&fees);
        let mess_plan = self
            .db
            .mess_plans
            .latest_for_month(student.hostel_id, &current_month())
            .await?;

        Ok(StudentDashboard { student, room, bed, fees, fee_status, mess_plan })
    }

    /// Students, fee summary, funds, recent expenses and occupancy of the warden's hostel
    pub async fn warden_dashboard(&self, ctx: &AuthContext) -> Result<WardenDashboard> {
        ctx.require_role(&[Role::Warden])?;
        let hostel_id = ctx.staff_hostel()?;

        let hostel = self
            .db
            .hostels
            .find_by_id(hostel_id)
            .await?
            .ok_or_else(|| HostelError::not_found("Hostel", hostel_id))?;
        let students = self.db.students.placements_for_hostel(hostel_id).await?;
        let lines = self.db.fees.lines_for_hostels(&[hostel_id]).await?;
        let snapshot = self
            .db
            .hostels
            .funds_snapshot(hostel_id)
            .await?
            .ok_or_else(|| HostelError::not_found("Hostel", hostel_id))?;
        let recent_expenses = self.db.expenses.recent_for_hostel(hostel_id, RECENT_EXPENSES).await?;
        let mess_plan = self.db.mess_plans.latest_for_month(hostel_id, &current_month()).await?;
        let rooms = self.db.rooms.occupancy_for_hostels(&[hostel_id]).await?;

        debug!(hostel_id = hostel_id, students = students.len(), fee_lines = lines.len(), "Warden dashboard loaded");

        Ok(WardenDashboard {
            recorded_funds: hostel.total_funds,
            hostel,
            students,
            fees_summary: summarize_fees(&lines),
            total_fees: snapshot.fees_collected,
            total_expenses: snapshot.expenses,
            current_funds: snapshot.expected_funds(),
            recent_expenses,
            mess_plan,
            occupancy: OccupancySummary::from_rooms(&rooms),
            rooms,
        })
    }

    /// Wardens, seats, pending fees, spend and revenue across the owner's hostels
    pub async fn owner_dashboard(&self, ctx: &AuthContext) -> Result<OwnerDashboard> {
        ctx.require_role(&[Role::Owner])?;

        let hostels = self.db.hostels.list_by_owner(ctx.user_id).await?;
        let hostel_ids: Vec<i64> = hostels.iter().map(|h| h.id).collect();
        let hostel_names: BTreeMap<i64, String> = hostels.iter().map(|h| (h.id, h.name.clone())).collect();

        let wardens = self.db.users.wardens_for_hostels(&hostel_ids).await?;
        let mess_plans = self.db.mess_plans.for_hostels_in_month(&hostel_ids, &current_month()).await?;
        let seat_availability = self.db.rooms.occupancy_for_hostels(&hostel_ids).await?;
        let lines = self.db.fees.lines_for_hostels(&hostel_ids).await?;
        let expenses_by_category = self.db.expenses.totals_by_category(&hostel_ids).await?;
        let snapshots = self.db.hostels.funds_snapshots(&hostel_ids).await?;

        let hostel_revenue: Vec<HostelRevenue> = snapshots.iter().map(HostelRevenue::from).collect();
        let total_revenue: Decimal = hostel_revenue.iter().map(|r| r.revenue).sum();

        Ok(OwnerDashboard {
            hostels,
            wardens,
            mess_plans,
            seat_availability,
            unpaid_students: pending_fees(&lines, &hostel_names),
            expenses_by_category,
            security_fees: paid_for_fee_type(&lines, "security"),
            total_revenue,
            hostel_revenue,
        })
    }

    /// System counts, accounts per role and hostels whose funds drifted
    pub async fn admin_dashboard(&self, ctx: &AuthContext) -> Result<AdminDashboard> {
        ctx.require_role(&[Role::Admin])?;

        let counts = self.db.admin.system_counts().await?;
        let users_by_role = self.db.admin.users_by_role().await?;
        let funds_drift = self
            .db
            .hostels
            .all_funds_snapshots()
            .await?
            .into_iter()
            .filter(|snapshot| !snapshot.is_balanced())
            .collect();

        Ok(AdminDashboard { counts, users_by_role, funds_drift })
    }
}
