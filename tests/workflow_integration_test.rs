//! Accounts, role gates and dashboards against PostgreSQL

mod helpers;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use helpers::*;
use hostel_ledger::models::expense::CreateExpenseRequest;
use hostel_ledger::models::fee::{CreateFeeRequest, Periodicity};
use hostel_ledger::models::mess_plan::UploadMessPlanRequest;
use hostel_ledger::models::room::BedType;
use hostel_ledger::models::student::CreateStudentAccountRequest;
use hostel_ledger::models::user::{CreateWardenRequest, Role};
use hostel_ledger::utils::helpers::current_month;
use hostel_ledger::HostelError;
use serial_test::serial;

fn account_request(username: &str, cnic: &str) -> CreateStudentAccountRequest {
    CreateStudentAccountRequest {
        username: username.to_string(),
        password: PASSWORD.to_string(),
        name: "Hina Akhtar".to_string(),
        contact_number: Some("03001234567".to_string()),
        email: Some("hina@example.com".to_string()),
        enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        cnic: cnic.to_string(),
        emergency_contact_number: Some("+923001234567".to_string()),
    }
}

#[tokio::test]
#[serial]
async fn test_student_account_login_and_dashboard() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let warden = &fx.services.warden_service;

    let account = warden
        .create_student_account(&fx.warden, &account_request("hina", "35202-1234567-1"))
        .await
        .unwrap();
    assert_eq!(account.user.role, Role::Student);
    assert_eq!(account.user.student_id, Some(account.student.id));

    let room = fx.room(&fx.warden, "501", BedType::Double).await;
    warden.allocate_room(&fx.warden, account.student.id, room.room.id).await.unwrap();
    let security = fx.fee_type("Security", Periodicity::OneTime).await;
    warden
        .create_fee(
            &fx.warden,
            &CreateFeeRequest {
                student_id: account.student.id,
                fee_type_id: security.id,
                due_amount: dec("5000"),
                paid_amount: dec("5000"),
                period: None,
            },
        )
        .await
        .unwrap();
    warden
        .upload_mess_plan(
            &fx.warden,
            &UploadMessPlanRequest {
                month: current_month(),
                file_name: "menu.pdf".to_string(),
                content: b"%PDF-1.4 menu".to_vec(),
            },
        )
        .await
        .unwrap();

    let ctx = fx.services.auth_service.authenticate("hina", PASSWORD).await.unwrap();
    assert_matches!(
        fx.services.auth_service.authenticate("hina", "nope").await,
        Err(HostelError::PermissionDenied(_))
    );

    let dashboard = fx.services.dashboard_service.student_dashboard(&ctx).await.unwrap();
    assert_eq!(dashboard.student.id, account.student.id);
    assert_eq!(dashboard.bed.map(|b| b.bed_number), Some(1));
    assert_eq!(dashboard.fee_status.security.map(|l| l.paid_amount), Some(dec("5000")));
    assert!(dashboard.fee_status.mess.is_none());
    assert!(dashboard.mess_plan.is_some());

    assert_matches!(
        fx.services.dashboard_service.warden_dashboard(&ctx).await,
        Err(HostelError::PermissionDenied(_))
    );
}

#[tokio::test]
#[serial]
async fn test_duplicate_username_and_cnic_are_rejected() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let warden = &fx.services.warden_service;

    warden
        .create_student_account(&fx.warden, &account_request("first", "35202-1234567-1"))
        .await
        .unwrap();

    let same_username = warden
        .create_student_account(&fx.warden, &account_request("first", "35202-7654321-1"))
        .await;
    assert_matches!(same_username, Err(HostelError::Validation(ref e)) if e.has_field("username"));

    let same_cnic = warden
        .create_student_account(&fx.warden, &account_request("second", "35202-1234567-1"))
        .await;
    assert_matches!(same_cnic, Err(HostelError::Validation(ref e)) if e.has_field("cnic"));

    assert_eq!(db.count_records("students").await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_cnic_and_emergency_contact_updates() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let warden = &fx.services.warden_service;
    let student = fx.student(&fx.warden, "Imran").await;

    let updated = warden
        .update_student_cnic(&fx.warden, student.id, Some("61101-1111111-3"))
        .await
        .unwrap();
    assert_eq!(updated.cnic.as_deref(), Some("61101-1111111-3"));

    let bad = warden.update_student_cnic(&fx.warden, student.id, Some("6110111111113")).await;
    assert_matches!(bad, Err(HostelError::Validation(_)));

    let cleared = warden.update_student_cnic(&fx.warden, student.id, Some("  ")).await.unwrap();
    assert!(cleared.cnic.is_none());

    let contact = warden
        .update_emergency_contact(&fx.warden, student.id, Some("+923331234567"))
        .await
        .unwrap();
    assert_eq!(contact.emergency_contact_number, "+923331234567");
    assert_matches!(
        warden.update_emergency_contact(&fx.warden, student.id, Some("0333")).await,
        Err(HostelError::Validation(_))
    );
}

#[tokio::test]
#[serial]
async fn test_owner_cannot_staff_foreign_hostel() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let rival = create_account(&fx.services, "rival", Role::Owner).await;

    let result = fx
        .services
        .owner_service
        .create_warden(
            &rival,
            &CreateWardenRequest {
                username: "intruder".to_string(),
                password: PASSWORD.to_string(),
                hostel_id: fx.hostel.id,
            },
        )
        .await;
    assert_matches!(result, Err(HostelError::PermissionDenied(_)));

    assert_matches!(
        fx.services.owner_service.create_hostel(&fx.warden, "Annex", "1 Side St").await,
        Err(HostelError::PermissionDenied(_))
    );
}

#[tokio::test]
#[serial]
async fn test_warden_owner_and_admin_dashboards() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let warden = &fx.services.warden_service;
    let seat = fx.fee_type("Seat", Periodicity::OneTime).await;
    let security = fx.fee_type("Security", Periodicity::OneTime).await;
    let room = fx.room(&fx.warden, "601", BedType::Triple).await;
    let paid = fx.student(&fx.warden, "Paid Up").await;
    let owing = fx.student(&fx.warden, "Owing").await;
    warden.allocate_room(&fx.warden, paid.id, room.room.id).await.unwrap();

    for (student_id, fee_type_id, due, amount) in [
        (paid.id, seat.id, "1000", "1000"),
        (paid.id, security.id, "2000", "2000"),
        (owing.id, seat.id, "1000", "400"),
    ] {
        warden
            .create_fee(
                &fx.warden,
                &CreateFeeRequest {
                    student_id,
                    fee_type_id,
                    due_amount: dec(due),
                    paid_amount: dec(amount),
                    period: None,
                },
            )
            .await
            .unwrap();
    }
    let utilities = warden.add_category(&fx.warden, "  Utilities ").await.unwrap();
    assert_eq!(utilities.name, "Utilities");
    warden
        .add_expense(
            &fx.warden,
            &CreateExpenseRequest {
                category_id: Some(utilities.id),
                description: "Electricity".to_string(),
                amount: dec("900"),
                date: None,
            },
        )
        .await
        .unwrap();

    let dashboard = fx.services.dashboard_service.warden_dashboard(&fx.warden).await.unwrap();
    assert_eq!(dashboard.students.len(), 2);
    assert_eq!(dashboard.total_fees, dec("3400"));
    assert_eq!(dashboard.total_expenses, dec("900"));
    assert_eq!(dashboard.current_funds, dec("2500"));
    assert_eq!(dashboard.recorded_funds, dec("2500"));
    assert_eq!(dashboard.fees_summary[&owing.id]["seat"].paid_amount, dec("400"));
    assert_eq!(dashboard.occupancy.total_beds, 3);
    assert_eq!(dashboard.occupancy.occupied, 1);
    assert_eq!(dashboard.recent_expenses.len(), 1);

    warden
        .upload_mess_plan(
            &fx.warden,
            &UploadMessPlanRequest {
                month: current_month(),
                file_name: "menu.pdf".to_string(),
                content: b"%PDF-1.4 menu".to_vec(),
            },
        )
        .await
        .unwrap();

    let owner = fx.services.dashboard_service.owner_dashboard(&fx.owner).await.unwrap();
    assert_eq!(owner.wardens.len(), 1);
    assert_eq!(owner.wardens[0].username, "warden");
    assert_eq!(owner.mess_plans.len(), 1);
    assert_eq!(owner.mess_plans[0].hostel_id, fx.hostel.id);
    assert_eq!(owner.unpaid_students.len(), 1);
    assert_eq!(owner.unpaid_students[0].pending_amount, dec("600"));
    assert_eq!(owner.security_fees, dec("2000"));
    assert_eq!(owner.total_revenue, dec("2500"));
    assert_eq!(owner.seat_availability[0].available(), 2);
    assert_eq!(owner.expenses_by_category[0].category.as_deref(), Some("Utilities"));

    let admin = create_account(&fx.services, "admin", Role::Admin).await;
    let system = fx.services.dashboard_service.admin_dashboard(&admin).await.unwrap();
    assert_eq!(system.counts.hostels, 1);
    assert_eq!(system.counts.beds, 3);
    assert_eq!(system.counts.occupied_beds, 1);
    assert!(system.funds_drift.is_empty());
    assert!(fx.services.admin_service.audit_funds(&admin).await.unwrap().is_empty());

    let users = fx.services.admin_service.users(&admin, 500, 0).await.unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[0].username, "admin");
    let second_page = fx.services.admin_service.users(&admin, 2, 2).await.unwrap();
    assert_eq!(second_page.len(), 1);
    assert_matches!(
        fx.services.admin_service.users(&fx.owner, 10, 0).await,
        Err(HostelError::PermissionDenied(_))
    );
}

#[tokio::test]
#[serial]
async fn test_mess_plan_upload_rejects_non_pdf() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;

    let result = fx
        .services
        .warden_service
        .upload_mess_plan(
            &fx.warden,
            &UploadMessPlanRequest {
                month: "2024-07".to_string(),
                file_name: "menu.docx".to_string(),
                content: b"not a pdf".to_vec(),
            },
        )
        .await;
    assert_matches!(result, Err(HostelError::Validation(ref e)) if e.has_field("pdf_file"));
    assert_eq!(db.count_records("mess_plans").await.unwrap(), 0);
    assert!(!fx.media.path().join("mess_plans").exists());
}
