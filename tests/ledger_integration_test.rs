//! Funds ledger against PostgreSQL

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use hostel_ledger::models::expense::{CreateExpenseRequest, UpdateExpenseRequest};
use hostel_ledger::models::fee::{CreateFeeRequest, Periodicity, UpdateFeeRequest};
use hostel_ledger::HostelError;
use rust_decimal::Decimal;
use serial_test::serial;

fn fee(student_id: i64, fee_type_id: i64, due: &str, paid: &str, period: Option<&str>) -> CreateFeeRequest {
    CreateFeeRequest {
        student_id,
        fee_type_id,
        due_amount: dec(due),
        paid_amount: dec(paid),
        period: period.map(str::to_string),
    }
}

fn expense(description: &str, amount: &str) -> CreateExpenseRequest {
    CreateExpenseRequest {
        category_id: None,
        description: description.to_string(),
        amount: dec(amount),
        date: None,
    }
}

#[tokio::test]
#[serial]
async fn test_fee_update_and_expense_move_funds() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let warden = &fx.services.warden_service;
    let student = fx.student(&fx.warden, "Ayesha").await;
    let seat = fx.fee_type("Seat", Periodicity::OneTime).await;

    assert_eq!(fx.funds(fx.hostel.id).await, Decimal::ZERO);

    let line = warden
        .create_fee(&fx.warden, &fee(student.id, seat.id, "1000", "600", None))
        .await
        .unwrap();
    assert_eq!(fx.funds(fx.hostel.id).await, dec("600"));

    warden
        .update_fee(&fx.warden, line.id, &UpdateFeeRequest { due_amount: None, paid_amount: Some(dec("900")) })
        .await
        .unwrap();
    assert_eq!(fx.funds(fx.hostel.id).await, dec("900"));

    warden.add_expense(&fx.warden, &expense("Plumbing", "200")).await.unwrap();
    assert_eq!(fx.funds(fx.hostel.id).await, dec("700"));

    let snapshot = fx.services.ledger_service.funds(fx.hostel.id).await.unwrap();
    assert!(snapshot.is_balanced());
}

#[tokio::test]
#[serial]
async fn test_deletions_reverse_their_amounts() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let warden = &fx.services.warden_service;
    let student = fx.student(&fx.warden, "Bilal").await;
    let mess = fx.fee_type("Mess", Periodicity::Monthly).await;

    let line = warden
        .create_fee(&fx.warden, &fee(student.id, mess.id, "300", "300", Some("2024-05")))
        .await
        .unwrap();
    let bill = warden.add_expense(&fx.warden, &expense("Groceries", "120.50")).await.unwrap();
    assert_eq!(fx.funds(fx.hostel.id).await, dec("179.50"));

    warden
        .update_expense(
            &fx.warden,
            bill.id,
            &UpdateExpenseRequest { amount: Some(dec("100")), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(fx.funds(fx.hostel.id).await, dec("200"));

    warden.delete_fee(&fx.warden, line.id).await.unwrap();
    assert_eq!(fx.funds(fx.hostel.id).await, dec("-100"));

    warden.delete_expense(&fx.warden, bill.id).await.unwrap();
    assert_eq!(fx.funds(fx.hostel.id).await, Decimal::ZERO);
    assert_eq!(db.count_records("student_fees").await.unwrap(), 0);
    assert_eq!(db.count_records("expenses").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_rejected_fees_leave_no_trace() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let warden = &fx.services.warden_service;
    let student = fx.student(&fx.warden, "Chand").await;
    let mess = fx.fee_type("Mess", Periodicity::Monthly).await;
    let security = fx.fee_type("Security", Periodicity::OneTime).await;

    let overpaid = warden
        .create_fee(&fx.warden, &fee(student.id, security.id, "500", "500.01", None))
        .await;
    assert_matches!(overpaid, Err(HostelError::Validation(ref e)) if e.has_field("paid_amount"));

    let no_period = warden
        .create_fee(&fx.warden, &fee(student.id, mess.id, "300", "0", Some("  ")))
        .await;
    assert_matches!(no_period, Err(HostelError::Validation(ref e)) if e.has_field("period"));

    warden
        .create_fee(&fx.warden, &fee(student.id, security.id, "500", "500", None))
        .await
        .unwrap();
    let duplicate = warden
        .create_fee(&fx.warden, &fee(student.id, security.id, "500", "100", None))
        .await;
    assert_matches!(duplicate, Err(HostelError::Validation(ref e)) if e.has_field("fee_type"));

    assert_eq!(db.count_records("student_fees").await.unwrap(), 1);
    assert_eq!(fx.funds(fx.hostel.id).await, dec("500"));
}

#[tokio::test]
#[serial]
async fn test_update_cannot_push_paid_over_due() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let warden = &fx.services.warden_service;
    let student = fx.student(&fx.warden, "Danish").await;
    let seat = fx.fee_type("Seat", Periodicity::OneTime).await;

    let line = warden
        .create_fee(&fx.warden, &fee(student.id, seat.id, "1000", "400", None))
        .await
        .unwrap();
    let result = warden
        .update_fee(&fx.warden, line.id, &UpdateFeeRequest { due_amount: Some(dec("300")), paid_amount: None })
        .await;
    assert_matches!(result, Err(HostelError::Validation(_)));
    assert_eq!(fx.funds(fx.hostel.id).await, dec("400"));
}

#[tokio::test]
#[serial]
async fn test_warden_cannot_touch_other_hostel() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let (south, south_warden) = fx.other_hostel().await;
    let student = fx.student(&fx.warden, "Ehsan").await;
    let seat = fx.fee_type("Seat", Periodicity::OneTime).await;

    let result = fx
        .services
        .warden_service
        .create_fee(&south_warden, &fee(student.id, seat.id, "1000", "1000", None))
        .await;
    assert_matches!(result, Err(HostelError::PermissionDenied(_)));
    assert_eq!(fx.funds(fx.hostel.id).await, Decimal::ZERO);
    assert_eq!(fx.funds(south.id).await, Decimal::ZERO);
}

#[tokio::test]
#[serial]
async fn test_audit_reports_drift() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let student = fx.student(&fx.warden, "Farah").await;
    let seat = fx.fee_type("Seat", Periodicity::OneTime).await;
    fx.services
        .warden_service
        .create_fee(&fx.warden, &fee(student.id, seat.id, "1000", "250", None))
        .await
        .unwrap();

    assert!(fx.services.ledger_service.audit().await.unwrap().is_empty());

    sqlx::query("UPDATE hostels SET total_funds = total_funds + 1 WHERE id = $1")
        .bind(fx.hostel.id)
        .execute(&db.pool)
        .await
        .unwrap();

    let drifted = fx.services.ledger_service.audit().await.unwrap();
    assert_eq!(drifted.len(), 1);
    assert_eq!(drifted[0].hostel_id, fx.hostel.id);
    assert_eq!(drifted[0].drift(), dec("1"));
}

#[tokio::test]
#[serial]
async fn test_amounts_beyond_storage_are_field_errors() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let warden = &fx.services.warden_service;
    let student = fx.student(&fx.warden, "Danish").await;
    let seat = fx.fee_type("Seat", Periodicity::OneTime).await;

    let huge_fee = warden
        .create_fee(&fx.warden, &fee(student.id, seat.id, "100000000", "0", None))
        .await;
    assert_matches!(huge_fee, Err(HostelError::Validation(ref e)) if e.has_field("due_amount"));

    let huge_expense = warden.add_expense(&fx.warden, &expense("New wing", "100000000")).await;
    assert_matches!(huge_expense, Err(HostelError::Validation(ref e)) if e.has_field("amount"));

    assert_eq!(db.count_records("student_fees").await.unwrap(), 0);
    assert_eq!(db.count_records("expenses").await.unwrap(), 0);
    assert_eq!(fx.funds(fx.hostel.id).await, Decimal::ZERO);
}

#[tokio::test]
#[serial]
async fn test_funds_overflow_rolls_back_the_fee() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let student = fx.student(&fx.warden, "Erum").await;
    let seat = fx.fee_type("Seat", Periodicity::OneTime).await;

    sqlx::query("UPDATE hostels SET total_funds = 9999999990.00 WHERE id = $1")
        .bind(fx.hostel.id)
        .execute(&db.pool)
        .await
        .unwrap();

    let result = fx
        .services
        .warden_service
        .create_fee(&fx.warden, &fee(student.id, seat.id, "100", "100", None))
        .await;
    assert_matches!(result, Err(HostelError::Consistency(_)));

    assert_eq!(db.count_records("student_fees").await.unwrap(), 0);
    assert_eq!(fx.funds(fx.hostel.id).await, dec("9999999990.00"));
}

#[tokio::test]
#[serial]
async fn test_fee_update_keeps_its_period() {
    let Some(db) = TestDatabase::new().await else { return };
    let fx = HostelFixture::new(&db).await;
    let warden = &fx.services.warden_service;
    let student = fx.student(&fx.warden, "Ghazala").await;
    let mess = fx.fee_type("Mess", Periodicity::Monthly).await;

    warden
        .create_fee(&fx.warden, &fee(student.id, mess.id, "300", "300", Some("2024-05")))
        .await
        .unwrap();
    let june = warden
        .create_fee(&fx.warden, &fee(student.id, mess.id, "300", "0", Some("2024-06")))
        .await
        .unwrap();

    let updated = warden
        .update_fee(&fx.warden, june.id, &UpdateFeeRequest { due_amount: None, paid_amount: Some(dec("150")) })
        .await
        .unwrap();
    assert_eq!(updated.period.as_deref(), Some("2024-06"));
    assert_eq!(updated.paid_amount, dec("150"));
    assert_eq!(db.count_records("student_fees").await.unwrap(), 2);
    assert_eq!(fx.funds(fx.hostel.id).await, dec("450"));
}
