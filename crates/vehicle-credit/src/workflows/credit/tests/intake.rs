use super::common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::workflows::credit::domain::{ApplicationStatus, Tenor};
use crate::workflows::credit::domain::{ApplicationInput, ApplicationRecord};
use crate::workflows::credit::intake::{create_application, ApplicationField, ValidationErrors};
use crate::workflows::credit::VehicleCatalog;

fn submit_first(raw: ApplicationInput) -> Result<ApplicationRecord, ValidationErrors> {
    create_application(raw, 1, submitted_at(), &VehicleCatalog::standard(), &calculator())
}

#[test]
fn valid_input_builds_pending_record() {
    let catalog = VehicleCatalog::standard();
    let record = create_application(input(), 7, submitted_at(), &catalog, &calculator())
        .expect("valid input");

    assert_eq!(record.id.as_str(), "APP007");
    assert_eq!(record.status, ApplicationStatus::Pending);
    assert_eq!(record.submitted_at, submitted_at());
    assert!(record.approved_at.is_none());
    assert!(record.decided_at.is_none());
    assert_eq!(record.financing.tenor, Tenor::Months48);
    assert_eq!(record.financing.principal(), dec!(200000000));
    assert_eq!(record.financing.monthly_payment, dec!(4882584));
    assert_eq!(
        record.documents,
        vec!["KTP.pdf", "SIM.jpg", "Slip Gaji.pdf"]
    );
}

#[test]
fn documents_keep_order_and_duplicates() {
    let mut raw = input();
    raw.documents = vec!["b.pdf".to_string(), "a.pdf".to_string(), "b.pdf".to_string()];
    let record = submit_first(raw).expect("valid input");
    assert_eq!(record.documents, vec!["b.pdf", "a.pdf", "b.pdf"]);
}

#[test]
fn ids_pad_to_three_digits_and_grow_beyond() {
    let catalog = VehicleCatalog::standard();
    let first = create_application(input(), 1, submitted_at(), &catalog, &calculator())
        .expect("valid input");
    let large = create_application(input(), 1234, submitted_at(), &catalog, &calculator())
        .expect("valid input");
    assert_eq!(first.id.as_str(), "APP001");
    assert_eq!(large.id.as_str(), "APP1234");
}

#[test]
fn down_payment_equal_to_price_is_rejected() {
    let mut raw = input();
    raw.dp = raw.loan_amount;
    let errors = submit_first(raw).expect_err("zero principal rejected");
    assert!(errors.has_field(ApplicationField::Dp));
}

#[test]
fn negative_down_payment_is_rejected() {
    let mut raw = input();
    raw.dp = dec!(-1);
    let errors = submit_first(raw).expect_err("negative dp rejected");
    assert!(errors.has_field(ApplicationField::Dp));
}

#[test]
fn zero_down_payment_is_allowed() {
    let mut raw = input();
    raw.dp = Decimal::ZERO;
    let record = submit_first(raw).expect("zero dp accepted");
    assert_eq!(record.financing.principal(), dec!(250000000));
}

#[test]
fn tenor_outside_offered_terms_is_rejected() {
    for months in [0, 6, 30, 72] {
        let mut raw = input();
        raw.tenor = months;
        let errors = submit_first(raw).expect_err("tenor rejected");
        assert!(errors.has_field(ApplicationField::Tenor), "tenor {months}");
    }
}

#[test]
fn nik_must_be_sixteen_digits() {
    for nik in ["317401234567890", "31740123456789012", "31740123456789AB", ""] {
        let mut raw = input();
        raw.nik = nik.to_string();
        let errors = submit_first(raw).expect_err("nik rejected");
        assert!(errors.has_field(ApplicationField::Nik), "nik {nik:?}");
    }
}

#[test]
fn collects_every_failed_field() {
    let mut raw = input();
    raw.customer_name = "   ".to_string();
    raw.phone = String::new();
    raw.vehicle = "Tesla Model 3".to_string();
    raw.loan_amount = Decimal::ZERO;
    raw.email = Some("not-an-email".to_string());

    let errors = submit_first(raw).expect_err("invalid input");

    for field in [
        ApplicationField::CustomerName,
        ApplicationField::Phone,
        ApplicationField::Vehicle,
        ApplicationField::LoanAmount,
        ApplicationField::Email,
    ] {
        assert!(errors.has_field(field), "missing {field:?}");
    }
    assert!(errors.to_string().contains("customer_name"));
}

#[test]
fn blank_optional_contacts_are_dropped() {
    let mut raw = input();
    raw.email = Some("  ".to_string());
    raw.address = Some(String::new());
    let record = submit_first(raw).expect("blank optionals accepted");
    assert!(record.applicant.email.is_none());
    assert!(record.applicant.address.is_none());
}

#[test]
fn principal_too_small_for_an_installment_is_rejected() {
    let mut raw = input();
    raw.loan_amount = dec!(10);
    raw.dp = dec!(9.99);

    let errors = submit_first(raw).expect_err("zero installment rejected");
    assert!(errors.has_field(ApplicationField::LoanAmount));
    assert_eq!(errors.errors().len(), 1);
}
