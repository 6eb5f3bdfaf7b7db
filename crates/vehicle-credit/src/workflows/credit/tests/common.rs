use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::workflows::credit::domain::{
    ApplicationId, ApplicationInput, ApplicationRecord, ApplicationStatus, Decision,
    MaritalStatus,
};
use crate::workflows::credit::ledger::{ApplicationLedger, LedgerError};
use crate::workflows::credit::{
    application_router, AmortizationCalculator, CreditApplicationService, CreditConfig,
    InMemoryLedger, VehicleCatalog,
};

pub(super) fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

pub(super) fn submitted_at() -> NaiveDateTime {
    at(7, 10, 30)
}

pub(super) fn decided_at() -> NaiveDateTime {
    at(8, 9, 15)
}

pub(super) fn input() -> ApplicationInput {
    ApplicationInput {
        customer_name: "Dewi Lestari".to_string(),
        nik: "3174012345678901".to_string(),
        phone: "081311112222".to_string(),
        email: Some("dewi@example.com".to_string()),
        address: Some("Jl. Melati No. 5, Jakarta".to_string()),
        marital_status: MaritalStatus::Married,
        vehicle: "Toyota Avanza 1.3 G MT".to_string(),
        loan_amount: dec!(250000000),
        dp: dec!(50000000),
        tenor: 48,
        documents: vec!["KTP.pdf".to_string(), "SIM.jpg".to_string(), "Slip Gaji.pdf".to_string()],
    }
}

pub(super) fn calculator() -> AmortizationCalculator {
    AmortizationCalculator::default()
}

pub(super) fn build_service() -> (CreditApplicationService<InMemoryLedger>, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::default());
    let service = CreditApplicationService::new(
        ledger.clone(),
        VehicleCatalog::standard(),
        CreditConfig::default(),
    );
    (service, ledger)
}

pub(super) fn approved_record() -> ApplicationRecord {
    let (service, _) = build_service();
    let record = service
        .submit(input(), submitted_at())
        .expect("valid submission");
    service
        .approve(&record.id, decided_at())
        .expect("pending record approves")
}

pub(super) fn application_router_with_service(
    service: CreditApplicationService<InMemoryLedger>,
) -> axum::Router {
    application_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

/// Ledger whose backing store is offline.
pub(super) struct UnavailableLedger;

impl ApplicationLedger for UnavailableLedger {
    fn next_sequence(&self) -> u64 {
        1
    }

    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, LedgerError> {
        Err(LedgerError::Unavailable("database offline".to_string()))
    }

    fn transition(
        &self,
        _id: &ApplicationId,
        _decision: Decision,
        _now: NaiveDateTime,
    ) -> Result<ApplicationRecord, LedgerError> {
        Err(LedgerError::Unavailable("database offline".to_string()))
    }

    fn get(&self, _id: &ApplicationId) -> Result<ApplicationRecord, LedgerError> {
        Err(LedgerError::Unavailable("database offline".to_string()))
    }

    fn list_by_status(
        &self,
        _status: ApplicationStatus,
    ) -> Result<Vec<ApplicationRecord>, LedgerError> {
        Err(LedgerError::Unavailable("database offline".to_string()))
    }

    fn list_all(&self) -> Result<Vec<ApplicationRecord>, LedgerError> {
        Err(LedgerError::Unavailable("database offline".to_string()))
    }
}
