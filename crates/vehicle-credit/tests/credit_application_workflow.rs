//! Integration specifications for the vehicle credit application workflow.
//!
//! Scenarios go through the public service facade so that intake validation, the approval
//! ledger, and contract rendering are exercised together.

mod common {
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;

    use vehicle_credit::workflows::credit::{
        ApplicationInput, CreditApplicationService, CreditConfig, InMemoryLedger, MaritalStatus,
        VehicleCatalog,
    };

    pub(super) fn moment(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, day)
            .expect("valid date")
            .and_hms_opt(hour, 0, 0)
            .expect("valid time")
    }

    pub(super) fn submission() -> ApplicationInput {
        ApplicationInput {
            customer_name: "Agus Wijaya".to_string(),
            nik: "3273010101900001".to_string(),
            phone: "085677778888".to_string(),
            email: None,
            address: None,
            marital_status: MaritalStatus::Single,
            vehicle: "Honda CR-V 1.5 Turbo".to_string(),
            loan_amount: dec!(250000000),
            dp: dec!(50000000),
            tenor: 48,
            documents: vec!["KTP".to_string(), "NPWP".to_string()],
        }
    }

    pub(super) fn build_service() -> (CreditApplicationService<InMemoryLedger>, Arc<InMemoryLedger>)
    {
        let ledger = Arc::new(InMemoryLedger::new());
        let service = CreditApplicationService::new(
            ledger.clone(),
            VehicleCatalog::standard(),
            CreditConfig::default(),
        );
        (service, ledger)
    }
}

mod lifecycle {
    use super::common::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use vehicle_credit::workflows::credit::{
        ApplicationLedger, ApplicationStatus, CreditServiceError, LedgerError, RenderError,
    };

    #[test]
    fn submitted_application_is_approved_and_contracted() {
        let (service, ledger) = build_service();

        let record = service
            .submit(submission(), moment(7, 10))
            .expect("submission accepted");
        assert_eq!(record.status, ApplicationStatus::Pending);
        assert!(record.financing.monthly_payment > Decimal::ZERO);
        assert!(ledger.get(&record.id).expect("stored").approved_at.is_none());

        service
            .approve(&record.id, moment(8, 9))
            .expect("approval accepted");

        let contract = service
            .contract(&record.id, moment(8, 15))
            .expect("contract generated");
        let stored = ledger.get(&record.id).expect("stored");
        let installment = vehicle_credit::workflows::credit::contract::format_rupiah(
            stored.financing.monthly_payment,
        );

        assert!(contract.body.contains("Jumlah Pembiayaan: Rp 200.000.000"));
        assert!(contract
            .body
            .contains(&format!("Angsuran per Bulan: Rp {installment}")));
        assert!(contract.body.contains("Tanggal: 8/11/2025"));
        assert_eq!(contract.filename, "Kontrak_APP001_Agus_Wijaya.txt");
        assert_eq!(stored.financing.monthly_payment, dec!(4882584));
    }

    #[test]
    fn decided_applications_cannot_change() {
        let (service, ledger) = build_service();
        let record = service
            .submit(submission(), moment(7, 10))
            .expect("submission accepted");
        service
            .reject(&record.id, moment(7, 12))
            .expect("rejection accepted");
        let before = ledger.get(&record.id).expect("stored");

        assert!(matches!(
            service.approve(&record.id, moment(7, 13)),
            Err(CreditServiceError::Ledger(LedgerError::InvalidTransition { .. }))
        ));
        assert!(matches!(
            service.contract(&record.id, moment(7, 13)),
            Err(CreditServiceError::Render(RenderError::NotApproved { .. }))
        ));
        assert_eq!(ledger.get(&record.id).expect("stored"), before);
    }

    #[test]
    fn ids_follow_submission_order() {
        let (service, _) = build_service();
        let ids: Vec<String> = (0..3)
            .map(|_| {
                service
                    .submit(submission(), moment(7, 10))
                    .expect("submission accepted")
                    .id
                    .0
            })
            .collect();
        assert_eq!(ids, vec!["APP001", "APP002", "APP003"]);
    }
}

mod quoting {
    use rust_decimal_macros::dec;
    use vehicle_credit::workflows::credit::compute_monthly_payment;

    #[test]
    fn reference_amortization() {
        let payment = compute_monthly_payment(dec!(120000000), dec!(8), 36).expect("valid");
        assert!(payment > dec!(3750000) && payment < dec!(3770000));
    }
}
