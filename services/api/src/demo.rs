use crate::infra::{at_time, build_credit_service, parse_amount, parse_date};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::PathBuf;
use vehicle_credit::config::AppConfig;
use vehicle_credit::error::AppError;
use vehicle_credit::workflows::credit::contract::format_rupiah;
use vehicle_credit::workflows::credit::{
    Applicant, ApplicationId, ApplicationInput, ApplicationLedger, ApplicationRecord,
    ApplicationStatus, CreditApplicationService, FinancingTerms, MaritalStatus, QuoteRequest,
    Tenor,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Business date used for the new submission and its contract (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Applicant name for the new submission.
    #[arg(long, default_value = "Dewi Lestari")]
    pub(crate) customer_name: String,
    /// Vehicle from the catalog to finance.
    #[arg(long, default_value = "Mitsubishi Xpander Ultimate")]
    pub(crate) vehicle: String,
    /// Loan amount; defaults to the catalog price of the vehicle.
    #[arg(long, value_parser = parse_amount)]
    pub(crate) loan_amount: Option<Decimal>,
    /// Down payment.
    #[arg(long, value_parser = parse_amount, default_value = "60000000")]
    pub(crate) dp: Decimal,
    /// Tenor in months (12, 24, 36, 48 or 60).
    #[arg(long, default_value_t = 36)]
    pub(crate) tenor: u32,
    /// Write the generated contract into this directory.
    #[arg(long)]
    pub(crate) contract_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Vehicle whose catalog price is used when no loan amount is given.
    #[arg(long)]
    pub(crate) vehicle: Option<String>,
    /// Loan amount (vehicle price).
    #[arg(long, value_parser = parse_amount)]
    pub(crate) loan_amount: Option<Decimal>,
    /// Down payment.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub(crate) dp: Decimal,
    /// Tenor in months (12, 24, 36, 48 or 60).
    #[arg(long)]
    pub(crate) tenor: u32,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_credit_service(&config)?;

    let catalog_price = args
        .vehicle
        .as_deref()
        .and_then(|name| service.catalog().find(name))
        .map(|listing| listing.price);
    if let (Some(name), None) = (args.vehicle.as_deref(), catalog_price) {
        println!("Vehicle '{name}' is not in the catalog");
    }

    let request = QuoteRequest {
        loan_amount: args.loan_amount.or(catalog_price),
        dp: Some(args.dp),
        tenor: Some(args.tenor),
    };

    match service.quote(&request) {
        Some(quote) => {
            println!(
                "Pokok pinjaman: Rp {} | tenor {} bulan | bunga {}% per tahun",
                format_rupiah(quote.principal),
                quote.tenor.months(),
                quote.annual_rate_percent
            );
            println!(
                "Angsuran per bulan: Rp {}",
                format_rupiah(quote.monthly_payment)
            );
        }
        None => println!(
            "No installment preview: loan amount must exceed the down payment and the tenor \
             must be one of 12, 24, 36, 48 or 60 months"
        ),
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        date,
        customer_name,
        vehicle,
        loan_amount,
        dp,
        tenor,
        contract_dir,
    } = args;

    let now = date
        .map(|date| at_time(date, 9, 0))
        .unwrap_or_else(|| Local::now().naive_local());
    let config = AppConfig::load()?;
    let service = build_credit_service(&config)?;

    println!("Vehicle credit workflow demo");
    seed_sample_applications(&service)?;
    render_dashboard(&service)?;

    let loan_amount = loan_amount
        .or_else(|| service.catalog().find(&vehicle).map(|listing| listing.price))
        .unwrap_or(Decimal::ZERO);
    let input = ApplicationInput {
        customer_name,
        nik: "3174015506900002".to_string(),
        phone: "081298765432".to_string(),
        email: Some("dewi.lestari@example.co.id".to_string()),
        address: Some("Jl. Melati No. 12, Jakarta Selatan".to_string()),
        marital_status: MaritalStatus::Married,
        vehicle,
        loan_amount,
        dp,
        tenor,
        documents: ["KTP", "Kartu Keluarga", "Slip Gaji"]
            .iter()
            .map(|name| name.to_string())
            .collect(),
    };

    println!("\nCustomer submission");
    let record = match service.submit(input, now) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- Received application {} -> {}",
        record.id,
        record.status.display_label()
    );
    println!(
        "  {} | pokok Rp {} | {} bulan | angsuran Rp {}",
        record.financing.vehicle,
        format_rupiah(record.financing.principal()),
        record.financing.tenor.months(),
        format_rupiah(record.financing.monthly_payment)
    );

    println!("\nApprover decision");
    let approved = service.approve(&record.id, now)?;
    println!("- {} -> {}", approved.id, approved.status.display_label());

    let contract = service.contract(&approved.id, now)?;
    println!("\nContract {} ({})", contract.contract_number, contract.filename);
    println!("{}", contract.body);

    if let Some(dir) = contract_dir {
        let path = dir.join(&contract.filename);
        std::fs::write(&path, contract.body.as_bytes())?;
        println!("Contract written to {}", path.display());
    }

    println!();
    render_dashboard(&service)?;
    Ok(())
}

fn render_dashboard<L>(service: &CreditApplicationService<L>) -> Result<(), AppError>
where
    L: ApplicationLedger + 'static,
{
    let counts = service.summary()?;
    println!(
        "Dashboard: {} applications | {} pending | {} approved | {} rejected",
        counts.total(),
        counts.pending,
        counts.approved,
        counts.rejected
    );

    let pending = service.list(Some(ApplicationStatus::Pending))?;
    if pending.is_empty() {
        println!("  Approval queue: empty");
    } else {
        println!("  Approval queue:");
        for record in &pending {
            println!(
                "    - {} {} | {} | Rp {} / bulan",
                record.id,
                record.applicant.customer_name,
                record.financing.vehicle,
                format_rupiah(record.financing.monthly_payment)
            );
        }
    }
    Ok(())
}

/// Two historical applications whose installments were captured before the current rate.
fn sample_applications() -> Vec<(ApplicationRecord, Option<NaiveDateTime>)> {
    let day = |day: u32| NaiveDate::from_ymd_opt(2025, 11, day).unwrap_or(NaiveDate::MIN);
    let documents = |names: &[&str]| names.iter().map(|name| name.to_string()).collect();

    vec![
        (
            ApplicationRecord {
                id: ApplicationId::from_sequence(1),
                applicant: Applicant {
                    customer_name: "Budi Santoso".to_string(),
                    nik: "3201012345678901".to_string(),
                    phone: "081234567890".to_string(),
                    email: None,
                    address: None,
                    marital_status: MaritalStatus::Married,
                },
                financing: FinancingTerms {
                    vehicle: "Toyota Avanza 1.3 G MT".to_string(),
                    loan_amount: dec!(150000000),
                    dp: dec!(30000000),
                    tenor: Tenor::Months36,
                    monthly_payment: dec!(4200000),
                },
                status: ApplicationStatus::Pending,
                submitted_at: at_time(day(7), 10, 30),
                approved_at: None,
                decided_at: None,
                documents: documents(&["KTP", "SIM", "Slip Gaji"]),
            },
            None,
        ),
        (
            ApplicationRecord {
                id: ApplicationId::from_sequence(2),
                applicant: Applicant {
                    customer_name: "Siti Rahayu".to_string(),
                    nik: "3201015678901234".to_string(),
                    phone: "081298765432".to_string(),
                    email: None,
                    address: None,
                    marital_status: MaritalStatus::Single,
                },
                financing: FinancingTerms {
                    vehicle: "Honda CR-V 1.5 Turbo".to_string(),
                    loan_amount: dec!(350000000),
                    dp: dec!(100000000),
                    tenor: Tenor::Months48,
                    monthly_payment: dec!(6500000),
                },
                status: ApplicationStatus::Pending,
                submitted_at: at_time(day(6), 14, 20),
                approved_at: None,
                decided_at: None,
                documents: documents(&["KTP", "SIM", "Slip Gaji", "NPWP"]),
            },
            Some(at_time(day(7), 9, 15)),
        ),
    ]
}

fn seed_sample_applications<L>(service: &CreditApplicationService<L>) -> Result<(), AppError>
where
    L: ApplicationLedger + 'static,
{
    for (record, approved_at) in sample_applications() {
        let stored = service.seed(record)?;
        if let Some(approved_at) = approved_at {
            service.approve(&stored.id, approved_at)?;
        }
    }
    Ok(())
}
