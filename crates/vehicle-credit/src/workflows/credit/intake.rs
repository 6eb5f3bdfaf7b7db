use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::amortization::AmortizationCalculator;
use super::catalog::VehicleCatalog;
use super::domain::{
    Applicant, ApplicationId, ApplicationInput, ApplicationRecord, ApplicationStatus,
    FinancingTerms, Tenor,
};

const NIK_LENGTH: usize = 16;

/// Intake form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationField {
    CustomerName,
    Nik,
    Phone,
    Email,
    Vehicle,
    LoanAmount,
    Dp,
    Tenor,
}

impl ApplicationField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CustomerName => "customer_name",
            Self::Nik => "nik",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Vehicle => "vehicle",
            Self::LoanAmount => "loan_amount",
            Self::Dp => "dp",
            Self::Tenor => "tenor",
        }
    }
}

/// A single rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}: {reason}", .field.label())]
pub struct ValidationError {
    pub field: ApplicationField,
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(field: ApplicationField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Every validation failure found in one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn has_field(&self, field: ApplicationField) -> bool {
        self.0.iter().any(|error| error.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "application rejected at validation")?;
        for (index, error) in self.0.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a raw form snapshot and build the pending record it describes.
///
/// Nothing is stored here; the caller inserts the record into a ledger afterwards.
pub fn create_application(
    input: ApplicationInput,
    sequence_number: u64,
    now: NaiveDateTime,
    catalog: &VehicleCatalog,
    calculator: &AmortizationCalculator,
) -> Result<ApplicationRecord, ValidationErrors> {
    validate_application(input, catalog, calculator)
        .map(|validated| validated.into_record(sequence_number, now))
}

/// Form snapshot that passed validation, with its installment already computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedApplication {
    applicant: Applicant,
    financing: FinancingTerms,
    documents: Vec<String>,
}

impl ValidatedApplication {
    pub fn financing(&self) -> &FinancingTerms {
        &self.financing
    }

    /// Stamp identity and submission time onto the validated snapshot.
    pub fn into_record(self, sequence_number: u64, now: NaiveDateTime) -> ApplicationRecord {
        ApplicationRecord {
            id: ApplicationId::from_sequence(sequence_number),
            applicant: self.applicant,
            financing: self.financing,
            status: ApplicationStatus::Pending,
            submitted_at: now,
            approved_at: None,
            decided_at: None,
            documents: self.documents,
        }
    }
}

pub fn validate_application(
    input: ApplicationInput,
    catalog: &VehicleCatalog,
    calculator: &AmortizationCalculator,
) -> Result<ValidatedApplication, ValidationErrors> {
    let mut errors = Vec::new();

    let customer_name = input.customer_name.trim().to_string();
    if customer_name.is_empty() {
        errors.push(ValidationError::new(
            ApplicationField::CustomerName,
            "customer name is required",
        ));
    }

    let nik = input.nik.trim().to_string();
    if nik.len() != NIK_LENGTH || !nik.chars().all(|c| c.is_ascii_digit()) {
        errors.push(ValidationError::new(
            ApplicationField::Nik,
            format!("NIK must be exactly {NIK_LENGTH} digits"),
        ));
    }

    let phone = input.phone.trim().to_string();
    if phone.is_empty() {
        errors.push(ValidationError::new(
            ApplicationField::Phone,
            "phone number is required",
        ));
    }

    let email = non_blank(input.email);
    if let Some(address) = email.as_deref() {
        if !looks_like_email(address) {
            errors.push(ValidationError::new(
                ApplicationField::Email,
                format!("'{address}' is not a valid e-mail address"),
            ));
        }
    }

    if !catalog.contains(&input.vehicle) {
        errors.push(ValidationError::new(
            ApplicationField::Vehicle,
            format!("'{}' is not in the vehicle catalog", input.vehicle),
        ));
    }

    let loan_amount = input.loan_amount;
    if loan_amount <= Decimal::ZERO {
        errors.push(ValidationError::new(
            ApplicationField::LoanAmount,
            "vehicle price must be greater than zero",
        ));
    }

    let dp = input.dp;
    if dp < Decimal::ZERO {
        errors.push(ValidationError::new(
            ApplicationField::Dp,
            "down payment cannot be negative",
        ));
    } else if loan_amount > Decimal::ZERO && dp >= loan_amount {
        errors.push(ValidationError::new(
            ApplicationField::Dp,
            "down payment must be less than the vehicle price",
        ));
    }

    let tenor = Tenor::from_months(input.tenor);
    if tenor.is_none() {
        errors.push(ValidationError::new(
            ApplicationField::Tenor,
            format!(
                "tenor must be one of 12, 24, 36, 48 or 60 months (got {})",
                input.tenor
            ),
        ));
    }

    let monthly_payment = match tenor {
        Some(tenor) if errors.is_empty() => {
            match calculator.monthly_payment(loan_amount - dp, tenor) {
                Some(payment) if payment.is_zero() => {
                    errors.push(ValidationError::new(
                        ApplicationField::LoanAmount,
                        "financing amount is too small to produce a monthly installment",
                    ));
                    None
                }
                payment => payment,
            }
        }
        _ => None,
    };

    let (Some(tenor), Some(monthly_payment)) = (tenor, monthly_payment) else {
        if errors.is_empty() {
            errors.push(ValidationError::new(
                ApplicationField::LoanAmount,
                "financing amount is outside the calculable range",
            ));
        }
        return Err(ValidationErrors(errors));
    };

    Ok(ValidatedApplication {
        applicant: Applicant {
            customer_name,
            nik,
            phone,
            email,
            address: non_blank(input.address),
            marital_status: input.marital_status,
        },
        financing: FinancingTerms {
            vehicle: input.vehicle,
            loan_amount,
            dp,
            tenor,
            monthly_payment,
        },
        documents: input.documents,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
