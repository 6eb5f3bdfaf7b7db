use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted credit applications (`APP001`, `APP002`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("APP{sequence:03}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loan terms offered on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Tenor {
    Months12,
    Months24,
    Months36,
    Months48,
    Months60,
}

impl Tenor {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Months12,
            Self::Months24,
            Self::Months36,
            Self::Months48,
            Self::Months60,
        ]
    }

    pub const fn months(self) -> u32 {
        match self {
            Self::Months12 => 12,
            Self::Months24 => 24,
            Self::Months36 => 36,
            Self::Months48 => 48,
            Self::Months60 => 60,
        }
    }

    pub fn from_months(months: u32) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|tenor| tenor.months() == months)
    }
}

impl TryFrom<u32> for Tenor {
    type Error = String;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        Self::from_months(months).ok_or_else(|| {
            format!("tenor must be one of 12, 24, 36, 48 or 60 months (got {months})")
        })
    }
}

impl From<Tenor> for u32 {
    fn from(tenor: Tenor) -> Self {
        tenor.months()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
    Divorced,
}

impl MaritalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Belum Menikah",
            Self::Married => "Menikah",
            Self::Divorced => "Cerai",
        }
    }
}

/// Lifecycle status of a credit application. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Approved, Self::Rejected]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Customer-facing badge text.
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::Pending => "Menunggu Approval",
            Self::Approved => "Disetujui",
            Self::Rejected => "Ditolak",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Outcome an approver can record against a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub const fn status(self) -> ApplicationStatus {
        match self {
            Self::Approved => ApplicationStatus::Approved,
            Self::Rejected => ApplicationStatus::Rejected,
        }
    }
}

/// Raw form snapshot handed over by the presentation layer after basic type coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInput {
    pub customer_name: String,
    pub nik: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub marital_status: MaritalStatus,
    pub vehicle: String,
    pub loan_amount: Decimal,
    pub dp: Decimal,
    pub tenor: u32,
    #[serde(default)]
    pub documents: Vec<String>,
}

/// Applicant identity and contact details captured at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub customer_name: String,
    pub nik: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub marital_status: MaritalStatus,
}

/// Financing terms snapshotted at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancingTerms {
    pub vehicle: String,
    pub loan_amount: Decimal,
    pub dp: Decimal,
    pub tenor: Tenor,
    pub monthly_payment: Decimal,
}

impl FinancingTerms {
    /// Amount actually financed (vehicle price minus down payment).
    pub fn principal(&self) -> Decimal {
        self.loan_amount - self.dp
    }
}

/// A submitted credit application as held by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub applicant: Applicant,
    pub financing: FinancingTerms,
    pub status: ApplicationStatus,
    pub submitted_at: NaiveDateTime,
    pub approved_at: Option<NaiveDateTime>,
    pub decided_at: Option<NaiveDateTime>,
    pub documents: Vec<String>,
}

impl ApplicationRecord {
    /// Apply a decision to a pending record. Terminal records are left untouched.
    pub(crate) fn decide(
        &mut self,
        decision: Decision,
        now: NaiveDateTime,
    ) -> Result<(), ApplicationStatus> {
        if self.status.is_terminal() {
            return Err(self.status);
        }

        self.status = decision.status();
        self.decided_at = Some(now);
        self.approved_at = match decision {
            Decision::Approved => Some(now),
            Decision::Rejected => None,
        };
        Ok(())
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            customer_name: self.applicant.customer_name.clone(),
            vehicle: self.financing.vehicle.clone(),
            status: self.status.label(),
            status_label: self.status.display_label(),
            monthly_payment: self.financing.monthly_payment,
            submitted_at: self.submitted_at,
            approved_at: self.approved_at,
        }
    }
}

/// Condensed representation used by listings and API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub customer_name: String,
    pub vehicle: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub monthly_payment: Decimal,
    pub submitted_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<NaiveDateTime>,
}

/// Number of applications in each lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: ApplicationStatus) {
        match status {
            ApplicationStatus::Pending => self.pending += 1,
            ApplicationStatus::Approved => self.approved += 1,
            ApplicationStatus::Rejected => self.rejected += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}
