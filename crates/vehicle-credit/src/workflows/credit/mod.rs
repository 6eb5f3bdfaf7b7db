//! Vehicle credit applications: installment quoting, intake validation, the approval
//! ledger, and contract rendering.
//!
//! `CreditApplicationService` is the facade presentation layers call. The pieces below it
//! are usable on their own: the calculator and renderer are pure, and the ledger trait lets
//! storage be swapped without touching either.

pub mod amortization;
pub mod catalog;
pub mod contract;
pub mod domain;
pub mod intake;
pub mod ledger;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use amortization::{
    compute_monthly_payment, AmortizationCalculator, CalculatorConfig, PaymentQuote, QuoteRequest,
};
pub use catalog::{CatalogError, VehicleCatalog, VehicleListing};
pub use contract::{ContractDocument, ContractRenderer, ContractTemplate, RenderError};
pub use domain::{
    Applicant, ApplicationId, ApplicationInput, ApplicationRecord, ApplicationStatus,
    ApplicationStatusView, Decision, FinancingTerms, MaritalStatus, StatusCounts, Tenor,
};
pub use intake::{
    create_application, validate_application, ApplicationField, ValidatedApplication,
    ValidationError, ValidationErrors,
};
pub use ledger::{ApplicationLedger, InMemoryLedger, LedgerError};
pub use router::application_router;
pub use service::{CreditApplicationService, CreditConfig, CreditServiceError};
