use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use super::amortization::{AmortizationCalculator, CalculatorConfig, PaymentQuote, QuoteRequest};
use super::catalog::VehicleCatalog;
use super::contract::{ContractDocument, ContractRenderer, ContractTemplate, RenderError};
use super::domain::{
    ApplicationId, ApplicationInput, ApplicationRecord, ApplicationStatus, Decision, StatusCounts,
};
use super::intake::{validate_application, ApplicationField, ValidationError, ValidationErrors};
use super::ledger::{ApplicationLedger, LedgerError};

/// Engine settings shared by intake, quoting, and contract rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreditConfig {
    pub calculator: CalculatorConfig,
    pub contract: ContractTemplate,
}

/// Service composing the catalog, calculator, ledger, and contract renderer.
pub struct CreditApplicationService<L> {
    ledger: Arc<L>,
    catalog: Arc<VehicleCatalog>,
    calculator: AmortizationCalculator,
    renderer: ContractRenderer,
}

impl<L> CreditApplicationService<L>
where
    L: ApplicationLedger + 'static,
{
    pub fn new(ledger: Arc<L>, catalog: VehicleCatalog, config: CreditConfig) -> Self {
        Self {
            ledger,
            catalog: Arc::new(catalog),
            calculator: AmortizationCalculator::new(config.calculator),
            renderer: ContractRenderer::new(config.contract),
        }
    }

    pub fn catalog(&self) -> &VehicleCatalog {
        &self.catalog
    }

    /// Recompute the installment preview for the current form state.
    pub fn quote(&self, request: &QuoteRequest) -> Option<PaymentQuote> {
        self.calculator.quote(request)
    }

    /// Validate and store a new pending application.
    pub fn submit(
        &self,
        input: ApplicationInput,
        now: NaiveDateTime,
    ) -> Result<ApplicationRecord, CreditServiceError> {
        let validated = validate_application(input, &self.catalog, &self.calculator).map_err(
            |errors| {
                warn!(error = %errors, "credit application rejected at intake");
                CreditServiceError::Validation(errors)
            },
        )?;

        let record = validated.into_record(self.ledger.next_sequence(), now);
        let stored = self.ledger.insert(record)?;

        info!(
            application_id = %stored.id,
            vehicle = %stored.financing.vehicle,
            monthly_payment = %stored.financing.monthly_payment,
            "credit application submitted"
        );
        Ok(stored)
    }

    pub fn approve(
        &self,
        id: &ApplicationId,
        now: NaiveDateTime,
    ) -> Result<ApplicationRecord, CreditServiceError> {
        self.decide(id, Decision::Approved, now)
    }

    pub fn reject(
        &self,
        id: &ApplicationId,
        now: NaiveDateTime,
    ) -> Result<ApplicationRecord, CreditServiceError> {
        self.decide(id, Decision::Rejected, now)
    }

    /// Record an approver decision against a pending application.
    pub fn decide(
        &self,
        id: &ApplicationId,
        decision: Decision,
        now: NaiveDateTime,
    ) -> Result<ApplicationRecord, CreditServiceError> {
        match self.ledger.transition(id, decision, now) {
            Ok(record) => {
                info!(
                    application_id = %id,
                    status = record.status.label(),
                    "credit application decided"
                );
                Ok(record)
            }
            Err(err) => {
                warn!(application_id = %id, error = %err, "credit decision refused");
                Err(err.into())
            }
        }
    }

    /// Store a pending record whose terms were captured elsewhere (fixtures, migrations).
    /// Its installment is kept as submitted rather than recomputed, but the vehicle must
    /// still be listed and the record must be undecided.
    pub fn seed(&self, record: ApplicationRecord) -> Result<ApplicationRecord, CreditServiceError> {
        if !self.catalog.contains(&record.financing.vehicle) {
            let error = ValidationError::new(
                ApplicationField::Vehicle,
                format!("'{}' is not in the vehicle catalog", record.financing.vehicle),
            );
            return Err(ValidationErrors(vec![error]).into());
        }
        Ok(self.ledger.insert(record)?)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, CreditServiceError> {
        Ok(self.ledger.get(id)?)
    }

    /// Applications newest first, optionally restricted to one status.
    pub fn list(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRecord>, CreditServiceError> {
        let mut records = match status {
            Some(status) => self.ledger.list_by_status(status)?,
            None => self.ledger.list_all()?,
        };
        records.reverse();
        Ok(records)
    }

    pub fn summary(&self) -> Result<StatusCounts, CreditServiceError> {
        Ok(self.ledger.status_counts()?)
    }

    /// Render the contract for an approved application.
    pub fn contract(
        &self,
        id: &ApplicationId,
        now: NaiveDateTime,
    ) -> Result<ContractDocument, CreditServiceError> {
        let record = self.ledger.get(id)?;
        let document = self.renderer.render(&record, now).map_err(|err| {
            warn!(application_id = %id, error = %err, "contract generation blocked");
            err
        })?;

        info!(
            application_id = %id,
            contract_number = %document.contract_number,
            "contract generated"
        );
        Ok(document)
    }
}

/// Error raised by the credit application service.
#[derive(Debug, thiserror::Error)]
pub enum CreditServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
