use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus, Decision, StatusCounts};

/// Storage abstraction for application records and their lifecycle transitions.
///
/// Implementations must apply `transition` atomically: the status check and the update
/// happen under one exclusive section so that two decisions on the same id cannot both win.
/// `insert` only admits undecided records (see [`ensure_insertable`]); decisions enter the
/// ledger through `transition` alone.
pub trait ApplicationLedger: Send + Sync {
    /// Reserve the next creation sequence number. Numbers are never reused.
    fn next_sequence(&self) -> u64;
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, LedgerError>;
    fn transition(
        &self,
        id: &ApplicationId,
        decision: Decision,
        now: NaiveDateTime,
    ) -> Result<ApplicationRecord, LedgerError>;
    fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, LedgerError>;
    /// Snapshot of records in `status`, in creation order.
    fn list_by_status(&self, status: ApplicationStatus)
        -> Result<Vec<ApplicationRecord>, LedgerError>;
    /// Snapshot of every record, in creation order.
    fn list_all(&self) -> Result<Vec<ApplicationRecord>, LedgerError>;

    fn status_counts(&self) -> Result<StatusCounts, LedgerError> {
        let mut counts = StatusCounts::default();
        for record in self.list_all()? {
            counts.record(record.status);
        }
        Ok(counts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("application {0} already exists")]
    DuplicateId(ApplicationId),
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("application {id} is already {} and cannot be decided again", .current.label())]
    InvalidTransition {
        id: ApplicationId,
        current: ApplicationStatus,
    },
    #[error("application {id} cannot be inserted: {reason}")]
    InvalidRecord { id: ApplicationId, reason: String },
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Reject records that did not start life as a fresh pending application.
pub fn ensure_insertable(record: &ApplicationRecord) -> Result<(), LedgerError> {
    let invalid = |reason: String| LedgerError::InvalidRecord {
        id: record.id.clone(),
        reason,
    };

    if record.status != ApplicationStatus::Pending {
        return Err(invalid(format!(
            "status is {}, only pending records can be inserted",
            record.status.label()
        )));
    }
    if record.approved_at.is_some() || record.decided_at.is_some() {
        return Err(invalid("pending records cannot carry a decision timestamp".to_string()));
    }

    let financing = &record.financing;
    if financing.loan_amount <= Decimal::ZERO {
        return Err(invalid("loan amount must be positive".to_string()));
    }
    if financing.dp < Decimal::ZERO || financing.dp >= financing.loan_amount {
        return Err(invalid(
            "down payment must be non-negative and below the loan amount".to_string(),
        ));
    }
    if financing.monthly_payment < Decimal::ZERO {
        return Err(invalid("monthly payment cannot be negative".to_string()));
    }
    Ok(())
}

/// Sequence value that must follow an `APPnnn` id, if the id is sequence-shaped.
fn sequence_after(id: &ApplicationId) -> Result<Option<u64>, LedgerError> {
    let Some(number) = id
        .as_str()
        .strip_prefix("APP")
        .and_then(|digits| digits.parse::<u64>().ok())
    else {
        return Ok(None);
    };

    number
        .checked_add(1)
        .map(Some)
        .ok_or_else(|| LedgerError::InvalidRecord {
            id: id.clone(),
            reason: "id is beyond the sequence range".to_string(),
        })
}

#[derive(Debug, Default)]
struct LedgerState {
    order: Vec<ApplicationId>,
    records: HashMap<ApplicationId, ApplicationRecord>,
}

impl LedgerState {
    fn snapshot<F>(&self, mut keep: F) -> Vec<ApplicationRecord>
    where
        F: FnMut(&ApplicationRecord) -> bool,
    {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|record| keep(record))
            .cloned()
            .collect()
    }
}

/// Process-local ledger keeping records in creation order.
#[derive(Debug)]
pub struct InMemoryLedger {
    sequence: AtomicU64,
    state: Mutex<LedgerState>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self {
            sequence: AtomicU64::new(1),
            state: Mutex::new(LedgerState::default()),
        }
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger mutex poisoned".to_string()))
    }
}

impl ApplicationLedger for InMemoryLedger {
    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, LedgerError> {
        ensure_insertable(&record)?;
        let next = sequence_after(&record.id)?;

        let mut state = self.lock()?;
        if state.records.contains_key(&record.id) {
            return Err(LedgerError::DuplicateId(record.id));
        }

        // Keep the sequence ahead of externally numbered records such as seeded fixtures.
        if let Some(next) = next {
            self.sequence.fetch_max(next, Ordering::Relaxed);
        }
        state.order.push(record.id.clone());
        state.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn transition(
        &self,
        id: &ApplicationId,
        decision: Decision,
        now: NaiveDateTime,
    ) -> Result<ApplicationRecord, LedgerError> {
        let mut state = self.lock()?;
        let record = state
            .records
            .get_mut(id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;

        record
            .decide(decision, now)
            .map_err(|current| LedgerError::InvalidTransition {
                id: id.clone(),
                current,
            })?;
        Ok(record.clone())
    }

    fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, LedgerError> {
        let state = self.lock()?;
        state
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.clone()))
    }

    fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ApplicationRecord>, LedgerError> {
        let state = self.lock()?;
        Ok(state.snapshot(|record| record.status == status))
    }

    fn list_all(&self) -> Result<Vec<ApplicationRecord>, LedgerError> {
        let state = self.lock()?;
        Ok(state.snapshot(|_| true))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::workflows::credit::domain::{Applicant, FinancingTerms, MaritalStatus, Tenor};

    fn record(sequence: u64) -> ApplicationRecord {
        ApplicationRecord {
            id: ApplicationId::from_sequence(sequence),
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
            submitted_at: now(),
            approved_at: None,
            decided_at: None,
            documents: vec!["KTP".to_string()],
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 7)
            .and_then(|date| date.and_hms_opt(10, 30, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn poisoned_lock_reports_unavailable() {
        let ledger = Arc::new(InMemoryLedger::new());
        let stored = ledger.insert(record(1)).expect("insert");

        let holder = Arc::clone(&ledger);
        let outcome = thread::spawn(move || {
            let _guard = holder.state.lock().expect("lock acquired");
            panic!("worker failed while holding the ledger");
        })
        .join();
        assert!(outcome.is_err());

        assert!(matches!(
            ledger.get(&stored.id),
            Err(LedgerError::Unavailable(_))
        ));
        assert!(matches!(
            ledger.transition(&stored.id, Decision::Approved, now()),
            Err(LedgerError::Unavailable(_))
        ));
        assert!(matches!(
            ledger.insert(record(2)),
            Err(LedgerError::Unavailable(_))
        ));
        assert!(matches!(
            ledger.list_by_status(ApplicationStatus::Pending),
            Err(LedgerError::Unavailable(_))
        ));
    }
}
