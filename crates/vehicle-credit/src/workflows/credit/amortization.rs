use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::domain::Tenor;

const DEFAULT_ANNUAL_RATE_PERCENT: Decimal = dec!(8);
const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Fixed-rate amortization: the level monthly installment repaying `principal` over
/// `term_months` at `annual_rate_percent` per year, rounded to whole currency units.
///
/// Returns `None` outside the valid domain (non-positive principal or term, negative rate).
pub fn compute_monthly_payment(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: u32,
) -> Option<Decimal> {
    if principal <= Decimal::ZERO || annual_rate_percent < Decimal::ZERO || term_months == 0 {
        return None;
    }

    let term = Decimal::from(term_months);
    let monthly_rate = annual_rate_percent / PERCENT / MONTHS_PER_YEAR;

    let payment = if monthly_rate.is_zero() {
        principal.checked_div(term)?
    } else {
        let growth = (Decimal::ONE + monthly_rate).checked_powu(u64::from(term_months))?;
        let numerator = principal.checked_mul(monthly_rate)?.checked_mul(growth)?;
        numerator.checked_div(growth - Decimal::ONE)?
    };

    Some(payment.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// Rate assumption applied to every quote and submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub annual_rate_percent: Decimal,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            annual_rate_percent: DEFAULT_ANNUAL_RATE_PERCENT,
        }
    }
}

/// Calculator bound to a configured rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizationCalculator {
    config: CalculatorConfig,
}

impl AmortizationCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        let config = if config.annual_rate_percent < Decimal::ZERO {
            CalculatorConfig::default()
        } else {
            config
        };
        Self { config }
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        self.config.annual_rate_percent
    }

    pub fn monthly_payment(&self, principal: Decimal, tenor: Tenor) -> Option<Decimal> {
        compute_monthly_payment(principal, self.config.annual_rate_percent, tenor.months())
    }

    /// Live preview over partially edited financing fields. Yields nothing until every
    /// field is present and describes a positive principal over an offered tenor, and
    /// nothing for principals whose installment rounds to zero.
    pub fn quote(&self, request: &QuoteRequest) -> Option<PaymentQuote> {
        let loan_amount = request.loan_amount?;
        let dp = request.dp?;
        let tenor = Tenor::from_months(request.tenor?)?;

        if dp < Decimal::ZERO || dp >= loan_amount {
            return None;
        }

        let principal = loan_amount - dp;
        let monthly_payment = self
            .monthly_payment(principal, tenor)
            .filter(|payment| !payment.is_zero())?;
        Some(PaymentQuote {
            principal,
            tenor,
            annual_rate_percent: self.config.annual_rate_percent,
            monthly_payment,
        })
    }
}

/// Financing fields as they stand while the form is being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub loan_amount: Option<Decimal>,
    #[serde(default)]
    pub dp: Option<Decimal>,
    #[serde(default)]
    pub tenor: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentQuote {
    pub principal: Decimal,
    pub tenor: Tenor,
    pub annual_rate_percent: Decimal,
    pub monthly_payment: Decimal,
}
