use chrono::{NaiveDate, NaiveDateTime};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use vehicle_credit::config::AppConfig;
use vehicle_credit::error::AppError;
use vehicle_credit::workflows::credit::{
    CreditApplicationService, InMemoryLedger, VehicleCatalog,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Catalog from `APP_VEHICLE_CATALOG` when configured, otherwise the standard lineup.
pub(crate) fn load_catalog(config: &AppConfig) -> Result<VehicleCatalog, AppError> {
    match &config.credit.catalog_path {
        Some(path) => {
            let catalog = VehicleCatalog::from_path(path)?;
            info!(
                path = %path.display(),
                vehicles = catalog.vehicles().len(),
                "loaded vehicle catalog"
            );
            Ok(catalog)
        }
        None => Ok(VehicleCatalog::standard()),
    }
}

pub(crate) fn build_credit_service(
    config: &AppConfig,
) -> Result<CreditApplicationService<InMemoryLedger>, AppError> {
    let catalog = load_catalog(config)?;
    Ok(CreditApplicationService::new(
        Arc::new(InMemoryLedger::new()),
        catalog,
        config.credit.engine_config(),
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Accepts plain digits as well as id-ID grouped input such as `250.000.000`.
pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    let normalized = if trimmed.matches('.').count() > 1 || trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };
    let amount = Decimal::from_str(&normalized)
        .map_err(|err| format!("failed to parse '{raw}' as an amount ({err})"))?;
    if amount < Decimal::ZERO {
        return Err(format!("amount must not be negative (got '{raw}')"));
    }
    Ok(amount)
}

pub(crate) fn at_time(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_grouped_and_plain_amounts() {
        assert_eq!(parse_amount("250000000"), Ok(dec!(250000000)));
        assert_eq!(parse_amount("250.000.000"), Ok(dec!(250000000)));
        assert_eq!(parse_amount("1.500.000,50"), Ok(dec!(1500000.50)));
        assert_eq!(parse_amount("12.5"), Ok(dec!(12.5)));
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("lots").is_err());
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_date("2025-11-07"),
            Ok(NaiveDate::from_ymd_opt(2025, 11, 7).expect("valid date"))
        );
        assert!(parse_date("07/11/2025").is_err());
    }
}
