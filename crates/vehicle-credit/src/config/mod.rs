use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::workflows::credit::{CalculatorConfig, ContractTemplate, CreditConfig};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub credit: CreditSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let ansi = environment == AppEnvironment::Development;

        let defaults = CreditConfig::default();
        let annual_rate_percent = match env::var("APP_ANNUAL_RATE_PERCENT") {
            Ok(raw) => parse_rate(&raw)?,
            Err(_) => defaults.calculator.annual_rate_percent,
        };
        let institution_name = env::var("APP_INSTITUTION_NAME")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.contract.institution_name);
        let contract_code = env::var("APP_CONTRACT_CODE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.contract.contract_code);
        let catalog_path = env::var_os("APP_VEHICLE_CATALOG").map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi,
                with_target: false,
            },
            credit: CreditSettings {
                annual_rate_percent,
                institution_name,
                contract_code,
                catalog_path,
            },
        })
    }
}

fn parse_rate(raw: &str) -> Result<Decimal, ConfigError> {
    let invalid = || ConfigError::InvalidRate {
        value: raw.to_string(),
    };
    let rate = Decimal::from_str(raw.trim()).map_err(|_| invalid())?;
    if rate < Decimal::ZERO {
        return Err(invalid());
    }
    Ok(rate)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
    pub with_target: bool,
}

/// Lending assumptions and contract identity.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditSettings {
    pub annual_rate_percent: Decimal,
    pub institution_name: String,
    pub contract_code: String,
    /// Optional CSV replacing the standard vehicle catalog.
    pub catalog_path: Option<PathBuf>,
}

impl CreditSettings {
    pub fn engine_config(&self) -> CreditConfig {
        CreditConfig {
            calculator: CalculatorConfig {
                annual_rate_percent: self.annual_rate_percent,
            },
            contract: ContractTemplate {
                institution_name: self.institution_name.clone(),
                contract_code: self.contract_code.clone(),
            },
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRate { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRate { value } => write!(
                f,
                "APP_ANNUAL_RATE_PERCENT must be a non-negative decimal (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidRate { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
