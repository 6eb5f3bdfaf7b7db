use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A financeable vehicle and its reference list price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleListing {
    pub name: String,
    pub price: Decimal,
}

/// Fixed catalog of vehicles offered on the intake form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleCatalog {
    vehicles: Vec<VehicleListing>,
}

impl VehicleCatalog {
    pub fn new(vehicles: Vec<VehicleListing>) -> Self {
        Self { vehicles }
    }

    pub fn standard() -> Self {
        let entries = [
            ("Toyota Avanza 1.3 G MT", dec!(250000000)),
            ("Honda CR-V 1.5 Turbo", dec!(450000000)),
            ("Mitsubishi Xpander Ultimate", dec!(280000000)),
            ("Suzuki Ertiga GX MT", dec!(230000000)),
            ("Daihatsu Terios R MT", dec!(260000000)),
        ];

        Self::new(
            entries
                .into_iter()
                .map(|(name, price)| VehicleListing {
                    name: name.to_string(),
                    price,
                })
                .collect(),
        )
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a catalog from CSV with a `name,price` header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut vehicles: Vec<VehicleListing> = Vec::new();

        for row in csv_reader.deserialize::<VehicleListing>() {
            let listing = row?;
            if listing.name.is_empty() {
                return Err(CatalogError::MissingName);
            }
            if listing.price <= Decimal::ZERO {
                return Err(CatalogError::InvalidPrice { name: listing.name });
            }
            if vehicles.iter().any(|existing| existing.name == listing.name) {
                return Err(CatalogError::DuplicateVehicle { name: listing.name });
            }
            vehicles.push(listing);
        }

        if vehicles.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self::new(vehicles))
    }

    pub fn find(&self, name: &str) -> Option<&VehicleListing> {
        self.vehicles.iter().find(|listing| listing.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn vehicles(&self) -> &[VehicleListing] {
        &self.vehicles
    }
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read vehicle catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid vehicle catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("vehicle catalog row is missing a name")]
    MissingName,
    #[error("vehicle '{name}' must have a positive price")]
    InvalidPrice { name: String },
    #[error("vehicle '{name}' is listed more than once")]
    DuplicateVehicle { name: String },
    #[error("vehicle catalog contains no vehicles")]
    Empty,
}
