//! Domain types for autovalue-io.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::IoError;

/// Column names shared by the loader, the filter layer and the feature schema.
pub mod column {
    /// Vehicle manufacturer.
    pub const MAKE: &str = "make";
    /// Vehicle model.
    pub const MODEL: &str = "model";
    /// Manufacturing year.
    pub const YEAR: &str = "year";
    /// Asking price in RM.
    pub const PRICE: &str = "price";
    /// Derived `current_year - year`.
    pub const AGE: &str = "age";
    /// Lower odometer reading of the advertised band.
    pub const MILEAGE_MIN: &str = "mileage_min";
    /// Upper odometer reading of the advertised band.
    pub const MILEAGE_MAX: &str = "mileage_max";
    /// Mean of the odometer band, or a pre-derived column.
    pub const MILEAGE_AVG: &str = "mileage_avg";
    /// Gearbox type.
    pub const TRANSMISSION: &str = "transmission";
    /// Lowercased fuel type.
    pub const FUEL_TYPE: &str = "fuel_type";
    /// Free-text listing location.
    pub const LOCATION: &str = "location";
    /// Link to the original advertisement.
    pub const AD_URL: &str = "ad_url";
}

/// Return the current calendar year in local time.
#[must_use]
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Kind of vehicle a listing table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    /// Passenger cars.
    Car,
    /// Motorcycles.
    Motorcycle,
}

impl VehicleCategory {
    /// Exclusive upper bound on a plausible asking price (RM).
    #[must_use]
    pub fn price_cap(self) -> f64 {
        match self {
            VehicleCategory::Car => 1_000_000.0,
            VehicleCategory::Motorcycle => 100_000.0,
        }
    }

    /// Return the lowercase category name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleCategory::Car => "car",
            VehicleCategory::Motorcycle => "motorcycle",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleCategory {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" | "cars" => Ok(VehicleCategory::Car),
            "motorcycle" | "motorcycles" | "motor" => Ok(VehicleCategory::Motorcycle),
            _ => Err(IoError::UnknownCategory { name: s.to_string() }),
        }
    }
}

/// One classified-ad listing.
///
/// `make`, `model`, `year` and `price` are always populated in a loaded
/// table; the remaining fields are empty when the source has no value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Manufacturing year.
    pub year: i32,
    /// Asking price in RM.
    pub price: f64,
    /// Age in years relative to the load-time calendar year.
    pub age: i32,
    /// Average odometer reading in km.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage_avg: Option<f64>,
    /// Gearbox type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    /// Fuel type, lowercased.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    /// Listing location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Advertisement URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_url: Option<String>,
}

impl Listing {
    /// Create a listing with the mandatory fields; age is taken against [`current_year`].
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: i32, price: f64) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year,
            price,
            age: current_year() - year,
            mileage_avg: None,
            transmission: None,
            fuel_type: None,
            location: None,
            ad_url: None,
        }
    }

    /// Set the average mileage.
    #[must_use]
    pub fn with_mileage(mut self, mileage_avg: f64) -> Self {
        self.mileage_avg = Some(mileage_avg);
        self
    }

    /// Set the transmission.
    #[must_use]
    pub fn with_transmission(mut self, transmission: impl Into<String>) -> Self {
        self.transmission = Some(transmission.into());
        self
    }

    /// Set the fuel type; stored lowercased.
    #[must_use]
    pub fn with_fuel_type(mut self, fuel_type: &str) -> Self {
        self.fuel_type = Some(fuel_type.to_lowercase());
        self
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the advertisement URL.
    #[must_use]
    pub fn with_ad_url(mut self, ad_url: impl Into<String>) -> Self {
        self.ad_url = Some(ad_url.into());
        self
    }
}

/// A validated, rectangular table of listings for one vehicle category.
///
/// `columns` records which columns the source provided (plus derived ones);
/// it is what schema validation checks against.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingTable {
    category: VehicleCategory,
    columns: Vec<String>,
    listings: Vec<Listing>,
}

impl ListingTable {
    /// Create a table from an explicit column list.
    pub fn new(category: VehicleCategory, columns: Vec<String>, listings: Vec<Listing>) -> Self {
        Self {
            category,
            columns,
            listings,
        }
    }

    /// Create a table carrying the standard columns for `category`.
    pub fn from_listings(category: VehicleCategory, listings: Vec<Listing>) -> Self {
        let mut columns = vec![
            column::MAKE,
            column::MODEL,
            column::YEAR,
            column::PRICE,
            column::AGE,
        ];
        if category == VehicleCategory::Car {
            columns.extend([column::MILEAGE_AVG, column::TRANSMISSION, column::FUEL_TYPE]);
        }
        Self::new(
            category,
            columns.into_iter().map(String::from).collect(),
            listings,
        )
    }

    /// Return the vehicle category.
    #[must_use]
    pub fn category(&self) -> VehicleCategory {
        self.category
    }

    /// Return the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return `true` if the table carries a column named `name`.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Return the listings in source order.
    #[must_use]
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Return the number of listings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Return `true` if the table has no listings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Build a table with the same category and columns but other listings.
    pub(crate) fn with_listings(&self, listings: Vec<Listing>) -> Self {
        Self {
            category: self.category,
            columns: self.columns.clone(),
            listings,
        }
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
