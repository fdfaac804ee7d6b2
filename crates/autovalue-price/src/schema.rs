//! Per-category feature schemas and their validation against a table.

use std::fmt;

use autovalue_io::{column, Listing, ListingTable, VehicleCategory};
use serde::Serialize;
use tracing::warn;

use crate::error::TrainingError;
use crate::inputs::FeatureValue;

/// A model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Make,
    Model,
    Year,
    MileageAvg,
    Transmission,
    FuelType,
}

/// Whether a feature is label-encoded or passed through as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Categorical,
    Numeric,
}

impl Feature {
    /// Return the table column this feature reads.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Feature::Make => column::MAKE,
            Feature::Model => column::MODEL,
            Feature::Year => column::YEAR,
            Feature::MileageAvg => column::MILEAGE_AVG,
            Feature::Transmission => column::TRANSMISSION,
            Feature::FuelType => column::FUEL_TYPE,
        }
    }

    #[must_use]
    pub fn kind(self) -> FeatureKind {
        match self {
            Feature::Make | Feature::Model | Feature::Transmission | Feature::FuelType => {
                FeatureKind::Categorical
            }
            Feature::Year | Feature::MileageAvg => FeatureKind::Numeric,
        }
    }

    /// Read this feature from a listing; `None` if the listing has no value.
    pub(crate) fn extract(self, listing: &Listing) -> Option<FeatureValue> {
        match self {
            Feature::Make => Some(FeatureValue::Text(listing.make.clone())),
            Feature::Model => Some(FeatureValue::Text(listing.model.clone())),
            Feature::Year => Some(FeatureValue::Number(f64::from(listing.year))),
            Feature::MileageAvg => listing
                .mileage_avg
                .filter(|m| m.is_finite())
                .map(FeatureValue::Number),
            Feature::Transmission => listing.transmission.clone().map(FeatureValue::Text),
            Feature::FuelType => listing.fuel_type.clone().map(FeatureValue::Text),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const CAR_FEATURES: [Feature; 6] = [
    Feature::Make,
    Feature::Model,
    Feature::Year,
    Feature::MileageAvg,
    Feature::Transmission,
    Feature::FuelType,
];

const MOTORCYCLE_FEATURES: [Feature; 3] = [Feature::Make, Feature::Model, Feature::Year];

/// The ordered feature list a category's model is trained on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    category: VehicleCategory,
    features: Vec<Feature>,
}

impl FeatureSchema {
    /// Return the fixed schema for `category`.
    #[must_use]
    pub fn for_category(category: VehicleCategory) -> Self {
        let features = match category {
            VehicleCategory::Car => CAR_FEATURES.to_vec(),
            VehicleCategory::Motorcycle => MOTORCYCLE_FEATURES.to_vec(),
        };
        Self { category, features }
    }

    /// Select the schema for `category` and check every feature is a column of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::MissingFeatures`] naming each absent column.
    pub fn resolve(category: VehicleCategory, table: &ListingTable) -> Result<Self, TrainingError> {
        let schema = Self::for_category(category);
        let missing: Vec<String> = schema
            .features
            .iter()
            .filter(|f| !table.has_column(f.name()))
            .map(|f| f.name().to_string())
            .collect();
        if !missing.is_empty() {
            warn!(%category, ?missing, "table is missing schema features");
            return Err(TrainingError::MissingFeatures { category, missing });
        }
        Ok(schema)
    }

    #[must_use]
    pub fn category(&self) -> VehicleCategory {
        self.category
    }

    /// Return the features in model column order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Return the feature names in model column order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name().to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn car_schema_order() {
        let schema = FeatureSchema::for_category(VehicleCategory::Car);
        assert_eq!(
            schema.names(),
            ["make", "model", "year", "mileage_avg", "transmission", "fuel_type"]
        );
    }

    #[test]
    fn motorcycle_schema_order() {
        let schema = FeatureSchema::for_category(VehicleCategory::Motorcycle);
        assert_eq!(schema.names(), ["make", "model", "year"]);
    }

    #[test]
    fn missing_fuel_type_is_named() {
        let table = ListingTable::new(
            VehicleCategory::Car,
            columns(&["make", "model", "year", "price", "age", "mileage_avg", "transmission"]),
            vec![],
        );
        let err = FeatureSchema::resolve(VehicleCategory::Car, &table).unwrap_err();
        match err {
            TrainingError::MissingFeatures { category, missing } => {
                assert_eq!(category, VehicleCategory::Car);
                assert_eq!(missing, ["fuel_type"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn motorcycle_table_without_car_columns_resolves() {
        let table = ListingTable::from_listings(VehicleCategory::Motorcycle, vec![]);
        let schema = FeatureSchema::resolve(VehicleCategory::Motorcycle, &table).unwrap();
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn kinds() {
        assert_eq!(Feature::Make.kind(), FeatureKind::Categorical);
        assert_eq!(Feature::FuelType.kind(), FeatureKind::Categorical);
        assert_eq!(Feature::Year.kind(), FeatureKind::Numeric);
        assert_eq!(Feature::MileageAvg.kind(), FeatureKind::Numeric);
    }

    #[test]
    fn extract_skips_absent_mileage() {
        let listing = Listing::new("Honda", "Civic", 2018, 70_000.0);
        assert!(Feature::MileageAvg.extract(&listing).is_none());
        assert_eq!(
            Feature::Year.extract(&listing),
            Some(FeatureValue::Number(2018.0))
        );
    }
}
