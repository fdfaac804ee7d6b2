//! Raw feature values supplied to prediction and comparable search.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::PredictionError;
use crate::schema::Feature;

/// A single raw input value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
}

impl FeatureValue {
    /// Return the value as text; numbers use their shortest display form.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FeatureValue::Text(s) => Cow::Borrowed(s.as_str()),
            FeatureValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// Return the value as a finite number, parsing text if needed.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|n| n.is_finite())
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<i32> for FeatureValue {
    fn from(value: i32) -> Self {
        FeatureValue::Number(f64::from(value))
    }
}

/// Feature name to raw value, as entered by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictionInputs {
    values: BTreeMap<Feature, FeatureValue>,
}

impl PredictionInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inputs for the three features every category uses.
    pub fn vehicle(make: impl Into<String>, model: impl Into<String>, year: i32) -> Self {
        Self::new()
            .with(Feature::Make, make.into())
            .with(Feature::Model, model.into())
            .with(Feature::Year, year)
    }

    /// Set `feature` to `value`, replacing any earlier value.
    #[must_use]
    pub fn with(mut self, feature: Feature, value: impl Into<FeatureValue>) -> Self {
        self.values.insert(feature, value.into());
        self
    }

    #[must_use]
    pub fn with_mileage(self, mileage_avg: f64) -> Self {
        self.with(Feature::MileageAvg, mileage_avg)
    }

    #[must_use]
    pub fn with_transmission(self, transmission: impl Into<String>) -> Self {
        self.with(Feature::Transmission, transmission.into())
    }

    /// Set the fuel type; lowercased to match loaded listings.
    #[must_use]
    pub fn with_fuel_type(self, fuel_type: &str) -> Self {
        self.with(Feature::FuelType, fuel_type.to_lowercase())
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> Option<&FeatureValue> {
        self.values.get(&feature)
    }

    /// Return the input for `feature` as text.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::MissingInput`] if absent.
    pub fn text(&self, feature: Feature) -> Result<Cow<'_, str>, PredictionError> {
        self.require(feature).map(FeatureValue::as_text)
    }

    /// Return the input for `feature` as a finite number, parsing text if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::MissingInput`] if absent, or
    /// [`PredictionError::MismatchedInput`] if the value is not a finite number.
    pub fn number(&self, feature: Feature) -> Result<f64, PredictionError> {
        let value = self.require(feature)?;
        value
            .as_number()
            .ok_or_else(|| PredictionError::MismatchedInput {
                feature: feature.name().to_string(),
                expected: "a number",
                got: value.as_text().into_owned(),
            })
    }

    fn require(&self, feature: Feature) -> Result<&FeatureValue, PredictionError> {
        self.get(feature).ok_or_else(|| PredictionError::MissingInput {
            feature: feature.name().to_string(),
        })
    }
}
