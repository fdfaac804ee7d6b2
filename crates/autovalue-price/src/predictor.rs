//! Point-estimate prediction with a fixed relative band.

use autovalue_forest::RandomForest;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::encoder::EncoderSet;
use crate::error::PredictionError;
use crate::inputs::PredictionInputs;
use crate::schema::{FeatureKind, FeatureSchema};

/// Relative half-width of the band around a point estimate.
pub const BAND_FRACTION: f64 = 0.15;

/// A predicted price with its band.
///
/// The band is `point_estimate × (1 ∓ BAND_FRACTION)`. It is a fixed
/// approximation, not a statistical prediction interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl PredictionResult {
    /// Wrap a point estimate with the fixed band.
    #[must_use]
    pub fn from_estimate(point_estimate: f64) -> Self {
        Self {
            point_estimate,
            lower_bound: point_estimate * (1.0 - BAND_FRACTION),
            upper_bound: point_estimate * (1.0 + BAND_FRACTION),
        }
    }
}

/// Predict a price for `inputs`.
///
/// Inputs are read in schema order: categorical values are encoded with
/// `encoders`, numeric values are passed through.
///
/// # Errors
///
/// | Variant                              | When                                              |
/// |--------------------------------------|---------------------------------------------------|
/// | [`PredictionError::MissingInput`]    | a schema feature has no input                     |
/// | [`PredictionError::UnknownCategory`] | a categorical value was not seen during training  |
/// | [`PredictionError::MismatchedInput`] | a numeric feature's input is not a finite number  |
/// | [`PredictionError::Inference`]       | the forest fails or the estimate is not positive  |
#[instrument(skip_all, fields(category = %schema.category()))]
pub fn predict(
    forest: &RandomForest,
    encoders: &EncoderSet,
    schema: &FeatureSchema,
    inputs: &PredictionInputs,
) -> Result<PredictionResult, PredictionError> {
    let sample = schema
        .features()
        .iter()
        .map(|&feature| match feature.kind() {
            FeatureKind::Categorical => {
                let value = inputs.text(feature)?;
                encoders.encode(feature, &value).map(|code| code as f64)
            }
            FeatureKind::Numeric => inputs.number(feature),
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let estimate = forest
        .predict(&sample)
        .map_err(|e| PredictionError::Inference {
            reason: e.to_string(),
        })?;
    if !estimate.is_finite() || estimate <= 0.0 {
        return Err(PredictionError::Inference {
            reason: format!("forest produced an unusable estimate {estimate}"),
        });
    }

    debug!(estimate, "price predicted");
    Ok(PredictionResult::from_estimate(estimate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{car_table, motorcycle_table};
    use crate::trainer::{train, PriceModelConfig, TrainedModel};
    use crate::Feature;
    use autovalue_forest::RandomForestConfig;
    use autovalue_io::VehicleCategory;

    fn model() -> TrainedModel {
        train(
            VehicleCategory::Car,
            &car_table(160),
            &PriceModelConfig::new(25).unwrap(),
        )
        .unwrap()
        .model
    }

    fn civic() -> PredictionInputs {
        PredictionInputs::vehicle("Honda", "Civic", 2018)
            .with_mileage(50_000.0)
            .with_transmission("Automatic")
            .with_fuel_type("petrol")
    }

    #[test]
    fn band_is_fifteen_percent() {
        let result = model().predict(&civic()).unwrap();
        assert!(result.lower_bound < result.point_estimate);
        assert!(result.point_estimate < result.upper_bound);
        assert!((result.upper_bound / result.point_estimate - 1.15).abs() < 1e-12);
        assert!((result.lower_bound / result.point_estimate - 0.85).abs() < 1e-12);
    }

    #[test]
    fn estimate_in_plausible_range() {
        let result = model().predict(&civic()).unwrap();
        assert!(
            (60_000.0..130_000.0).contains(&result.point_estimate),
            "estimate = {}",
            result.point_estimate
        );
    }

    #[test]
    fn unknown_make_rejected() {
        let inputs = civic().with(Feature::Make, "Lamborghini");
        let err = model().predict(&inputs).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::UnknownCategory { ref feature, ref value }
                if feature == "make" && value == "Lamborghini"
        ));
    }

    #[test]
    fn unknown_fuel_type_rejected() {
        let inputs = civic().with_fuel_type("hydrogen");
        assert!(matches!(
            model().predict(&inputs),
            Err(PredictionError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn missing_mileage_reported() {
        let inputs = PredictionInputs::vehicle("Honda", "Civic", 2018)
            .with_transmission("Automatic")
            .with_fuel_type("petrol");
        assert!(matches!(
            model().predict(&inputs),
            Err(PredictionError::MissingInput { ref feature }) if feature == "mileage_avg"
        ));
    }

    #[test]
    fn text_year_mismatched() {
        let inputs = civic().with(Feature::Year, "twenty eighteen");
        assert!(matches!(
            model().predict(&inputs),
            Err(PredictionError::MismatchedInput { .. })
        ));
    }

    #[test]
    fn motorcycle_needs_only_make_model_year() {
        let model = train(
            VehicleCategory::Motorcycle,
            &motorcycle_table(120),
            &PriceModelConfig::new(20).unwrap(),
        )
        .unwrap()
        .model;
        let result = model
            .predict(&PredictionInputs::vehicle("Yamaha", "Y15ZR", 2018))
            .unwrap();
        // Training prices run from 3,000 (2010) to 9,600 (2021).
        assert!(
            (3_000.0..=9_600.0).contains(&result.point_estimate),
            "estimate = {}",
            result.point_estimate
        );
        assert!((result.upper_bound / result.point_estimate - 1.15).abs() < 1e-12);
    }

    #[test]
    fn zero_estimate_is_an_inference_error() {
        let trained = train(
            VehicleCategory::Motorcycle,
            &motorcycle_table(120),
            &PriceModelConfig::new(5).unwrap(),
        )
        .unwrap()
        .model;
        let rows: Vec<Vec<f64>> = (0..10i32).map(|i| vec![0.0, 1.0, f64::from(2010 + i)]).collect();
        let names = trained.schema().names();
        let (worthless, _) = RandomForestConfig::new(3)
            .unwrap()
            .fit(&rows, &[0.0; 10], &names)
            .unwrap()
            .into_parts();

        let err = predict(
            &worthless,
            trained.encoders(),
            trained.schema(),
            &PredictionInputs::vehicle("Yamaha", "Y15ZR", 2018),
        )
        .unwrap_err();
        assert!(matches!(err, PredictionError::Inference { .. }));
    }

    #[test]
    fn from_estimate_bounds() {
        let result = PredictionResult::from_estimate(100_000.0);
        assert!((result.lower_bound - 85_000.0).abs() < 1e-9);
        assert!((result.upper_bound - 115_000.0).abs() < 1e-9);
    }
}
