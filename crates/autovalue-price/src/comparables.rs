//! Retrieval of real listings similar to a prediction's inputs.

use autovalue_io::{Listing, ListingTable, VehicleCategory};
use tracing::debug;

use crate::error::PredictionError;
use crate::inputs::PredictionInputs;
use crate::schema::Feature;

/// Tolerances and result cap for comparable search.
///
/// # Defaults
///
/// | Parameter        | Default |
/// |------------------|---------|
/// | `year_window`    | 2       |
/// | `mileage_window` | 20 000  |
/// | `limit`          | 5       |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparableWindow {
    pub year_window: i32,
    pub mileage_window: f64,
    pub limit: usize,
}

impl Default for ComparableWindow {
    fn default() -> Self {
        Self {
            year_window: 2,
            mileage_window: 20_000.0,
            limit: 5,
        }
    }
}

impl ComparableWindow {
    #[must_use]
    pub fn with_year_window(mut self, year_window: i32) -> Self {
        self.year_window = year_window;
        self
    }

    #[must_use]
    pub fn with_mileage_window(mut self, mileage_window: f64) -> Self {
        self.mileage_window = mileage_window;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Return up to `window.limit` listings from `table`, in table order, with
/// the same make and model as `inputs`, a year within `window.year_window`
/// and, for cars, a known mileage within `window.mileage_window`.
///
/// An empty result is a normal outcome.
///
/// # Errors
///
/// [`PredictionError::MissingInput`] or [`PredictionError::MismatchedInput`]
/// when make, model, year or (for cars) mileage is absent or malformed.
pub fn find_comparables<'t>(
    table: &'t ListingTable,
    category: VehicleCategory,
    inputs: &PredictionInputs,
    window: &ComparableWindow,
) -> Result<Vec<&'t Listing>, PredictionError> {
    let make = inputs.text(Feature::Make)?;
    let model = inputs.text(Feature::Model)?;
    let year = inputs.number(Feature::Year)?;
    let mileage = match category {
        VehicleCategory::Car => Some(inputs.number(Feature::MileageAvg)?),
        VehicleCategory::Motorcycle => None,
    };
    let year_window = f64::from(window.year_window);

    let comparables: Vec<&Listing> = table
        .listings()
        .iter()
        .filter(|l| l.make == make && l.model == model)
        .filter(|l| (f64::from(l.year) - year).abs() <= year_window)
        .filter(|l| match mileage {
            Some(target) => l
                .mileage_avg
                .is_some_and(|m| (m - target).abs() <= window.mileage_window),
            None => true,
        })
        .take(window.limit)
        .collect();

    debug!(n_comparables = comparables.len(), "comparable listings found");
    Ok(comparables)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(year: i32, mileage: f64, price: f64) -> Listing {
        Listing::new("Honda", "Civic", year, price).with_mileage(mileage)
    }

    fn inputs() -> PredictionInputs {
        PredictionInputs::vehicle("Honda", "Civic", 2018).with_mileage(50_000.0)
    }

    #[test]
    fn window_edges() {
        let table = ListingTable::from_listings(
            VehicleCategory::Car,
            vec![
                listing(2019, 60_000.0, 70_000.0),
                listing(2021, 50_000.0, 80_000.0),
                listing(2016, 70_000.0, 60_000.0),
                listing(2018, 70_001.0, 65_000.0),
            ],
        );
        let found =
            find_comparables(&table, VehicleCategory::Car, &inputs(), &ComparableWindow::default())
                .unwrap();
        let years: Vec<i32> = found.iter().map(|l| l.year).collect();
        assert_eq!(years, [2019, 2016]);
        assert_eq!(found[0].price, 70_000.0);
    }

    #[test]
    fn other_models_and_missing_mileage_excluded() {
        let table = ListingTable::from_listings(
            VehicleCategory::Car,
            vec![
                Listing::new("Honda", "City", 2018, 55_000.0).with_mileage(50_000.0),
                Listing::new("Toyota", "Civic", 2018, 55_000.0).with_mileage(50_000.0),
                Listing::new("Honda", "Civic", 2018, 72_000.0),
            ],
        );
        let found =
            find_comparables(&table, VehicleCategory::Car, &inputs(), &ComparableWindow::default())
                .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn limit_keeps_table_order() {
        let listings: Vec<Listing> = (0..8)
            .map(|i| listing(2018, 50_000.0, 60_000.0 + f64::from(i)))
            .collect();
        let table = ListingTable::from_listings(VehicleCategory::Car, listings);
        let found =
            find_comparables(&table, VehicleCategory::Car, &inputs(), &ComparableWindow::default())
                .unwrap();
        let prices: Vec<f64> = found.iter().map(|l| l.price).collect();
        assert_eq!(prices, [60_000.0, 60_001.0, 60_002.0, 60_003.0, 60_004.0]);

        let window = ComparableWindow::default().with_limit(2);
        let found = find_comparables(&table, VehicleCategory::Car, &inputs(), &window).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn motorcycles_ignore_mileage() {
        let table = ListingTable::from_listings(
            VehicleCategory::Motorcycle,
            vec![Listing::new("Yamaha", "Y15ZR", 2020, 8_000.0)],
        );
        let inputs = PredictionInputs::vehicle("Yamaha", "Y15ZR", 2021);
        let found = find_comparables(
            &table,
            VehicleCategory::Motorcycle,
            &inputs,
            &ComparableWindow::default(),
        )
        .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn car_search_requires_mileage() {
        let table = ListingTable::from_listings(VehicleCategory::Car, vec![]);
        let err = find_comparables(
            &table,
            VehicleCategory::Car,
            &PredictionInputs::vehicle("Honda", "Civic", 2018),
            &ComparableWindow::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PredictionError::MissingInput { ref feature } if feature == "mileage_avg"));
    }
}
