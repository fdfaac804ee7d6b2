//! Descriptive price statistics for a listing table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{ListingTable, VehicleCategory};

/// How many makes [`MarketSummary::top_makes`] keeps.
pub const TOP_MAKES: usize = 10;

/// Price band of a listing, with per-category thresholds in RM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriceSegment {
    Budget,
    EntryLevel,
    MidRange,
    Premium,
    Luxury,
}

impl PriceSegment {
    pub const ALL: [Self; 5] = [
        Self::Budget,
        Self::EntryLevel,
        Self::MidRange,
        Self::Premium,
        Self::Luxury,
    ];

    /// Lower bounds of `EntryLevel` through `Luxury`; each bound is inclusive.
    fn bounds(category: VehicleCategory) -> [f64; 4] {
        match category {
            VehicleCategory::Car => [25_000.0, 50_000.0, 100_000.0, 200_000.0],
            VehicleCategory::Motorcycle => [5_000.0, 10_000.0, 20_000.0, 40_000.0],
        }
    }

    #[must_use]
    pub fn of(category: VehicleCategory, price: f64) -> Self {
        let above = Self::bounds(category).iter().filter(|&&b| price >= b).count();
        Self::ALL[above]
    }

    /// Display label, e.g. `"Entry Level (RM25k-50k)"` for cars.
    #[must_use]
    pub fn label(self, category: VehicleCategory) -> String {
        let k = Self::bounds(category).map(|b| b / 1_000.0);
        match self {
            Self::Budget => format!("Budget (< RM{}k)", k[0]),
            Self::EntryLevel => format!("Entry Level (RM{}k-{}k)", k[0], k[1]),
            Self::MidRange => format!("Mid Range (RM{}k-{}k)", k[1], k[2]),
            Self::Premium => format!("Premium (RM{}k-{}k)", k[2], k[3]),
            Self::Luxury => format!("Luxury (> RM{}k)", k[3]),
        }
    }
}

/// Number of listings in one price segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentCount {
    pub segment: String,
    pub count: usize,
}

/// Number of listings of one make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MakeCount {
    pub make: String,
    pub count: usize,
}

/// Listing count, price mean/median, mean age, price segments and the
/// most listed makes.
///
/// Statistics are `None` for an empty table. `segment_counts` always lists
/// every segment from cheapest to dearest; `top_makes` holds at most
/// [`TOP_MAKES`] entries, most listed first, ties by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub n_listings: usize,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub mean_age: Option<f64>,
    pub segment_counts: Vec<SegmentCount>,
    pub top_makes: Vec<MakeCount>,
}

impl MarketSummary {
    /// Summarise `table`.
    pub fn from_table(table: &ListingTable) -> Self {
        let category = table.category();
        let n = table.len();

        let mut per_segment: BTreeMap<PriceSegment, usize> =
            PriceSegment::ALL.iter().map(|&s| (s, 0)).collect();
        let mut per_make: BTreeMap<&str, usize> = BTreeMap::new();
        for listing in table.listings() {
            *per_segment.entry(PriceSegment::of(category, listing.price)).or_default() += 1;
            *per_make.entry(listing.make.as_str()).or_default() += 1;
        }
        let segment_counts = per_segment
            .into_iter()
            .map(|(segment, count)| SegmentCount {
                segment: segment.label(category),
                count,
            })
            .collect();
        let mut top_makes: Vec<MakeCount> = per_make
            .into_iter()
            .map(|(make, count)| MakeCount {
                make: make.to_string(),
                count,
            })
            .collect();
        // Stable sort keeps the alphabetical order of the map among ties.
        top_makes.sort_by(|a, b| b.count.cmp(&a.count));
        top_makes.truncate(TOP_MAKES);

        if n == 0 {
            return Self {
                n_listings: 0,
                mean_price: None,
                median_price: None,
                mean_age: None,
                segment_counts,
                top_makes,
            };
        }

        let mut prices: Vec<f64> = table.listings().iter().map(|l| l.price).collect();
        prices.sort_by(f64::total_cmp);
        let median = if n % 2 == 1 {
            prices[n / 2]
        } else {
            (prices[n / 2 - 1] + prices[n / 2]) / 2.0
        };
        let mean_price = prices.iter().sum::<f64>() / n as f64;
        let mean_age = table.listings().iter().map(|l| f64::from(l.age)).sum::<f64>() / n as f64;

        Self {
            n_listings: n,
            mean_price: Some(mean_price),
            median_price: Some(median),
            mean_age: Some(mean_age),
            segment_counts,
            top_makes,
        }
    }
}
