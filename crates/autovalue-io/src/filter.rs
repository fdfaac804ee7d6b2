//! Listing filters and make search.

use std::collections::BTreeSet;

use crate::domain::{Listing, ListingTable};

/// Inclusive price and year bounds plus an optional make whitelist.
///
/// Unset bounds do not constrain; an empty make set admits every make.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    min_price: Option<f64>,
    max_price: Option<f64>,
    min_year: Option<i32>,
    max_year: Option<i32>,
    makes: BTreeSet<String>,
}

impl ListingFilter {
    /// Create a filter that admits every listing.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_min_price(mut self, min_price: f64) -> Self {
        self.min_price = Some(min_price);
        self
    }

    #[must_use]
    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    #[must_use]
    pub fn with_min_year(mut self, min_year: i32) -> Self {
        self.min_year = Some(min_year);
        self
    }

    #[must_use]
    pub fn with_max_year(mut self, max_year: i32) -> Self {
        self.max_year = Some(max_year);
        self
    }

    /// Restrict to the given makes (exact match).
    #[must_use]
    pub fn with_makes<I, T>(mut self, makes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.makes.extend(makes.into_iter().map(Into::into));
        self
    }

    /// Return `true` if no constraint is set.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        *self == Self::default()
    }

    /// Return `true` if `listing` passes every set constraint.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        self.min_price.is_none_or(|lo| listing.price >= lo)
            && self.max_price.is_none_or(|hi| listing.price <= hi)
            && self.min_year.is_none_or(|lo| listing.year >= lo)
            && self.max_year.is_none_or(|hi| listing.year <= hi)
            && (self.makes.is_empty() || self.makes.contains(&listing.make))
    }

    /// Return a new table holding the matching listings in source order.
    #[must_use]
    pub fn apply(&self, table: &ListingTable) -> ListingTable {
        let kept = table
            .listings()
            .iter()
            .filter(|l| self.matches(l))
            .cloned()
            .collect();
        table.with_listings(kept)
    }
}

/// Return the distinct makes containing `query` (case-insensitive), sorted.
pub fn search_makes(table: &ListingTable, query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    table
        .listings()
        .iter()
        .filter(|l| l.make.to_lowercase().contains(&needle))
        .map(|l| l.make.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
