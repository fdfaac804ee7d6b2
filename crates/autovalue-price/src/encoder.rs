//! Label encoding of categorical features.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::PredictionError;
use crate::schema::Feature;

/// Bijective map between the distinct values of one categorical feature and
/// integer codes `0..n`, assigned in sorted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderTable {
    values: Vec<String>,
}

impl EncoderTable {
    /// Build a table from the observed values; duplicates collapse.
    pub fn fit<I, S>(observed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = observed.into_iter().map(Into::into).collect();
        Self {
            values: distinct.into_iter().collect(),
        }
    }

    /// Build a table and return the code of every observed value, in input order.
    pub fn fit_transform(observed: &[String]) -> (Self, Vec<usize>) {
        let mut order: Vec<usize> = (0..observed.len()).collect();
        order.sort_by(|&a, &b| observed[a].cmp(&observed[b]));

        let mut values: Vec<String> = Vec::new();
        let mut codes = vec![0; observed.len()];
        for row in order {
            if values.last() != Some(&observed[row]) {
                values.push(observed[row].clone());
            }
            codes[row] = values.len() - 1;
        }
        (Self { values }, codes)
    }

    /// Return the code for `value`, or `None` if it was never observed.
    #[must_use]
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.values
            .binary_search_by(|v| v.as_str().cmp(value))
            .ok()
    }

    /// Return the value behind `code`.
    #[must_use]
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.values.get(code).map(String::as_str)
    }

    /// Return the number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the known values in code order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

/// One [`EncoderTable`] per categorical feature of a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderSet {
    tables: BTreeMap<Feature, EncoderTable>,
}

impl EncoderSet {
    pub(crate) fn from_tables(tables: BTreeMap<Feature, EncoderTable>) -> Self {
        Self { tables }
    }

    /// Encode `value` of a categorical `feature`.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::UnknownCategory`] if `feature` has no
    /// encoder or `value` was not seen during training.
    pub fn encode(&self, feature: Feature, value: &str) -> Result<usize, PredictionError> {
        self.tables
            .get(&feature)
            .and_then(|table| table.encode(value))
            .ok_or_else(|| PredictionError::UnknownCategory {
                feature: feature.name().to_string(),
                value: value.to_string(),
            })
    }

    /// Return the value behind `code` for `feature`.
    #[must_use]
    pub fn decode(&self, feature: Feature, code: usize) -> Option<&str> {
        self.tables.get(&feature).and_then(|t| t.decode(code))
    }

    /// Return the encoder table of `feature`, if it is categorical.
    #[must_use]
    pub fn table(&self, feature: Feature) -> Option<&EncoderTable> {
        self.tables.get(&feature)
    }
}
