//! Goodness-of-fit metrics.

use crate::error::ForestError;

/// Coefficient of determination: `1 - SS_res / SS_tot`.
///
/// When every actual value is identical (`SS_tot == 0`) the score is 1.0 for a
/// perfect prediction and 0.0 otherwise.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ForestError::EmptyDataset`] | `actual` is empty |
/// | [`ForestError::TargetCountMismatch`] | slices differ in length |
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Result<f64, ForestError> {
    if actual.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    if actual.len() != predicted.len() {
        return Err(ForestError::TargetCountMismatch {
            n_samples: predicted.len(),
            n_targets: actual.len(),
        });
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}
