use crate::node::{FeatureIndex, Impurity};

/// Count, sum and sum of squares of a set of targets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Moments {
    pub(crate) n: usize,
    pub(crate) sum: f64,
    pub(crate) sum_sq: f64,
}

impl Moments {
    pub(crate) fn of(targets: &[f64], rows: &[usize]) -> Self {
        rows.iter().fold(Self::default(), |m, &r| m.with(targets[r]))
    }

    fn with(self, y: f64) -> Self {
        Self {
            n: self.n + 1,
            sum: self.sum + y,
            sum_sq: self.sum_sq + y * y,
        }
    }

    fn minus(self, other: Self) -> Self {
        Self {
            n: self.n - other.n,
            sum: self.sum - other.sum,
            sum_sq: self.sum_sq - other.sum_sq,
        }
    }

    pub(crate) fn mean(self) -> f64 {
        self.sum / self.n as f64
    }

    pub(crate) fn impurity(self) -> Impurity {
        Impurity::from_sums(self.sum, self.sum_sq, self.n)
    }

    /// Summed squared error around the mean.
    fn sse(self) -> f64 {
        self.impurity().value() * self.n as f64
    }
}

/// A chosen split of one node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    /// Parent SSE minus the SSE of both children.
    pub(crate) impurity_decrease: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Everything the split search needs that does not change between nodes.
///
/// `columns` is column-major (`columns[feature][row]`).
pub(crate) struct SplitSearch<'a> {
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) targets: &'a [f64],
    pub(crate) min_samples_leaf: usize,
}

impl SplitSearch<'_> {
    /// Best exact split of `rows` over every column.
    ///
    /// `None` when every column is constant over `rows` or every threshold
    /// would leave a child below `min_samples_leaf`. Ties go to the lower
    /// column index.
    pub(crate) fn best(&self, rows: &[usize]) -> Option<SplitResult> {
        if rows.len() < 2 {
            return None;
        }
        let parent = Moments::of(self.targets, rows);

        let mut best: Option<(usize, f64, f64)> = None;
        for (feature, column) in self.columns.iter().enumerate() {
            if let Some((threshold, decrease)) = self.sweep(column, rows, parent)
                && best.is_none_or(|(_, _, d)| decrease > d)
            {
                best = Some((feature, threshold, decrease));
            }
        }

        let (feature, threshold, decrease) = best?;
        let column = &self.columns[feature];
        let (left_indices, right_indices) = rows.iter().partition(|&&r| column[r] <= threshold);
        Some(SplitResult {
            feature: FeatureIndex::new(feature),
            threshold,
            impurity_decrease: decrease.max(0.0),
            left_indices,
            right_indices,
        })
    }

    /// Sweep the sorted column once, scoring each boundary between distinct values.
    fn sweep(&self, column: &[f64], rows: &[usize], parent: Moments) -> Option<(f64, f64)> {
        let mut pairs: Vec<(f64, f64)> = rows.iter().map(|&r| (column[r], self.targets[r])).collect();
        pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let parent_sse = parent.sse();
        let mut left = Moments::default();
        let mut best: Option<(f64, f64)> = None;
        for window in pairs.windows(2) {
            let [(x, y), (next_x, _)] = [window[0], window[1]];
            left = left.with(y);
            let right = parent.minus(left);
            if x == next_x || left.n < self.min_samples_leaf || right.n < self.min_samples_leaf {
                continue;
            }
            let decrease = parent_sse - left.sse() - right.sse();
            if best.is_none_or(|(_, d)| decrease > d) {
                best = Some(((x + next_x) / 2.0, decrease));
            }
        }
        best
    }
}
