//! Forest-level mean decrease in impurity.

use crate::forest::RandomForest;
use crate::tree::RegressionTree;

/// One column's share of the forest's total impurity decrease.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankedFeature {
    pub name: String,
    /// Shares over all columns add up to 1 (or are all 0).
    pub importance: f64,
    /// 1 for the most important column.
    pub rank: usize,
}

/// Sum per-tree importances column by column, rescale to 1 and rank.
///
/// The sort is stable, so tied columns keep their original order.
pub(crate) fn aggregate_importances(per_tree: &[Vec<f64>], names: &[String]) -> Vec<RankedFeature> {
    if per_tree.is_empty() {
        return Vec::new();
    }
    let totals: Vec<f64> = (0..names.len())
        .map(|j| per_tree.iter().filter_map(|tree| tree.get(j)).sum())
        .collect();
    let grand_total: f64 = totals.iter().sum();
    let scale = if grand_total > 0.0 { grand_total.recip() } else { 0.0 };

    let mut ranked: Vec<RankedFeature> = names
        .iter()
        .zip(totals)
        .map(|(name, total)| RankedFeature {
            name: name.clone(),
            importance: total * scale,
            rank: 0,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (rank, feature) in (1..).zip(ranked.iter_mut()) {
        feature.rank = rank;
    }
    ranked
}

impl RandomForest {
    /// Mean-decrease-in-impurity importances, ranked descending.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<RankedFeature> {
        let per_tree: Vec<Vec<f64>> = self
            .trees
            .iter()
            .map(RegressionTree::feature_importances)
            .collect();
        aggregate_importances(&per_tree, &self.feature_names)
    }
}

#[cfg(test)]
mod tests {
    use super::aggregate_importances;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranks_descending_and_normalized() {
        let per_tree = vec![vec![0.2, 0.8, 0.0], vec![0.4, 0.6, 0.0]];
        let ranked = aggregate_importances(&per_tree, &names(&["make", "year", "model"]));
        assert_eq!(ranked[0].name, "year");
        assert_eq!(ranked[0].rank, 1);
        assert!((ranked[0].importance - 0.7).abs() < 1e-12);
        assert_eq!(ranked[1].name, "make");
        assert_eq!(ranked[2].name, "model");
        assert_eq!(ranked[2].importance, 0.0);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn single_leaf_trees_give_zeros() {
        let ranked = aggregate_importances(&[vec![0.0, 0.0]], &names(&["a", "b"]));
        assert!(ranked.iter().all(|f| f.importance == 0.0));
        assert_eq!(ranked[0].name, "a");
    }

    #[test]
    fn empty_inputs() {
        assert!(aggregate_importances(&[], &names(&["a"])).is_empty());
        assert!(aggregate_importances(&[vec![1.0]], &[]).is_empty());
    }
}
