use tracing::{debug, instrument};

use crate::{
    ForestError,
    node::{Node, NodeIndex},
    split::{Moments, SplitSearch},
};

/// Settings for growing one CART regression tree.
///
/// Every split scans every column for the exact best threshold. Defaults
/// grow the tree until its leaves are pure.
#[derive(Debug, Clone)]
pub struct RegressionTreeConfig {
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_leaf: usize,
}

impl Default for RegressionTreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_leaf: 1,
        }
    }
}

impl RegressionTreeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth cap counted from the root at depth 0.
    #[must_use]
    pub fn with_max_depth(self, max_depth: Option<usize>) -> Self {
        Self { max_depth, ..self }
    }

    #[must_use]
    pub fn with_min_samples_leaf(self, min_samples_leaf: usize) -> Self {
        Self {
            min_samples_leaf,
            ..self
        }
    }

    /// Grow a tree on row-major `features` and their `targets`.
    ///
    /// # Errors
    ///
    /// Dataset problems as reported by validation ([`ForestError::EmptyDataset`],
    /// [`ForestError::ZeroFeatures`], [`ForestError::TargetCountMismatch`],
    /// [`ForestError::FeatureCountMismatch`], [`ForestError::NonFiniteValue`],
    /// [`ForestError::NonFiniteTarget`]) and out-of-range settings
    /// ([`ForestError::InvalidMaxDepth`], [`ForestError::InvalidMinSamplesLeaf`]).
    #[instrument(skip(self, features, targets), fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<RegressionTree, ForestError> {
        let n_features = crate::validate_dataset(features, targets)?;
        self.check()?;
        let n_samples = features.len();

        debug!(n_samples, n_features, "fitting regression tree");

        // The split scan reads one column at a time.
        let columns: Vec<Vec<f64>> = (0..n_features)
            .map(|j| features.iter().map(|row| row[j]).collect())
            .collect();
        let rows: Vec<usize> = (0..n_samples).collect();

        let mut builder = TreeBuilder {
            search: SplitSearch {
                columns: &columns,
                targets,
                min_samples_leaf: self.min_samples_leaf,
            },
            max_depth: self.max_depth,
            arena: Vec::new(),
        };
        let root = builder.build(&rows, 0);

        debug!(root_index = root.index(), n_nodes = builder.arena.len(), "regression tree built");

        Ok(RegressionTree {
            nodes: builder.arena,
            n_features,
        })
    }

    pub(crate) fn check(&self) -> Result<(), ForestError> {
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_leaf == 0 {
            return Err(ForestError::InvalidMinSamplesLeaf {
                min_samples_leaf: 0,
            });
        }
        Ok(())
    }
}

/// Grows the node arena depth-first; a parent is pushed before its children.
struct TreeBuilder<'a> {
    search: SplitSearch<'a>,
    max_depth: Option<usize>,
    arena: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, rows: &[usize], depth: usize) -> NodeIndex {
        let moments = Moments::of(self.search.targets, rows);
        let impurity = moments.impurity();
        let leaf = Node::Leaf {
            value: moments.mean(),
            impurity,
            n_samples: rows.len(),
        };

        let at = NodeIndex::new(self.arena.len());
        self.arena.push(leaf);

        let targets = self.search.targets;
        let pure = rows.windows(2).all(|w| targets[w[0]] == targets[w[1]]);
        if pure || self.max_depth.is_some_and(|max| depth >= max) {
            return at;
        }
        let Some(split) = self.search.best(rows) else {
            return at;
        };

        let left = self.build(&split.left_indices, depth + 1);
        let right = self.build(&split.right_indices, depth + 1);
        self.arena[at.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples: rows.len(),
            impurity_decrease: split.impurity_decrease,
        };
        at
    }
}

/// A fitted CART regression tree stored as an arena of [`Node`]s.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RegressionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
}

impl RegressionTree {
    /// Walk from the root to a leaf, going left when
    /// `sample[feature] <= threshold`.
    ///
    /// # Errors
    ///
    /// [`ForestError::PredictionFeatureMismatch`] if `sample` has the wrong width.
    pub fn predict(&self, sample: &[f64]) -> Result<f64, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut at = NodeIndex::new(0);
        loop {
            match self.nodes[at.index()] {
                Node::Leaf { value, .. } => return Ok(value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => at = if sample[feature.index()] <= threshold { left } else { right },
            }
        }
    }

    /// Mean decrease in impurity per column, scaled to sum to 1.
    ///
    /// A tree that never split reports all zeros.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut decrease = vec![0.0; self.n_features];
        self.nodes.iter().for_each(|node| {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = *node
            {
                decrease[feature.index()] += impurity_decrease;
            }
        });
        let total: f64 = decrease.iter().sum();
        if total > 0.0 {
            decrease.iter_mut().for_each(|d| *d /= total);
        }
        decrease
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path; a lone leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        fn below(nodes: &[Node], at: NodeIndex) -> usize {
            match nodes[at.index()] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + below(nodes, left).max(below(nodes, right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            below(&self.nodes, NodeIndex::new(0))
        }
    }
}
