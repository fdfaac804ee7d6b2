use std::fmt;

macro_rules! arena_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        pub struct $name(usize);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index)
            }

            #[must_use]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

arena_index!(
    /// Column position in a feature row.
    FeatureIndex
);

arena_index!(
    /// Position of a node in its tree's `Vec<Node>`.
    NodeIndex
);

/// Variance of the training prices that reached a node.
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd,
    serde::Serialize, serde::Deserialize,
)]
pub struct Impurity(f64);

impl Impurity {
    #[cfg(test)]
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Variance from the running sum and sum of squares of `n` targets,
    /// clamped at zero against cancellation.
    pub(crate) fn from_sums(sum: f64, sum_sq: f64, n: usize) -> Self {
        match n {
            0 => Self(0.0),
            n => {
                let n = n as f64;
                let mean = sum / n;
                Self((sum_sq / n - mean * mean).max(0.0))
            }
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// One entry of a tree's node arena; children are addressed by [`NodeIndex`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Node {
    Split {
        feature: FeatureIndex,
        /// Rows with `row[feature] <= threshold` descend left.
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
        /// Squared-error impurity of the rows that arrived here.
        impurity: Impurity,
        n_samples: usize,
        /// `n * impurity` here minus the same quantity summed over both children.
        impurity_decrease: f64,
    },
    Leaf {
        /// Mean training price of the rows that ended here.
        value: f64,
        impurity: Impurity,
        n_samples: usize,
    },
}

impl Node {
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match *self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => impurity,
        }
    }

    /// Training rows that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match *self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => n_samples,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
