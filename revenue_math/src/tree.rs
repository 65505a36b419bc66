//! CART regression trees
//!
//! Trees are grown over row indices into a shared feature matrix, so the
//! bootstrap samples drawn by [`crate::forest`] never copy feature data.
//! Splits minimise the summed squared error of the two children and leaves
//! predict the mean target of the rows that reach them.

use crate::{validate_training_data, MathError, Result};
use serde::{Deserialize, Serialize};

/// Growth limits for a single regression tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth (root has depth 0). `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum rows a node needs before it may be split
    pub min_samples_split: usize,
    /// Minimum rows each child of a split must keep
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TreeParams {
    /// Validate the growth limits
    pub fn validate(&self) -> Result<()> {
        if self.min_samples_split < 2 {
            return Err(MathError::InvalidInput(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(MathError::InvalidInput(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A node in a fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Terminal node predicting the mean of its training rows
    Leaf { value: f64, samples: usize },
    /// Rows with `x[feature] <= threshold` go left, the rest go right
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Depth of the subtree rooted here (a leaf has depth 0)
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of leaves in the subtree rooted here
    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// Fitted CART regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
    n_features: usize,
}

/// Best split found for a node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Fit a tree on every row of `x`
    pub fn fit<R: AsRef<[f64]>>(x: &[R], y: &[f64], params: &TreeParams) -> Result<Self> {
        let rows: Vec<usize> = (0..y.len()).collect();
        Self::fit_rows(x, y, &rows, params)
    }

    /// Fit a tree on the given row indices of `x`.
    ///
    /// Indices may repeat, which is how bootstrap samples are expressed.
    pub fn fit_rows<R: AsRef<[f64]>>(
        x: &[R],
        y: &[f64],
        rows: &[usize],
        params: &TreeParams,
    ) -> Result<Self> {
        params.validate()?;
        let n_features = validate_training_data(x, y)?;

        if rows.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot grow a tree from zero rows".to_string(),
            ));
        }
        if let Some(&bad) = rows.iter().find(|&&r| r >= y.len()) {
            return Err(MathError::InvalidInput(format!(
                "Row index {} out of bounds for {} samples",
                bad,
                y.len()
            )));
        }

        let root = grow(x, y, rows, 0, params);
        Ok(Self { root, n_features })
    }

    /// Predict the target for one sample
    pub fn predict_one(&self, sample: &[f64]) -> Result<f64> {
        if sample.len() != self.n_features {
            return Err(MathError::InvalidInput(format!(
                "Sample has {} features, tree expects {}",
                sample.len(),
                self.n_features
            )));
        }

        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Root node of the fitted tree
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Number of features the tree was fitted on
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

fn grow<R: AsRef<[f64]>>(
    x: &[R],
    y: &[f64],
    rows: &[usize],
    depth: usize,
    params: &TreeParams,
) -> TreeNode {
    let n = rows.len();
    let mean = rows.iter().map(|&r| y[r]).sum::<f64>() / n as f64;
    let sse: f64 = rows.iter().map(|&r| (y[r] - mean).powi(2)).sum();

    let leaf = TreeNode::Leaf {
        value: mean,
        samples: n,
    };

    let pure = sse <= 1e-12 * (1.0 + mean * mean) * n as f64;
    let at_max_depth = params.max_depth.is_some_and(|max| depth >= max);
    if n < params.min_samples_split || at_max_depth || pure {
        return leaf;
    }

    let Some(split) = best_split(x, y, rows, params.min_samples_leaf) else {
        return leaf;
    };
    debug_assert!(split.gain > 0.0);

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .partition(|&&r| x[r].as_ref()[split.feature] <= split.threshold);

    TreeNode::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(x, y, &left_rows, depth + 1, params)),
        right: Box::new(grow(x, y, &right_rows, depth + 1, params)),
    }
}

/// Scan every feature for the threshold with the largest squared-error reduction.
fn best_split<R: AsRef<[f64]>>(
    x: &[R],
    y: &[f64],
    rows: &[usize],
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    let n = rows.len();
    let total_sum: f64 = rows.iter().map(|&r| y[r]).sum();
    let total_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;

    let n_features = x[rows[0]].as_ref().len();
    let mut order = rows.to_vec();
    let mut best: Option<SplitCandidate> = None;

    for feature in 0..n_features {
        let value = |r: usize| x[r].as_ref()[feature];
        order.sort_by(|&a, &b| value(a).total_cmp(&value(b)));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 0..n - 1 {
            let target = y[order[i]];
            left_sum += target;
            left_sq += target * target;

            let current = value(order[i]);
            let next = value(order[i + 1]);
            if current == next {
                continue;
            }

            let left_n = i + 1;
            let right_n = n - left_n;
            if left_n < min_samples_leaf || right_n < min_samples_leaf {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let left_sse = left_sq - left_sum * left_sum / left_n as f64;
            let right_sse = (total_sq - left_sq) - right_sum * right_sum / right_n as f64;
            let gain = parent_sse - (left_sse + right_sse);

            if gain > 0.0 && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: midpoint(current, next),
                    gain,
                });
            }
        }
    }

    best
}

/// Midpoint of two adjacent distinct values that still separates them.
fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower + (upper - lower) / 2.0;
    if mid >= upper {
        lower
    } else {
        mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x = vec![vec![1.0], vec![2.0], vec![3.0], vec![10.0], vec![11.0], vec![12.0]];
        let y = vec![5.0, 5.0, 5.0, 50.0, 50.0, 50.0];
        (x, y)
    }

    #[test]
    fn fits_step_function_exactly() {
        let (x, y) = step_data();
        let tree = RegressionTree::fit(&x, &y, &TreeParams::default()).unwrap();

        assert_eq!(tree.depth(), 1);
        assert_relative_eq!(tree.predict_one(&[0.0]).unwrap(), 5.0);
        assert_relative_eq!(tree.predict_one(&[2.5]).unwrap(), 5.0);
        assert_relative_eq!(tree.predict_one(&[11.5]).unwrap(), 50.0);

        match tree.root() {
            TreeNode::Split {
                feature, threshold, ..
            } => {
                assert_eq!(*feature, 0);
                assert_relative_eq!(*threshold, 6.5);
            }
            TreeNode::Leaf { .. } => panic!("expected a split at the root"),
        }
    }

    #[test]
    fn constant_targets_give_a_single_leaf() {
        let x = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let y = vec![1000.0, 1000.0, 1000.0];
        let tree = RegressionTree::fit(&x, &y, &TreeParams::default()).unwrap();

        assert_eq!(tree.root().leaf_count(), 1);
        assert_relative_eq!(tree.predict_one(&[100.0, 100.0]).unwrap(), 1000.0);
    }

    #[test]
    fn max_depth_zero_predicts_the_mean() {
        let (x, y) = step_data();
        let params = TreeParams {
            max_depth: Some(0),
            ..TreeParams::default()
        };
        let tree = RegressionTree::fit(&x, &y, &params).unwrap();
        assert_relative_eq!(tree.predict_one(&[1.0]).unwrap(), 27.5);
    }

    #[test]
    fn min_samples_leaf_blocks_small_children() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let y = vec![0.0, 0.0, 0.0, 100.0];
        let params = TreeParams {
            min_samples_leaf: 2,
            ..TreeParams::default()
        };
        let tree = RegressionTree::fit(&x, &y, &params).unwrap();

        // The only admissible split is 2 | 2.
        assert_relative_eq!(tree.predict_one(&[4.0]).unwrap(), 50.0);
        assert_relative_eq!(tree.predict_one(&[1.0]).unwrap(), 0.0);
    }

    #[test]
    fn repeated_rows_weight_the_leaf_mean() {
        let x = vec![vec![1.0], vec![1.0]];
        let y = vec![10.0, 20.0];
        // Identical features cannot be separated, so the leaf is a weighted mean.
        let tree = RegressionTree::fit_rows(&x, &y, &[0, 0, 1], &TreeParams::default()).unwrap();
        assert_relative_eq!(tree.predict_one(&[1.0]).unwrap(), 40.0 / 3.0);
    }

    #[test]
    fn rejects_bad_inputs() {
        let (x, y) = step_data();
        assert!(RegressionTree::fit_rows(&x, &y, &[], &TreeParams::default()).is_err());
        assert!(RegressionTree::fit_rows(&x, &y, &[99], &TreeParams::default()).is_err());

        let params = TreeParams {
            min_samples_split: 1,
            ..TreeParams::default()
        };
        assert!(RegressionTree::fit(&x, &y, &params).is_err());

        let tree = RegressionTree::fit(&x, &y, &TreeParams::default()).unwrap();
        assert!(tree.predict_one(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn midpoint_stays_below_upper() {
        assert_relative_eq!(midpoint(1.0, 3.0), 2.0);
        let next = f64::from_bits(1.0f64.to_bits() + 1);
        assert!(midpoint(1.0, next) < next);
    }
}
