//! Bagged ensembles of regression trees
//!
//! Every tree is grown on a bootstrap sample (rows drawn with replacement)
//! of the training set, considering all features at every split. Tree `i`
//! draws its sample from a generator seeded with `seed + i`, so a given
//! seed and training set always produce the same forest.

use crate::tree::{RegressionTree, TreeParams};
use crate::{validate_training_data, MathError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Ensemble size and seeding for a bagged forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub n_estimators: usize,
    /// Base seed for the bootstrap generators
    pub seed: u64,
    /// Growth limits shared by every tree
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            tree: TreeParams::default(),
        }
    }
}

impl ForestParams {
    /// Validate the ensemble parameters
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(MathError::InvalidInput(
                "n_estimators must be greater than zero".to_string(),
            ));
        }
        self.tree.validate()
    }
}

/// Fitted bagged forest; predictions are the mean over all trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaggedForest {
    trees: Vec<RegressionTree>,
    params: ForestParams,
    n_features: usize,
}

impl BaggedForest {
    /// Fit a forest on the rows of `x` and targets `y`
    pub fn fit<R: AsRef<[f64]>>(x: &[R], y: &[f64], params: ForestParams) -> Result<Self> {
        params.validate()?;
        let n_features = validate_training_data(x, y)?;
        let n_samples = y.len();

        let trees = (0..params.n_estimators)
            .map(|i| {
                let rows = bootstrap_rows(n_samples, params.seed.wrapping_add(i as u64));
                RegressionTree::fit_rows(x, y, &rows, &params.tree)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            trees,
            params,
            n_features,
        })
    }

    /// Predict the target for one sample
    pub fn predict_one(&self, sample: &[f64]) -> Result<f64> {
        if sample.len() != self.n_features {
            return Err(MathError::InvalidInput(format!(
                "Sample has {} features, forest expects {}",
                sample.len(),
                self.n_features
            )));
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.predict_one(sample)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    /// Predict the target for every row of `x`
    pub fn predict<R: AsRef<[f64]>>(&self, x: &[R]) -> Result<Vec<f64>> {
        x.iter().map(|row| self.predict_one(row.as_ref())).collect()
    }

    /// Trees in the ensemble
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Parameters the forest was fitted with
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Number of features each sample must have
    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

/// Draw `n_samples` row indices with replacement.
pub fn bootstrap_rows(n_samples: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = (0..n).map(|i| 100.0 + 10.0 * i as f64).collect();
        (x, y)
    }

    #[test]
    fn bootstrap_is_seeded() {
        let a = bootstrap_rows(50, 7);
        let b = bootstrap_rows(50, 7);
        let c = bootstrap_rows(50, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|&i| i < 50));
    }

    #[test]
    fn same_seed_gives_identical_forest() {
        let (x, y) = linear_data(30);
        let params = ForestParams {
            n_estimators: 10,
            ..ForestParams::default()
        };
        let first = BaggedForest::fit(&x, &y, params).unwrap();
        let second = BaggedForest::fit(&x, &y, params).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.trees().len(), 10);
    }

    #[test]
    fn predictions_stay_within_target_range() {
        let (x, y) = linear_data(40);
        let forest = BaggedForest::fit(&x, &y, ForestParams::default()).unwrap();

        let predictions = forest.predict(&x).unwrap();
        assert_eq!(predictions.len(), 40);
        for p in predictions {
            assert!((100.0..=490.0).contains(&p));
        }
    }

    #[test]
    fn fits_training_data_closely() {
        let (x, y) = linear_data(40);
        let forest = BaggedForest::fit(&x, &y, ForestParams::default()).unwrap();

        let predictions = forest.predict(&x).unwrap();
        let mae = crate::stats::mean_absolute_error(&predictions, &y).unwrap();
        assert!(mae < 15.0, "mae was {}", mae);
    }

    #[test]
    fn single_sample_forest_predicts_that_sample() {
        let x = vec![vec![1.0, 2.0, 3.0]];
        let y = vec![1234.0];
        let forest = BaggedForest::fit(&x, &y, ForestParams::default()).unwrap();
        assert_relative_eq!(forest.predict_one(&[9.0, 9.0, 9.0]).unwrap(), 1234.0);
    }

    #[test]
    fn rejects_zero_estimators_and_wrong_width() {
        let (x, y) = linear_data(5);
        let params = ForestParams {
            n_estimators: 0,
            ..ForestParams::default()
        };
        assert!(matches!(
            BaggedForest::fit(&x, &y, params),
            Err(MathError::InvalidInput(_))
        ));

        let forest = BaggedForest::fit(&x, &y, ForestParams::default()).unwrap();
        assert!(forest.predict_one(&[1.0]).is_err());
    }
}
