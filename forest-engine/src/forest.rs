use crate::dataset::{bootstrap, feature_count};
use crate::{Class, ClassCounts, ClassDistribution, DecisionTree, Sample};
use imagerank_core::{ConfigError, ForestConfig, ForestError};
use tracing::debug;

/// Bagged ensemble of [`DecisionTree`]s.
///
/// A forest never changes after `train` returns; retraining builds a new one.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Trains `config.num_trees` trees, each on its own bootstrap sample of
    /// `data`.
    ///
    /// # Errors
    ///
    /// `EmptyTrainingSet` for no data, `DimensionMismatch` for ragged rows and
    /// `InvalidHyperparameter` for a config that fails validation.
    pub fn train(
        data: &[Sample],
        config: &ForestConfig,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, ForestError> {
        config.validate().map_err(invalid_hyperparameter)?;
        let n_features = feature_count(data)?;

        let trees: Vec<DecisionTree> = (0..config.num_trees)
            .map(|_| {
                let sample = bootstrap(data, rng);
                DecisionTree::train(&sample, config, rng)
            })
            .collect();

        debug!(
            "Trained forest: {} trees on {} samples x {} features",
            trees.len(),
            data.len(),
            n_features
        );

        Ok(Self { trees, n_features })
    }

    /// Majority vote over tree predictions; ties go to the class that
    /// received its first vote earliest.
    pub fn predict(&self, features: &[f32]) -> Option<Class> {
        ClassCounts::from_labels(self.trees.iter().filter_map(|tree| tree.predict(features)))
            .majority()
    }

    /// Mean over trees of each tree's probability for `class`.
    pub fn predict_proba(&self, features: &[f32], class: Class) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict_proba(features, class))
            .sum();
        total / self.trees.len() as f64
    }

    pub fn predict_proba_all(&self, features: &[f32]) -> ClassDistribution {
        ClassDistribution::mean(self.trees.iter().map(|tree| tree.predict_proba_all(features)))
    }

    pub fn check_features(&self, features: &[f32]) -> Result<(), ForestError> {
        if features.len() != self.n_features {
            return Err(ForestError::DimensionMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        Ok(())
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn avg_depth(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: usize = self.trees.iter().map(DecisionTree::depth).sum();
        total as f64 / self.trees.len() as f64
    }
}

fn invalid_hyperparameter(error: ConfigError) -> ForestError {
    match error {
        ConfigError::InvalidValue { field, value } => {
            ForestError::InvalidHyperparameter { name: field, value }
        }
        other => ForestError::InvalidHyperparameter {
            name: "forest".to_string(),
            value: other.to_string(),
        },
    }
}
