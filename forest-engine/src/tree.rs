use crate::dataset::feature_subset;
use crate::split::best_split;
use crate::{Class, ClassCounts, ClassDistribution, Sample};
use imagerank_core::ForestConfig;
use serde::{Deserialize, Serialize};

/// A CART classification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecisionTree {
    Leaf(ClassDistribution),
    Internal {
        feature_index: usize,
        threshold: f32,
        left: Box<DecisionTree>,
        right: Box<DecisionTree>,
    },
}

impl DecisionTree {
    /// Grows a tree on `data` depth-first.
    ///
    /// At every internal node `config.num_features` feature indices are drawn
    /// from a shuffle of all features (`None` draws them all) and only those
    /// are searched for the split.
    pub fn train(data: &[&Sample], config: &ForestConfig, rng: &mut fastrand::Rng) -> Self {
        let n_features = data.first().map_or(0, |sample| sample.features.len());
        let per_split = config.num_features.unwrap_or(n_features);
        Self::grow(data, 0, config, n_features, per_split, rng)
    }

    fn grow(
        data: &[&Sample],
        depth: usize,
        config: &ForestConfig,
        n_features: usize,
        per_split: usize,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let counts = ClassCounts::from_labels(data.iter().map(|sample| sample.label));

        if depth >= config.max_depth
            || data.len() < config.min_samples_split
            || counts.distinct() <= 1
        {
            return DecisionTree::Leaf(counts.to_distribution());
        }

        let candidates = feature_subset(n_features, per_split, rng);
        let Some(split) = best_split(data, &candidates) else {
            return DecisionTree::Leaf(counts.to_distribution());
        };

        let left = Self::grow(&split.left, depth + 1, config, n_features, per_split, rng);
        let right = Self::grow(&split.right, depth + 1, config, n_features, per_split, rng);

        DecisionTree::Internal {
            feature_index: split.feature_index,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Follows the splits down to the leaf that `features` falls into.
    ///
    /// A feature index beyond the vector's length reads as NaN and routes
    /// right; callers validate dimensions beforehand.
    pub fn leaf(&self, features: &[f32]) -> &ClassDistribution {
        let mut node = self;
        loop {
            match node {
                DecisionTree::Leaf(distribution) => return distribution,
                DecisionTree::Internal {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature_index).copied().unwrap_or(f32::NAN);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn predict_proba_all(&self, features: &[f32]) -> &ClassDistribution {
        self.leaf(features)
    }

    pub fn predict_proba(&self, features: &[f32], class: Class) -> f64 {
        self.leaf(features).probability(class)
    }

    pub fn predict(&self, features: &[f32]) -> Option<Class> {
        self.leaf(features).argmax()
    }

    pub fn depth(&self) -> usize {
        match self {
            DecisionTree::Leaf(_) => 0,
            DecisionTree::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_nodes(&self) -> usize {
        match self {
            DecisionTree::Leaf(_) => 1,
            DecisionTree::Internal { left, right, .. } => 1 + left.n_nodes() + right.n_nodes(),
        }
    }

    pub fn leaves(&self) -> Vec<&ClassDistribution> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                DecisionTree::Leaf(distribution) => leaves.push(distribution),
                DecisionTree::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        leaves
    }
}
