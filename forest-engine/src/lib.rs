//! Random forest classifier used by the learned ranking strategy.
//!
//! Trees are grown greedily with Gini-impurity CART splits and bagged over
//! bootstrap samples. A trained [`RandomForest`] is an immutable value; the
//! [`ForestWorker`] swaps in a new one after each training request.

pub mod dataset;
pub mod distribution;
pub mod forest;
pub mod impurity;
pub mod split;
pub mod tree;
pub mod worker;

pub use dataset::{Class, Sample};
pub use distribution::{ClassCounts, ClassDistribution};
pub use forest::RandomForest;
pub use impurity::gini;
pub use split::{best_split, Split};
pub use tree::DecisionTree;
pub use worker::{ForestWorker, TrainRequest, TrainResponse};

/// Builds the RNG used for training: seeded when a seed is configured.
pub fn rng_from_seed(seed: Option<u64>) -> fastrand::Rng {
    match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    }
}
