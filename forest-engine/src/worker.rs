use crate::{Class, RandomForest, Sample};
use imagerank_core::{CoreError, ForestConfig, ForestError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Training request as sent across the worker boundary. `training_set[i]`
/// is labelled by `predictions[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRequest {
    pub training_set: Vec<Vec<f32>>,
    pub predictions: Vec<Class>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainResponse {
    /// Millisecond timestamp identifying the forest, strictly increasing per
    /// worker.
    pub version: i64,
}

impl TrainRequest {
    pub fn into_samples(self) -> Result<Vec<Sample>, ForestError> {
        if self.training_set.len() != self.predictions.len() {
            return Err(ForestError::LengthMismatch {
                features: self.training_set.len(),
                labels: self.predictions.len(),
            });
        }
        if let Some(&label) = self.predictions.iter().find(|&&label| label > 1) {
            return Err(ForestError::InvalidLabel { label });
        }
        Ok(self
            .training_set
            .into_iter()
            .zip(self.predictions)
            .map(|(features, label)| Sample::new(features, label))
            .collect())
    }
}

/// Owns the current forest and rebuilds it on request.
///
/// Training runs on the blocking pool and the finished forest replaces the
/// previous one in a single assignment, so a reader holding the old `Arc`
/// keeps a complete forest.
pub struct ForestWorker {
    config: ForestConfig,
    rng: fastrand::Rng,
    current: Option<Arc<RandomForest>>,
    version: Option<i64>,
}

impl ForestWorker {
    pub fn new(config: ForestConfig) -> Self {
        let rng = crate::rng_from_seed(config.seed);
        Self {
            config,
            rng,
            current: None,
            version: None,
        }
    }

    /// Trains a fresh forest from `request` and makes it current.
    ///
    /// An empty request keeps the current forest and returns its version.
    pub async fn train(&mut self, request: TrainRequest) -> Result<TrainResponse, CoreError> {
        let samples = request.into_samples()?;

        if samples.is_empty() {
            debug!("Empty training request, keeping current forest");
            return self
                .version
                .map(|version| TrainResponse { version })
                .ok_or_else(|| ForestError::NotTrained.into());
        }

        let config = self.config.clone();
        let seed = self.rng.u64(..);
        let n_samples = samples.len();

        let forest = tokio::task::spawn_blocking(move || {
            let mut rng = fastrand::Rng::with_seed(seed);
            RandomForest::train(&samples, &config, &mut rng)
        })
        .await
        .map_err(|e| CoreError::Internal {
            message: format!("forest training task failed: {e}"),
        })??;

        let version = self.next_version();
        info!(
            "Forest version {} trained on {} samples ({} trees, avg depth {:.1})",
            version,
            n_samples,
            forest.num_trees(),
            forest.avg_depth()
        );

        self.current = Some(Arc::new(forest));
        self.version = Some(version);
        Ok(TrainResponse { version })
    }

    pub fn predict_proba(&self, features: &[f32], class: Class) -> Result<f64, ForestError> {
        let forest = self.current.as_ref().ok_or(ForestError::NotTrained)?;
        forest.check_features(features)?;
        Ok(forest.predict_proba(features, class))
    }

    pub fn forest(&self) -> Option<Arc<RandomForest>> {
        self.current.clone()
    }

    pub fn version(&self) -> Option<i64> {
        self.version
    }

    fn next_version(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        match self.version {
            Some(previous) if now <= previous => previous + 1,
            _ => now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ForestConfig {
        ForestConfig {
            num_trees: 5,
            max_depth: 5,
            min_samples_split: 2,
            num_features: None,
            seed: Some(21),
        }
    }

    fn request() -> TrainRequest {
        TrainRequest {
            training_set: vec![vec![0.0, 1.0], vec![0.1, 0.9], vec![1.0, 0.0], vec![0.9, 0.1]],
            predictions: vec![1, 1, 0, 0],
        }
    }

    #[test]
    fn test_request_wire_format() {
        let json = r#"{"trainingSet":[[1.0,2.0],[3.0,4.0]],"predictions":[1,0]}"#;
        let request: TrainRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.training_set.len(), 2);
        assert_eq!(request.predictions, vec![1, 0]);

        let response = serde_json::to_string(&TrainResponse { version: 12 }).unwrap();
        assert_eq!(response, r#"{"version":12}"#);
    }

    #[test]
    fn test_predict_before_train_fails() {
        let worker = ForestWorker::new(small_config());
        assert_eq!(
            worker.predict_proba(&[0.0, 1.0], 1),
            Err(ForestError::NotTrained)
        );
    }

    #[test]
    fn test_request_validation() {
        let mismatched = TrainRequest {
            training_set: vec![vec![1.0]],
            predictions: vec![1, 0],
        };
        assert_eq!(
            mismatched.into_samples(),
            Err(ForestError::LengthMismatch {
                features: 1,
                labels: 2
            })
        );

        let bad_label = TrainRequest {
            training_set: vec![vec![1.0]],
            predictions: vec![2],
        };
        assert_eq!(
            bad_label.into_samples(),
            Err(ForestError::InvalidLabel { label: 2 })
        );
    }

    #[test]
    fn test_train_then_predict() {
        let mut worker = ForestWorker::new(small_config());
        let response = tokio_test::block_on(worker.train(request())).unwrap();

        assert_eq!(worker.version(), Some(response.version));
        let liked = worker.predict_proba(&[0.0, 1.0], 1).unwrap();
        let disliked = worker.predict_proba(&[1.0, 0.0], 1).unwrap();
        assert!((0.0..=1.0).contains(&liked));
        assert!(liked > disliked);

        assert!(matches!(
            worker.predict_proba(&[1.0], 1),
            Err(ForestError::DimensionMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_versions_increase_and_old_forest_survives() {
        let mut worker = ForestWorker::new(small_config());

        let first = worker.train(request()).await.unwrap();
        let held = worker.forest().unwrap();
        let second = worker.train(request()).await.unwrap();

        assert!(second.version > first.version);
        assert!(!Arc::ptr_eq(&held, &worker.forest().unwrap()));
        assert_eq!(held.num_trees(), 5);
    }

    #[tokio::test]
    async fn test_empty_request_is_a_no_op() {
        let mut worker = ForestWorker::new(small_config());

        let result = worker.train(TrainRequest::default()).await;
        assert!(matches!(result, Err(CoreError::Forest(ForestError::NotTrained))));

        let trained = worker.train(request()).await.unwrap();
        let again = worker.train(TrainRequest::default()).await.unwrap();
        assert_eq!(trained, again);
    }
}
