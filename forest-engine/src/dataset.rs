use imagerank_core::ForestError;

/// Class label. The ranking application only uses 0 (disliked) and 1 (liked).
pub type Class = u8;

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: Vec<f32>,
    pub label: Class,
}

impl Sample {
    pub fn new(features: Vec<f32>, label: Class) -> Self {
        Self { features, label }
    }
}

/// Returns the shared feature count, or an error if rows disagree.
pub fn feature_count(data: &[Sample]) -> Result<usize, ForestError> {
    let first = data.first().ok_or(ForestError::EmptyTrainingSet)?;
    let expected = first.features.len();
    for sample in data {
        if sample.features.len() != expected {
            return Err(ForestError::DimensionMismatch {
                expected,
                actual: sample.features.len(),
            });
        }
    }
    Ok(expected)
}

/// Draws `data.len()` samples uniformly with replacement.
pub fn bootstrap<'a>(data: &'a [Sample], rng: &mut fastrand::Rng) -> Vec<&'a Sample> {
    if data.is_empty() {
        return Vec::new();
    }
    (0..data.len()).map(|_| &data[rng.usize(..data.len())]).collect()
}

/// Shuffles all feature indices and keeps the first `take`.
pub fn feature_subset(n_features: usize, take: usize, rng: &mut fastrand::Rng) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_features).collect();
    rng.shuffle(&mut indices);
    indices.truncate(take.min(n_features));
    indices
}
