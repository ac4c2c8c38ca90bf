use imagerank_core::{Embedding, EmbeddingError, ImageId};
use std::collections::HashMap;

/// `dot(a, b) / (|a| * |b|)`.
///
/// A zero-norm input divides by zero and yields a non-finite value; callers
/// get that value back unchanged.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Similarity to the liked images minus similarity to the disliked ones.
///
/// Sums are not normalised by set size, so the side with more labels pulls
/// harder. Labeled images without an embedding are skipped; `None` means
/// `image` itself has no embedding.
pub fn similarity_score(
    image: &ImageId,
    liked: &[&ImageId],
    disliked: &[&ImageId],
    embeddings: &HashMap<ImageId, Embedding>,
) -> Result<Option<f64>, EmbeddingError> {
    let Some(target) = embeddings.get(image) else {
        return Ok(None);
    };

    let sum = |group: &[&ImageId]| -> Result<f64, EmbeddingError> {
        group
            .iter()
            .filter_map(|id| embeddings.get(*id))
            .map(|other| cosine_similarity(target, other))
            .sum()
    };

    Ok(Some(sum(liked)? - sum(disliked)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_similarity_is_one() {
        for v in [vec![1.0, 0.0], vec![0.3, -2.0, 5.5], vec![1e-3, 1e-3]] {
            assert!((cosine_similarity(&v, &v).unwrap() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bounds() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..100 {
            let a: Vec<f32> = (0..8).map(|_| rng.f32() - 0.5).collect();
            let b: Vec<f32> = (0..8).map(|_| rng.f32() - 0.5).collect();
            let sim = cosine_similarity(&a, &b).unwrap();
            assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&sim));
        }
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap() + 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(
            cosine_similarity(&[1.0, 0.0], &[1.0]),
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_zero_norm_is_not_finite() {
        assert!(!cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap().is_finite());
    }

    #[test]
    fn test_score_sums_without_normalising() {
        let target = ImageId::new("target");
        let liked_a = ImageId::new("liked_a");
        let liked_b = ImageId::new("liked_b");
        let disliked = ImageId::new("disliked");
        let no_embedding = ImageId::new("pending");
        let embeddings: HashMap<ImageId, Embedding> = [
            (target.clone(), vec![1.0, 0.0]),
            (liked_a.clone(), vec![1.0, 0.0]),
            (liked_b.clone(), vec![2.0, 0.0]),
            (disliked.clone(), vec![1.0, 0.0]),
        ]
        .into_iter()
        .collect();

        let score = similarity_score(
            &target,
            &[&liked_a, &liked_b, &no_embedding],
            &[&disliked],
            &embeddings,
        )
        .unwrap()
        .unwrap();
        assert!((score - 1.0).abs() < 1e-9);

        let empty = similarity_score(&target, &[], &[], &embeddings).unwrap();
        assert_eq!(empty, Some(0.0));

        assert_eq!(
            similarity_score(&no_embedding, &[&liked_a], &[], &embeddings).unwrap(),
            None
        );
    }
}
