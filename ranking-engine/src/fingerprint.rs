use crate::LabelSet;
use imagerank_core::{Embedding, ImageId, Strategy};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Digest of the inputs a computation depends on. Equal fingerprints mean
/// the previous result can be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Everything the displayed ranking depends on.
    pub fn of_ranking_inputs(
        images: &[ImageId],
        labels: &LabelSet,
        embeddings: &HashMap<ImageId, Embedding>,
        strategy: Strategy,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        strategy.hash(&mut hasher);
        for image in images {
            image.hash(&mut hasher);
            labels.get(image).hash(&mut hasher);
            hash_embedding(embeddings.get(image), &mut hasher);
        }
        Self(hasher.finish())
    }

    /// The `(embedding, class)` pairs a forest is trained on, in order.
    pub fn of_training_set<'a>(
        rows: impl IntoIterator<Item = (&'a ImageId, &'a Embedding, u8)>,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        for (image, embedding, class) in rows {
            image.hash(&mut hasher);
            class.hash(&mut hasher);
            hash_embedding(Some(embedding), &mut hasher);
        }
        Self(hasher.finish())
    }
}

fn hash_embedding(embedding: Option<&Embedding>, hasher: &mut impl Hasher) {
    match embedding {
        Some(values) => {
            true.hash(hasher);
            values.len().hash(hasher);
            for value in values {
                value.to_bits().hash(hasher);
            }
        }
        None => false.hash(hasher),
    }
}
