use imagerank_core::{CoreError, Embedding, EmbeddingError, ImageId, ImageSource};
use std::collections::HashMap;

/// Turns raw image bytes into a fixed-length vector.
///
/// Implementations are expected to be stateless: the coordinator may send any
/// image to any worker, and may ignore a result it no longer needs.
pub trait EmbeddingProvider {
    async fn create_embedding(&self, image: &ImageSource) -> Result<Embedding, CoreError>;
}

/// Serves embeddings computed ahead of time, keyed by image.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedProvider {
    embeddings: HashMap<ImageId, Embedding>,
}

impl PrecomputedProvider {
    pub fn new(embeddings: HashMap<ImageId, Embedding>) -> Self {
        Self { embeddings }
    }

    pub fn insert(&mut self, image: ImageId, embedding: Embedding) {
        self.embeddings.insert(image, embedding);
    }
}

impl EmbeddingProvider for PrecomputedProvider {
    async fn create_embedding(&self, image: &ImageSource) -> Result<Embedding, CoreError> {
        self.embeddings.get(&image.id).cloned().ok_or_else(|| {
            EmbeddingError::ProviderFailed {
                image: image.id.name().to_string(),
                reason: "no precomputed embedding".to_string(),
            }
            .into()
        })
    }
}
