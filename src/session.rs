use imagerank_core::{CoreError, Embedding, ImageId, Label, Strategy};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SessionFile {
    #[serde(default)]
    strategy: Option<Strategy>,
    images: Vec<SessionEntry>,
}

#[derive(Debug, Deserialize)]
struct SessionEntry {
    name: String,
    #[serde(default)]
    embedding: Option<Embedding>,
    #[serde(default)]
    label: Label,
}

#[derive(Debug, Clone)]
pub struct SessionImage {
    pub id: ImageId,
    pub embedding: Option<Embedding>,
    pub label: Label,
}

/// A batch of images with precomputed embeddings and the user's labels.
#[derive(Debug, Clone)]
pub struct Session {
    pub strategy: Option<Strategy>,
    pub images: Vec<SessionImage>,
}

impl Session {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound {
                resource: path.display().to_string(),
            },
            _ => CoreError::Io(e),
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, CoreError> {
        let file: SessionFile = serde_json::from_str(contents)?;
        if file.images.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "session contains no images".to_string(),
            });
        }

        Ok(Self {
            strategy: file.strategy,
            images: file
                .images
                .into_iter()
                .map(|entry| SessionImage {
                    id: ImageId::new(entry.name),
                    embedding: entry.embedding,
                    label: entry.label,
                })
                .collect(),
        })
    }
}
