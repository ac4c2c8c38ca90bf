use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Fixed-length feature vector produced by an embedding provider.
pub type Embedding = Vec<f32>;

/// Opaque handle for one input image.
///
/// Two handles are equal only if they were created for the same image, never
/// because they carry the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageId {
    id: Uuid,
    name: String,
}

impl ImageId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for ImageId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ImageId {}

impl Hash for ImageId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Raw image handed to an embedding provider.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub id: ImageId,
    pub bytes: Vec<u8>,
}

impl ImageSource {
    pub fn new(id: ImageId, bytes: Vec<u8>) -> Self {
        Self { id, bytes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Liked,
    Disliked,
    #[default]
    Unlabeled,
}

impl Label {
    /// Applying the label an image already carries clears it.
    pub fn toggle(self, requested: Label) -> Label {
        if self == requested {
            Label::Unlabeled
        } else {
            requested
        }
    }

    /// Binary class used when training the forest, `None` for unlabeled images.
    pub fn class(self) -> Option<u8> {
        match self {
            Label::Liked => Some(LIKED_CLASS),
            Label::Disliked => Some(DISLIKED_CLASS),
            Label::Unlabeled => None,
        }
    }

    /// Sort group: liked first, disliked last.
    pub fn rank_group(self) -> u8 {
        match self {
            Label::Liked => 0,
            Label::Unlabeled => 1,
            Label::Disliked => 2,
        }
    }
}

pub const LIKED_CLASS: u8 = 1;
pub const DISLIKED_CLASS: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Similarity,
    Learned,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Similarity => write!(f, "similarity"),
            Strategy::Learned => write!(f, "learned"),
        }
    }
}
