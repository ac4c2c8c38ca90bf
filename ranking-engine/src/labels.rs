use imagerank_core::{ImageId, Label};
use std::collections::HashMap;
use tracing::debug;

/// Current label per image. Images never labeled read as `Unlabeled`.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    labels: HashMap<ImageId, Label>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, image: &ImageId) -> Label {
        self.labels.get(image).copied().unwrap_or_default()
    }

    /// Applies `requested`, or clears the label if the image already has it.
    /// Returns the resulting label.
    pub fn toggle(&mut self, image: &ImageId, requested: Label) -> Label {
        let next = self.get(image).toggle(requested);
        if next == Label::Unlabeled {
            self.labels.remove(image);
        } else {
            self.labels.insert(image.clone(), next);
        }
        debug!("Label for {} is now {:?}", image, next);
        next
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Images in `order` carrying `label`, in that order.
    pub fn with_label<'a>(&self, order: &'a [ImageId], label: Label) -> Vec<&'a ImageId> {
        order.iter().filter(|image| self.get(image) == label).collect()
    }

    /// Labeled images in `order` with their label.
    pub fn labeled<'a>(&self, order: &'a [ImageId]) -> Vec<(&'a ImageId, Label)> {
        order
            .iter()
            .map(|image| (image, self.get(image)))
            .filter(|(_, label)| *label != Label::Unlabeled)
            .collect()
    }

    /// Forgets labels for images not accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&ImageId) -> bool) {
        self.labels.retain(|image, _| keep(image));
    }
}
