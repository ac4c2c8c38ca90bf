use crate::similarity::similarity_score;
use crate::{Fingerprint, LabelSet};
use forest_engine::{ForestWorker, TrainRequest};
use imagerank_core::{
    CoreError, Embedding, ImageId, Label, RankerConfig, Strategy, LIKED_CLASS,
};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedImage {
    pub image: ImageId,
    pub label: Label,
    pub score: Option<f64>,
}

/// Images in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    entries: Vec<RankedImage>,
}

impl Ranking {
    /// Liked before unlabeled before disliked; within a group by descending
    /// score, unscored last. Non-finite scores count as unscored. The sort is
    /// stable, so ties keep input order.
    pub fn build(images: &[ImageId], labels: &LabelSet, scores: &HashMap<ImageId, f64>) -> Self {
        let mut entries: Vec<RankedImage> = images
            .iter()
            .map(|image| RankedImage {
                image: image.clone(),
                label: labels.get(image),
                score: scores.get(image).copied().filter(|score| score.is_finite()),
            })
            .collect();

        entries.sort_by(|a, b| {
            a.label
                .rank_group()
                .cmp(&b.label.rank_group())
                .then_with(|| match (a.score, b.score) {
                    (Some(x), Some(y)) => y.total_cmp(&x),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                })
        });

        Self { entries }
    }

    pub fn entries(&self) -> &[RankedImage] {
        &self.entries
    }

    pub fn order(&self) -> Vec<&ImageId> {
        self.entries.iter().map(|entry| &entry.image).collect()
    }

    pub fn position(&self, image: &ImageId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.image == image)
    }

    pub fn score(&self, image: &ImageId) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| &entry.image == image)
            .and_then(|entry| entry.score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keeps the ranking in step with images, labels, embeddings and strategy.
///
/// Mutators only record the change; [`recompute`](Self::recompute) compares
/// a fingerprint of the inputs with the last one it ranked and does the work
/// only when they differ.
pub struct RankingOrchestrator {
    images: Vec<ImageId>,
    labels: LabelSet,
    embeddings: HashMap<ImageId, Embedding>,
    strategy: Strategy,
    forest: ForestWorker,
    trained_on: Option<Fingerprint>,
    ranked_inputs: Option<Fingerprint>,
    ranking: Ranking,
}

impl RankingOrchestrator {
    pub fn new(config: &RankerConfig) -> Self {
        Self {
            images: Vec::new(),
            labels: LabelSet::new(),
            embeddings: HashMap::new(),
            strategy: config.ranking.strategy,
            forest: ForestWorker::new(config.forest.clone()),
            trained_on: None,
            ranked_inputs: None,
            ranking: Ranking::default(),
        }
    }

    /// Replaces the image set. Labels of images no longer present are
    /// dropped; embeddings stay cached by identity.
    pub fn set_images(&mut self, images: Vec<ImageId>) {
        self.labels.retain(|image| images.contains(image));
        self.images = images;
    }

    pub fn insert_embeddings(&mut self, embeddings: HashMap<ImageId, Embedding>) {
        self.embeddings.extend(embeddings);
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        if self.strategy != strategy {
            info!("Ranking strategy changed to {}", strategy);
            self.strategy = strategy;
        }
    }

    /// Toggles `label` on `image` and returns the label it now carries.
    pub fn toggle_label(&mut self, image: &ImageId, label: Label) -> Result<Label, CoreError> {
        if !self.images.contains(image) {
            return Err(CoreError::NotFound {
                resource: format!("image {}", image),
            });
        }
        Ok(self.labels.toggle(image, label))
    }

    pub fn label(&self, image: &ImageId) -> Label {
        self.labels.get(image)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn ranking(&self) -> &Ranking {
        &self.ranking
    }

    pub fn forest_version(&self) -> Option<i64> {
        self.forest.version()
    }

    /// Brings the ranking up to date with the current inputs.
    ///
    /// With the learned strategy, a labeled image that has no embedding yet
    /// leaves the previous ranking in place until its embedding arrives. If
    /// nothing was ranked before, images are shown by label group, unscored.
    ///
    /// # Errors
    ///
    /// Embeddings of different lengths, or a failed training run.
    pub async fn recompute(&mut self) -> Result<&Ranking, CoreError> {
        let inputs = Fingerprint::of_ranking_inputs(
            &self.images,
            &self.labels,
            &self.embeddings,
            self.strategy,
        );
        if self.ranked_inputs == Some(inputs) {
            debug!("Ranking inputs unchanged, reusing ranking");
            return Ok(&self.ranking);
        }

        let scores = match self.strategy {
            Strategy::Similarity => self.similarity_scores()?,
            Strategy::Learned => match self.learned_scores().await? {
                Some(scores) => scores,
                None => {
                    if self.ranked_inputs.is_none() {
                        self.ranking = Ranking::build(&self.images, &self.labels, &HashMap::new());
                    }
                    return Ok(&self.ranking);
                }
            },
        };

        self.ranking = Ranking::build(&self.images, &self.labels, &scores);
        self.ranked_inputs = Some(inputs);
        debug!(
            "Ranked {} images ({} scored) with {} strategy",
            self.images.len(),
            scores.len(),
            self.strategy
        );
        Ok(&self.ranking)
    }

    fn similarity_scores(&self) -> Result<HashMap<ImageId, f64>, CoreError> {
        let liked = self.labels.with_label(&self.images, Label::Liked);
        let disliked = self.labels.with_label(&self.images, Label::Disliked);

        let mut scores = HashMap::new();
        for image in &self.images {
            if let Some(score) = similarity_score(image, &liked, &disliked, &self.embeddings)? {
                scores.insert(image.clone(), score);
            }
        }
        Ok(scores)
    }

    /// `None` means the inputs are not settled yet and the ranking should
    /// stay as it is.
    async fn learned_scores(&mut self) -> Result<Option<HashMap<ImageId, f64>>, CoreError> {
        let labeled = self.labels.labeled(&self.images);
        if labeled.is_empty() {
            if self.forest.forest().is_none() {
                return Ok(Some(HashMap::new()));
            }
            debug!("No labeled images, scoring with the current forest");
            return self.forest_scores().map(Some);
        }

        let mut rows = Vec::with_capacity(labeled.len());
        for (image, label) in labeled {
            let Some(embedding) = self.embeddings.get(image) else {
                debug!("Waiting for embedding of labeled image {}", image);
                return Ok(None);
            };
            if let Some(class) = label.class() {
                rows.push((image, embedding, class));
            }
        }

        let training = Fingerprint::of_training_set(rows.iter().copied());
        if self.trained_on != Some(training) || self.forest.forest().is_none() {
            let request = TrainRequest {
                training_set: rows.iter().map(|(_, embedding, _)| (*embedding).clone()).collect(),
                predictions: rows.iter().map(|(_, _, class)| *class).collect(),
            };
            let response = self.forest.train(request).await?;
            self.trained_on = Some(training);
            info!(
                "Retrained forest on {} labeled images (version {})",
                rows.len(),
                response.version
            );
        }

        self.forest_scores().map(Some)
    }

    /// Liked-class probability of every embedded image under the current
    /// forest.
    fn forest_scores(&self) -> Result<HashMap<ImageId, f64>, CoreError> {
        let mut scores = HashMap::new();
        for image in &self.images {
            if let Some(embedding) = self.embeddings.get(image) {
                let probability = self.forest.predict_proba(embedding, LIKED_CLASS)?;
                scores.insert(image.clone(), probability);
            }
        }
        Ok(scores)
    }
}
