use crate::{EmbeddingProvider, WorkerPool};
use futures::stream::{FuturesUnordered, StreamExt};
use imagerank_core::{
    CoreError, Embedding, EmbeddingConfig, EmbeddingError, ErrorExt, ImageId, ImageSource,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{watch, RwLock, Semaphore};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completed fraction; an empty batch counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

#[derive(Debug, Default)]
struct BatchState {
    /// Results published for the current generation.
    embeddings: HashMap<ImageId, Embedding>,
    /// Every embedding accepted this session, across generations.
    cache: HashMap<ImageId, Embedding>,
    /// Session dimensionality, fixed by the first accepted embedding.
    dimension: Option<usize>,
    progress: Progress,
}

/// Computes one embedding per image with bounded concurrency.
///
/// Every call to [`compute_all`](Self::compute_all) starts a new generation.
/// Work belonging to an older generation still runs to completion inside the
/// provider, but its results are dropped instead of published.
pub struct EmbeddingCoordinator<P> {
    pool: WorkerPool<P>,
    in_flight: Semaphore,
    generation: AtomicU64,
    state: RwLock<BatchState>,
    progress_tx: watch::Sender<Progress>,
}

impl<P: EmbeddingProvider> EmbeddingCoordinator<P> {
    pub fn new(pool: WorkerPool<P>, max_in_flight: usize) -> Self {
        let (progress_tx, _) = watch::channel(Progress::default());
        Self {
            pool,
            in_flight: Semaphore::new(max_in_flight.max(1)),
            generation: AtomicU64::new(0),
            state: RwLock::new(BatchState::default()),
            progress_tx,
        }
    }

    pub fn from_config(
        config: &EmbeddingConfig,
        make_worker: impl FnMut(usize) -> P,
    ) -> Result<Self, CoreError> {
        let pool = WorkerPool::spawn_with(config.worker_count, config.seed, make_worker)?;
        Ok(Self::new(pool, config.max_in_flight))
    }

    /// Embeds `images`, replacing whatever the previous generation published.
    ///
    /// Images already embedded earlier in the session are served from the
    /// cache. A provider failure leaves that image out of the result.
    ///
    /// # Errors
    ///
    /// `EmbeddingError::Cancelled` if another call superseded this one before
    /// it finished; nothing from this call is published in that case.
    pub async fn compute_all(
        &self,
        images: Vec<ImageSource>,
    ) -> Result<HashMap<ImageId, Embedding>, CoreError> {
        let total = images.len();
        let generation = {
            let mut state = self.state.write().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.embeddings.clear();
            state.progress = Progress {
                completed: 0,
                total,
            };
            self.progress_tx.send_replace(state.progress);
            generation
        };

        info!(
            "Embedding batch {} started: {} images, {} workers",
            generation,
            total,
            self.pool.len()
        );

        let mut tasks: FuturesUnordered<_> = images
            .into_iter()
            .map(|image| self.embed_one(generation, image))
            .collect();
        while tasks.next().await.is_some() {}

        if !self.is_current(generation) {
            debug!("Embedding batch {} superseded", generation);
            return Err(EmbeddingError::Cancelled { generation }.into());
        }

        let state = self.state.read().await;
        info!(
            "Embedding batch {} finished: {}/{} embedded",
            generation,
            state.embeddings.len(),
            total
        );
        Ok(state.embeddings.clone())
    }

    /// Invalidates the running batch without starting a new one and drops
    /// whatever it had published.
    pub async fn cancel(&self) {
        let mut state = self.state.write().await;
        let previous = self.generation.fetch_add(1, Ordering::SeqCst);
        state.embeddings.clear();
        state.progress = Progress::default();
        self.progress_tx.send_replace(state.progress);
        debug!("Embedding batch {} cancelled", previous);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn progress(&self) -> Progress {
        self.state.read().await.progress
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<Progress> {
        self.progress_tx.subscribe()
    }

    /// Snapshot of the embeddings published by the current generation.
    pub async fn embeddings(&self) -> HashMap<ImageId, Embedding> {
        self.state.read().await.embeddings.clone()
    }

    pub async fn dimension(&self) -> Option<usize> {
        self.state.read().await.dimension
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn embed_one(&self, generation: u64, image: ImageSource) {
        let cached = self.state.read().await.cache.get(&image.id).cloned();

        let outcome = match cached {
            Some(embedding) => Ok(embedding),
            None => {
                let Ok(_permit) = self.in_flight.acquire().await else {
                    return;
                };
                if !self.is_current(generation) {
                    debug!("Skipping {}: batch {} is stale", image.id, generation);
                    return;
                }
                self.pool.pick().create_embedding(&image).await
            }
        };

        let mut state = self.state.write().await;
        if !self.is_current(generation) {
            debug!("Discarding result for {}: batch {} is stale", image.id, generation);
            return;
        }

        match outcome.and_then(|embedding| state.accept(embedding)) {
            Ok(embedding) => {
                state.cache.insert(image.id.clone(), embedding.clone());
                state.embeddings.insert(image.id, embedding);
            }
            Err(e) => {
                warn!("Embedding failed for {}", image.id);
                e.log_warn();
            }
        }

        state.progress.completed += 1;
        self.progress_tx.send_replace(state.progress);
    }
}

impl BatchState {
    fn accept(&mut self, embedding: Embedding) -> Result<Embedding, CoreError> {
        match self.dimension {
            Some(expected) if expected != embedding.len() => {
                Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                }
                .into())
            }
            Some(_) => Ok(embedding),
            None => {
                self.dimension = Some(embedding.len());
                Ok(embedding)
            }
        }
    }
}
