use imagerank_core::EmbeddingError;
use std::sync::Mutex;

/// Fixed set of embedding workers.
///
/// Each call goes to a worker picked uniformly at random rather than the
/// least loaded one; providers are stateless and cost the same per image.
#[derive(Debug)]
pub struct WorkerPool<P> {
    workers: Vec<P>,
    rng: Mutex<fastrand::Rng>,
}

impl<P> WorkerPool<P> {
    pub fn new(workers: Vec<P>) -> Result<Self, EmbeddingError> {
        Self::with_rng(workers, fastrand::Rng::new())
    }

    pub fn with_seed(workers: Vec<P>, seed: u64) -> Result<Self, EmbeddingError> {
        Self::with_rng(workers, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(workers: Vec<P>, rng: fastrand::Rng) -> Result<Self, EmbeddingError> {
        if workers.is_empty() {
            return Err(EmbeddingError::EmptyPool);
        }
        Ok(Self {
            workers,
            rng: Mutex::new(rng),
        })
    }

    /// Builds `count` workers with `make`.
    pub fn spawn_with(
        count: usize,
        seed: Option<u64>,
        make: impl FnMut(usize) -> P,
    ) -> Result<Self, EmbeddingError> {
        let workers = (0..count).map(make).collect();
        match seed {
            Some(seed) => Self::with_seed(workers, seed),
            None => Self::new(workers),
        }
    }

    pub fn pick(&self) -> &P {
        &self.workers[self.pick_index()]
    }

    pub fn pick_index(&self) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.usize(..self.workers.len())
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_rejected() {
        let result = WorkerPool::<()>::new(Vec::new());
        assert!(matches!(result, Err(EmbeddingError::EmptyPool)));
    }

    #[test]
    fn test_picks_every_worker_eventually() {
        let pool = WorkerPool::with_seed(vec![0, 1, 2, 3], 9).unwrap();
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[*pool.pick()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_seeded_pools_agree() {
        let a = WorkerPool::with_seed(vec![(); 5], 77).unwrap();
        let b = WorkerPool::with_seed(vec![(); 5], 77).unwrap();
        let picks_a: Vec<usize> = (0..20).map(|_| a.pick_index()).collect();
        let picks_b: Vec<usize> = (0..20).map(|_| b.pick_index()).collect();
        assert_eq!(picks_a, picks_b);
    }

    #[test]
    fn test_spawn_with() {
        let pool = WorkerPool::spawn_with(3, Some(1), |i| i * 10).unwrap();
        assert_eq!(pool.len(), 3);
        assert!([0, 10, 20].contains(pool.pick()));
    }
}
