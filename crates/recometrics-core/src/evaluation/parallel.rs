//! Execution strategies for per-user and per-pair work.
//!
//! Every metric in this crate is expressed as "map each independent unit to
//! an accumulator, then merge accumulators". [`Executor`] abstracts where that
//! runs: [`Sequential`] folds in input order on the calling thread,
//! [`RayonExecutor`] splits the input across a rayon pool.
//!
//! Accumulator merges are associative and commutative up to floating-point
//! rounding, so both executors agree within
//! [`REDUCTION_TOLERANCE`](crate::config::REDUCTION_TOLERANCE) relative.
//! [`Sequential`] is additionally bitwise reproducible across runs.

use crate::error::{EvaluationError, Result};
use rayon::prelude::*;
use std::sync::Arc;

/// Parallel map followed by an associative reduce.
pub trait Executor: Sync {
    /// Maps every item with `map` and merges the results with `reduce`.
    ///
    /// `identity` must be a neutral element of `reduce`; it is returned for an
    /// empty input.
    fn map_reduce<T, A, I, M, R>(&self, items: &[T], identity: I, map: M, reduce: R) -> A
    where
        T: Sync,
        A: Send,
        I: Fn() -> A + Sync + Send,
        M: Fn(&T) -> A + Sync + Send,
        R: Fn(A, A) -> A + Sync + Send;
}

/// Single-threaded, in-order execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl Executor for Sequential {
    fn map_reduce<T, A, I, M, R>(&self, items: &[T], identity: I, map: M, reduce: R) -> A
    where
        T: Sync,
        A: Send,
        I: Fn() -> A + Sync + Send,
        M: Fn(&T) -> A + Sync + Send,
        R: Fn(A, A) -> A + Sync + Send,
    {
        items
            .iter()
            .map(map)
            .fold(identity(), |acc, value| reduce(acc, value))
    }
}

/// Data-parallel execution on a rayon thread pool.
#[derive(Debug, Clone, Default)]
pub struct RayonExecutor {
    /// Dedicated pool; `None` runs on rayon's global pool
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl RayonExecutor {
    /// Uses rayon's global pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Builds a dedicated pool with `num_threads` workers.
    ///
    /// # Errors
    ///
    /// [`EvaluationError::InvalidConfiguration`] if `num_threads` is zero or
    /// the pool cannot be created.
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(EvaluationError::InvalidConfiguration(
                "thread count must be positive".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("recometrics-worker-{}", i))
            .build()
            .map_err(|e| {
                EvaluationError::InvalidConfiguration(format!("failed to build thread pool: {}", e))
            })?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    /// Number of worker threads this executor will use.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl Executor for RayonExecutor {
    fn map_reduce<T, A, I, M, R>(&self, items: &[T], identity: I, map: M, reduce: R) -> A
    where
        T: Sync,
        A: Send,
        I: Fn() -> A + Sync + Send,
        M: Fn(&T) -> A + Sync + Send,
        R: Fn(A, A) -> A + Sync + Send,
    {
        let run = || items.par_iter().map(&map).reduce(&identity, &reduce);
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
