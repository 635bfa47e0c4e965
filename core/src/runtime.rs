//! Execution context: where per-sample kernels run.
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::errors::{InceptError, InceptResult};

#[derive(Debug, Clone, Default)]
pub enum Executor {
    #[default]
    SingleThread,
    MultiThread(Arc<ThreadPool>),
}

impl Executor {
    pub fn multithread(n: usize) -> InceptResult<Executor> {
        Executor::multithread_with_name(n, "incept-default")
    }

    pub fn multithread_with_name(n: usize, name: &str) -> InceptResult<Executor> {
        let name = name.to_string();
        let pool = ThreadPoolBuilder::new()
            .thread_name(move |n| format!("{name}-{n}"))
            .num_threads(n)
            .build()
            .map_err(|e| InceptError::Backend(format!("Failed to start thread pool: {e}")))?;
        Ok(Executor::MultiThread(Arc::new(pool)))
    }

    pub fn threads(&self) -> usize {
        match self {
            Executor::SingleThread => 1,
            Executor::MultiThread(pool) => pool.current_num_threads(),
        }
    }

    /// Run `f` for each sample index of a batch, collecting results in order.
    ///
    /// Every sample goes through the same sequential code whatever the
    /// executor, so results do not depend on the thread count.
    pub fn map_samples<T, F>(&self, n: usize, f: F) -> InceptResult<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> InceptResult<T> + Send + Sync,
    {
        match self {
            Executor::SingleThread => (0..n).map(f).collect(),
            Executor::MultiThread(pool) => pool.install(|| (0..n).into_par_iter().map(&f).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multithread_preserves_order() {
        let exec = Executor::multithread(3).unwrap();
        assert_eq!(exec.threads(), 3);
        let squares = exec.map_samples(10, |i| Ok(i * i)).unwrap();
        assert_eq!(squares, (0..10).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn first_error_aborts() {
        let r = Executor::SingleThread.map_samples(4, |i| {
            anyhow::ensure!(i != 2, "sample {} failed", i);
            Ok(i)
        });
        assert!(r.is_err());
    }
}
