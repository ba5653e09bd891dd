use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use almanac_core::{AlmanacError, FetchGroup};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tokio::sync::Semaphore;

/// Runs a group of independent tasks with a bound on how many are in flight.
///
/// Tasks are admitted in their original order as slots free up and every task
/// runs to completion; one task failing never cancels the others. When built
/// with [`Scheduler::shared`], clones of the scheduler also draw from one
/// common pool of permits, so several groups together never exceed the limit.
#[derive(Debug, Clone)]
pub struct Scheduler {
    limit: usize,
    shared: Option<Arc<Semaphore>>,
}

impl Scheduler {
    /// Scheduler admitting at most `limit` tasks of one group at a time.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            shared: None,
        }
    }

    /// Scheduler whose clones share a single pool of `limit` permits.
    #[must_use]
    pub fn shared(limit: usize) -> Self {
        Self {
            limit,
            shared: Some(Arc::new(Semaphore::new(limit))),
        }
    }

    /// Configured limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Run every task and return their outputs in task order.
    ///
    /// # Errors
    /// Returns a `Scheduler` error when the limit is zero or a task panicked;
    /// both mean the group produced no usable result at all.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "almanac::scheduler::run_all",
            skip(self, tasks),
            fields(group = %group, limit = self.limit),
        )
    )]
    pub async fn run_all<'f, I, Fut, T>(
        &self,
        group: FetchGroup,
        tasks: I,
    ) -> Result<Vec<T>, AlmanacError>
    where
        I: IntoIterator<Item = Fut>,
        Fut: core::future::Future<Output = T> + Send + 'f,
        T: Send + 'f,
    {
        if self.limit == 0 {
            return Err(AlmanacError::scheduler(
                group.to_string(),
                "concurrency limit must be greater than zero",
            ));
        }

        // Boxed eagerly so a spawned run stays `Send`.
        let admitted: Vec<BoxFuture<'f, (usize, std::thread::Result<T>)>> = tasks
            .into_iter()
            .enumerate()
            .map(|(idx, task)| {
                let shared = self.shared.clone();
                async move {
                    let _permit = match shared {
                        Some(pool) => pool.acquire_owned().await.ok(),
                        None => None,
                    };
                    (idx, AssertUnwindSafe(task).catch_unwind().await)
                }
                .boxed()
            })
            .collect();

        let mut settled: Vec<_> = futures::stream::iter(admitted)
            .buffer_unordered(self.limit)
            .collect()
            .await;
        settled.sort_by_key(|(idx, _)| *idx);

        let mut out = Vec::with_capacity(settled.len());
        for (_idx, result) in settled {
            match result {
                Ok(v) => out.push(v),
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(target: "almanac::scheduler", group = %group, task = _idx, "task panicked");
                    return Err(AlmanacError::scheduler(group.to_string(), "a task panicked"));
                }
            }
        }
        Ok(out)
    }
}
