//! Bounded-concurrency batch scheduler
//!
//! Two layered controls over link processing: a global concurrency ceiling,
//! held by each task for its entire duration, and fixed-size batches awaited
//! to completion before the next batch starts. The ceiling bounds in-flight
//! network and decision-function calls; batching bounds peak task overhead
//! when an iteration discovers many links.

use delver_core::{DelverError, DelverResult, ErrorContext};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

pub struct WorkScheduler {
    max_concurrent: usize,
    batch_size: usize,
}

impl WorkScheduler {
    pub fn new(max_concurrent: usize, batch_size: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            batch_size: batch_size.max(1),
        }
    }

    /// Run `worker` over every item, returning results in input order.
    ///
    /// Batch N+1 does not start until every task of batch N has completed.
    /// Tasks are never spawned onto separate executor tasks, so a slow or
    /// failing task cannot cancel its siblings.
    pub async fn execute<T, R, F, Fut>(&self, items: Vec<T>, worker: F) -> DelverResult<Vec<R>>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let total_batches = items.len().div_ceil(self.batch_size);
        let mut results = Vec::with_capacity(items.len());

        let mut items = items.into_iter();
        let mut batch_index = 0;

        loop {
            let batch: Vec<T> = items.by_ref().take(self.batch_size).collect();
            if batch.is_empty() {
                break;
            }
            batch_index += 1;

            debug!(
                batch = batch_index,
                total_batches = total_batches,
                size = batch.len(),
                "Starting batch"
            );

            let tasks = batch.into_iter().map(|item| {
                let semaphore = Arc::clone(&semaphore);
                let work = worker(item);
                async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|e| {
                        DelverError::Internal {
                            message: format!("Failed to acquire concurrency permit: {}", e),
                            source: Some(Box::new(e)),
                            context: ErrorContext::new("scheduler").with_operation("acquire"),
                        }
                    })?;
                    Ok::<R, DelverError>(work.await)
                }
            });

            for outcome in join_all(tasks).await {
                results.push(outcome?);
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn preserves_input_order() {
        let scheduler = WorkScheduler::new(4, 3);
        let items: Vec<usize> = (0..10).collect();

        let results = scheduler
            .execute(items, |i| async move {
                // Finish later items faster to scramble completion order.
                sleep(Duration::from_millis((10 - i) as u64)).await;
                i * 2
            })
            .await
            .unwrap();

        assert_eq!(results, (0..10).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn batches_run_strictly_sequentially() {
        // 25 tasks, batch size 10: batches of 10, 10, and 5. A task may only
        // start once every task of all previous batches has completed.
        let scheduler = WorkScheduler::new(10, 10);
        let completed = Arc::new(AtomicUsize::new(0));

        let completed_ref = Arc::clone(&completed);
        let violations = Arc::new(AtomicUsize::new(0));
        let violations_ref = Arc::clone(&violations);

        scheduler
            .execute((0..25).collect::<Vec<usize>>(), move |i| {
                let completed = Arc::clone(&completed_ref);
                let violations = Arc::clone(&violations_ref);
                async move {
                    let done = completed.load(Ordering::SeqCst);
                    let batch = i / 10;
                    if done < batch * 10 {
                        violations.fetch_add(1, Ordering::SeqCst);
                    }
                    sleep(Duration::from_millis((i % 7) as u64 + 1)).await;
                    completed.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await
            .unwrap();

        assert_eq!(completed.load(Ordering::SeqCst), 25);
        assert_eq!(violations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_ceiling() {
        let scheduler = WorkScheduler::new(3, 10);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let in_flight_ref = Arc::clone(&in_flight);
        let peak_ref = Arc::clone(&peak);

        scheduler
            .execute((0..10).collect::<Vec<usize>>(), move |_| {
                let in_flight = Arc::clone(&in_flight_ref);
                let peak = Arc::clone(&peak_ref);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .await
            .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let scheduler = WorkScheduler::new(2, 2);
        let results: Vec<usize> = scheduler
            .execute(Vec::new(), |i: usize| async move { i })
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
