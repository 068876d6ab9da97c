//! Bounded scatter-gather enrichment
//!
//! Turns N candidates into N route-enriched entries with at most
//! `min(N, worker_cap)` routing calls in flight. One batch works like this:
//!
//! 1. a bounded job queue is filled with all N items and closed;
//! 2. W workers, each with its own [`RouteInfoProvider`], pull items until the
//!    queue is drained;
//! 3. every item produces exactly one completion (entry or error);
//! 4. the coordinator reads N completions, or stops at the first error and
//!    cancels the batch token so workers quit instead of draining the queue.
//!
//! Output order follows completion order, not input order.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::application::ports::{RouteInfoProvider, SharedRouteProviderFactory};
use crate::domain::{GeoPoint, Located, RouteError, RouteInfo};

/// Default upper bound on concurrent routing calls per batch.
pub const DEFAULT_WORKER_CAP: usize = 10;

/// A candidate joined with the route to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Enriched<T> {
    pub item: T,
    pub route: RouteInfo,
}

/// Result of one enrichment batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome<T> {
    /// Every item was enriched.
    Success(Vec<T>),
    /// At least one routing call failed; no partial results are kept.
    Failed(String),
    /// There was nothing to enrich.
    Empty,
}

impl<T> BatchOutcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchOutcome::Failed(_))
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            BatchOutcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Entries of a successful batch; empty for `Failed` and `Empty`.
    pub fn into_entries(self) -> Vec<T> {
        match self {
            BatchOutcome::Success(entries) => entries,
            BatchOutcome::Failed(_) | BatchOutcome::Empty => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BatchOutcome::Success(entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type Completion<T> = Result<Enriched<T>, RouteError>;

/// Fan-out/fan-in engine with a fixed worker cap.
#[derive(Clone)]
pub struct BoundedAggregator {
    providers: SharedRouteProviderFactory,
    worker_cap: usize,
}

impl BoundedAggregator {
    pub fn new(providers: SharedRouteProviderFactory, worker_cap: usize) -> Self {
        Self {
            providers,
            worker_cap: worker_cap.max(1),
        }
    }

    pub fn worker_cap(&self) -> usize {
        self.worker_cap
    }

    /// Enrich every item with the route from `origin` to its location.
    ///
    /// `batch` only labels logs and metrics.
    pub async fn run<T>(
        &self,
        batch: &'static str,
        origin: GeoPoint,
        items: Vec<T>,
    ) -> BatchOutcome<Enriched<T>>
    where
        T: Located + Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            debug!(batch, "Nothing to enrich");
            record_batch(batch, "empty");
            return BatchOutcome::Empty;
        }
        let worker_count = total.min(self.worker_cap);

        // One provider per worker; a factory failure fails the batch before any call.
        let mut providers = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            match self.providers.create() {
                Ok(provider) => providers.push(provider),
                Err(e) => {
                    error!(batch, error = %e, "Failed to create route provider");
                    record_batch(batch, "failed");
                    return BatchOutcome::Failed(e.to_string());
                }
            }
        }

        let (job_tx, job_rx) = mpsc::channel::<T>(total);
        for item in items {
            // Capacity equals the item count and the receiver is held here, so this never waits.
            if job_tx.send(item).await.is_err() {
                break;
            }
        }
        drop(job_tx);
        let jobs = Arc::new(Mutex::new(job_rx));

        let (completion_tx, mut completion_rx) = mpsc::channel::<Completion<T>>(total);
        let cancel = CancellationToken::new();
        let mut workers = JoinSet::new();

        debug!(batch, items = total, workers = worker_count, "Starting enrichment batch");

        for (worker_id, provider) in providers.into_iter().enumerate() {
            workers.spawn(worker_loop(
                batch,
                worker_id,
                provider,
                origin,
                jobs.clone(),
                completion_tx.clone(),
                cancel.clone(),
            ));
        }
        drop(completion_tx);

        let mut entries = Vec::with_capacity(total);
        let mut failure = None;
        while entries.len() < total {
            match completion_rx.recv().await {
                Some(Ok(entry)) => entries.push(entry),
                Some(Err(e)) => {
                    warn!(batch, error = %e, "Routing call failed, abandoning batch");
                    failure = Some(e.to_string());
                    break;
                }
                None => {
                    failure = Some(format!(
                        "workers stopped after {} of {} items",
                        entries.len(),
                        total
                    ));
                    break;
                }
            }
        }

        if failure.is_some() {
            cancel.cancel();
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(batch, error = %e, "Enrichment worker panicked");
            }
        }

        match failure {
            Some(reason) => {
                record_batch(batch, "failed");
                BatchOutcome::Failed(reason)
            }
            None => {
                debug!(batch, entries = entries.len(), "Enrichment batch complete");
                record_batch(batch, "success");
                BatchOutcome::Success(entries)
            }
        }
    }
}

async fn worker_loop<T>(
    batch: &'static str,
    worker_id: usize,
    provider: Arc<dyn RouteInfoProvider>,
    origin: GeoPoint,
    jobs: Arc<Mutex<mpsc::Receiver<T>>>,
    completions: mpsc::Sender<Completion<T>>,
    cancel: CancellationToken,
) where
    T: Located + Send + 'static,
{
    loop {
        if cancel.is_cancelled() {
            debug!(batch, worker_id, "Worker cancelled");
            break;
        }

        let next = { jobs.lock().await.recv().await };
        let Some(item) = next else {
            break;
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(batch, worker_id, "Worker cancelled during routing call");
                break;
            }
            result = provider.compute_route(origin, item.location()) => result,
        };

        match result {
            Ok(route) => {
                if completions.send(Ok(Enriched { item, route })).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = completions.send(Err(e)).await;
                break;
            }
        }
    }
}

fn record_batch(batch: &'static str, outcome: &'static str) {
    metrics::counter!("aggregation_batches_total", "batch" => batch, "outcome" => outcome)
        .increment(1);
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::test_support::{ScriptedFactory, ScriptedRoutes};
    use super::*;
    use crate::application::ports::RouteProviderFactory;

    const ORIGIN: GeoPoint = GeoPoint::new(1.30, 103.80);

    fn points(n: usize) -> Vec<GeoPoint> {
        (1..=n).map(|i| GeoPoint::new(i as f64, 103.8)).collect()
    }

    fn aggregator(routes: &Arc<ScriptedRoutes>, cap: usize) -> BoundedAggregator {
        BoundedAggregator::new(Arc::new(ScriptedFactory(routes.clone())), cap)
    }

    #[tokio::test]
    async fn enriches_every_item_exactly_once() {
        let routes = ScriptedRoutes::with_delay(Duration::from_millis(5));
        let outcome = aggregator(&routes, 4).run("test", ORIGIN, points(25)).await;

        let entries = match outcome {
            BatchOutcome::Success(entries) => entries,
            other => panic!("expected success, got {other:?}"),
        };
        assert_eq!(entries.len(), 25);
        let distinct: HashSet<u64> = entries.iter().map(|e| e.item.latitude.to_bits()).collect();
        assert_eq!(distinct.len(), 25);
        for entry in &entries {
            assert_eq!(entry.route.distance_meters, entry.item.latitude * 1000.0);
        }
        assert_eq!(routes.calls.load(Ordering::SeqCst), 25);
    }

    #[tokio::test]
    async fn never_exceeds_worker_cap() {
        let routes = ScriptedRoutes::with_delay(Duration::from_millis(20));
        let outcome = aggregator(&routes, 3).run("test", ORIGIN, points(12)).await;

        assert_eq!(outcome.len(), 12);
        assert!(routes.max_in_flight.load(Ordering::SeqCst) <= 3);
        assert_eq!(routes.providers_created.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn worker_count_is_bounded_by_item_count() {
        let routes = ScriptedRoutes::with_delay(Duration::from_millis(5));
        let outcome = aggregator(&routes, DEFAULT_WORKER_CAP)
            .run("test", ORIGIN, points(2))
            .await;

        assert_eq!(outcome.len(), 2);
        assert_eq!(routes.providers_created.load(Ordering::SeqCst), 2);
        assert!(routes.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn empty_input_is_empty_outcome() {
        let routes = ScriptedRoutes::with_delay(Duration::ZERO);
        let outcome = aggregator(&routes, 4).run("test", ORIGIN, Vec::<GeoPoint>::new()).await;

        assert_eq!(outcome, BatchOutcome::Empty);
        assert_eq!(routes.providers_created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn single_failure_fails_the_whole_batch() {
        let routes = ScriptedRoutes::failing_at(Duration::from_millis(5), &[3.0]);
        let outcome = aggregator(&routes, 2).run("test", ORIGIN, points(6)).await;

        assert!(outcome.is_failed(), "expected failure, got {outcome:?}");
        assert!(outcome.failure().unwrap().contains("503"));
        assert!(outcome.into_entries().is_empty());
    }

    #[tokio::test]
    async fn failure_stops_workers_from_draining_the_queue() {
        let routes = ScriptedRoutes::failing_at(Duration::from_millis(10), &[1.0]);
        let outcome = aggregator(&routes, 1).run("test", ORIGIN, points(50)).await;

        assert!(outcome.is_failed());
        // The first item fails; the single worker stops right after it.
        assert_eq!(routes.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn factory_failure_fails_batch_without_calls() {
        struct Broken;
        impl RouteProviderFactory for Broken {
            fn create(&self) -> Result<Arc<dyn RouteInfoProvider>, RouteError> {
                Err(RouteError::ClientBuild("no tls".into()))
            }
        }

        let outcome = BoundedAggregator::new(Arc::new(Broken), 4)
            .run("test", ORIGIN, points(3))
            .await;
        assert!(outcome.is_failed());
    }
}
