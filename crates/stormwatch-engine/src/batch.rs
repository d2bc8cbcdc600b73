//! Fixed-size sequential batch processing with a yield between batches.

use std::future::Future;

use serde::Serialize;

use crate::classify::PinGroup;

/// Suspension point run between batches.
pub trait YieldPoint: Send + Sync {
    fn yield_now(&self) -> impl Future<Output = ()> + Send;
}

/// Yields to the tokio scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioYield;

impl YieldPoint for TokioYield {
    fn yield_now(&self) -> impl Future<Output = ()> + Send {
        tokio::task::yield_now()
    }
}

/// Tally of a full classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub open: usize,
    /// Closed, not storm-related.
    pub closed: usize,
    pub storm: usize,
    pub unknown: usize,
    pub failed: usize,
}

impl Summary {
    pub fn record(&mut self, group: PinGroup) {
        match group {
            PinGroup::Open => self.open += 1,
            PinGroup::Closed => self.closed += 1,
            PinGroup::Storm => self.storm += 1,
            PinGroup::Unknown => self.unknown += 1,
        }
    }

    pub fn merge(&mut self, other: Summary) {
        self.open += other.open;
        self.closed += other.closed;
        self.storm += other.storm;
        self.unknown += other.unknown;
        self.failed += other.failed;
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.open + self.closed + self.storm + self.unknown + self.failed
    }
}

/// Drives a worker over items in consecutive chunks of `batch_size`.
#[derive(Debug, Clone)]
pub struct BatchDispatcher<Y = TokioYield> {
    batch_size: usize,
    yield_point: Y,
}

impl BatchDispatcher<TokioYield> {
    /// A `batch_size` of 0 is treated as 1.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self::with_yield_point(batch_size, TokioYield)
    }
}

impl<Y: YieldPoint> BatchDispatcher<Y> {
    #[must_use]
    pub fn with_yield_point(batch_size: usize, yield_point: Y) -> Self {
        Self {
            batch_size: batch_size.max(1),
            yield_point,
        }
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run `worker` once per item, chunk by chunk, and tally the results.
    ///
    /// Chunks run strictly in order with a yield between consecutive chunks.
    /// A worker error is logged and counted as `failed`; it never stops the
    /// run.
    pub async fn process_all<T, F, E>(&self, items: &[T], mut worker: F) -> Summary
    where
        T: Sync,
        F: FnMut(&T) -> Result<PinGroup, E> + Send,
        E: std::fmt::Display,
    {
        let mut summary = Summary::default();
        let batches = items.len().div_ceil(self.batch_size);

        for (index, chunk) in items.chunks(self.batch_size).enumerate() {
            if index > 0 {
                self.yield_point.yield_now().await;
            }

            let mut tally = Summary::default();
            for item in chunk {
                match worker(item) {
                    Ok(group) => tally.record(group),
                    Err(e) => {
                        tracing::warn!(batch = index, error = %e, "item failed; continuing");
                        tally.failed += 1;
                    }
                }
            }
            summary.merge(tally);
            tracing::trace!(batch = index + 1, batches, "batch processed");
        }

        tracing::debug!(
            items = items.len(),
            batches,
            open = summary.open,
            closed = summary.closed,
            storm = summary.storm,
            unknown = summary.unknown,
            failed = summary.failed,
            "batch run complete"
        );
        summary
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
