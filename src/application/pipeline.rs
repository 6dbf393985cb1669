//! Bounded-queue producer/consumer engine
//!
//! One or more producers and one or more consumers share a single bounded
//! queue; `send`/`recv` on it are the only suspension points. Shutdown uses a
//! sentinel: when the last producer finishes, exactly one [`Message::Done`]
//! is enqueued, and every consumer that dequeues it re-enqueues it before
//! exiting, so a single sentinel terminates all consumers without a broadcast
//! primitive. Real items are processed at most once by exactly one consumer.
//!
//! Cancellation is cooperative: the token is checked at the top of every
//! worker loop iteration; cancelled workers exit without error. Per-item
//! consumer failures are logged and skipped; they never stop the pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::errors::ScanError;

/// Queue message: a unit of work or the shutdown sentinel.
#[derive(Debug)]
pub enum Message<T> {
    Item(T),
    /// "No more work". Enqueued exactly once by the last finishing producer,
    /// observed and re-enqueued by every consumer.
    Done,
}

/// A work source drained by the pipeline until it returns `None`.
#[async_trait]
pub trait Producer<T>: Send {
    async fn produce(&mut self) -> Option<T>;
}

/// A worker processing dequeued items. Errors are per-item: they are logged
/// by the pipeline and the item is skipped.
#[async_trait]
pub trait Consumer<T>: Send {
    async fn consume(&mut self, item: T) -> Result<(), ScanError>;
}

/// Receives `completed/total` after every completed unit of work.
pub trait ProgressReporter: Send + Sync {
    fn progress(&self, completed: u64, total: u64);
}

/// Default reporter emitting structured tracing events.
pub struct TracingProgressReporter;

impl ProgressReporter for TracingProgressReporter {
    fn progress(&self, completed: u64, total: u64) {
        info!(completed, total, "scan progress");
    }
}

/// Shared progress state, incremented by whichever worker completes a unit.
pub struct ProgressTracker {
    completed: AtomicU64,
    total: AtomicU64,
    reporter: Arc<dyn ProgressReporter>,
}

impl ProgressTracker {
    pub fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            completed: AtomicU64::new(0),
            total: AtomicU64::new(0),
            reporter,
        }
    }

    pub fn add_total(&self, units: u64) {
        self.total.fetch_add(units, Ordering::Relaxed);
    }

    /// Record one completed unit and report the new count.
    pub fn complete_one(&self) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        self.reporter.progress(completed, total);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

/// Producer/consumer pipeline over one bounded queue.
pub struct Pipeline<T> {
    queue_capacity: usize,
    token: CancellationToken,
    progress: Arc<ProgressTracker>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Send + 'static> Pipeline<T> {
    pub fn new(
        queue_capacity: usize,
        token: CancellationToken,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            queue_capacity,
            token,
            progress,
            _marker: std::marker::PhantomData,
        }
    }

    /// Run all producers and consumers to completion.
    ///
    /// Returns once every worker has exited: producers by draining their
    /// sources, consumers by observing the sentinel (or cancellation).
    pub async fn run(
        &self,
        producers: Vec<Box<dyn Producer<T>>>,
        consumers: Vec<Box<dyn Consumer<T>>>,
    ) -> Result<(), ScanError> {
        let (tx, rx) = mpsc::channel::<Message<T>>(self.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let live_producers = Arc::new(AtomicUsize::new(producers.len()));

        let mut handles = Vec::with_capacity(producers.len() + consumers.len());

        for mut producer in producers {
            let tx = tx.clone();
            let token = self.token.clone();
            let live_producers = Arc::clone(&live_producers);
            handles.push(tokio::spawn(async move {
                loop {
                    if token.is_cancelled() {
                        debug!("producer cancelled");
                        break;
                    }
                    match producer.produce().await {
                        Some(item) => {
                            if tx.send(Message::Item(item)).await.is_err() {
                                // All consumers are gone; nothing left to do.
                                break;
                            }
                        }
                        None => break,
                    }
                }
                if live_producers.fetch_sub(1, Ordering::AcqRel) == 1 {
                    // Last producer standing enqueues the sentinel exactly once.
                    let _ = tx.send(Message::Done).await;
                }
            }));
        }

        for mut consumer in consumers {
            let tx = tx.clone();
            let rx = Arc::clone(&rx);
            let token = self.token.clone();
            let progress = Arc::clone(&self.progress);
            handles.push(tokio::spawn(async move {
                loop {
                    if token.is_cancelled() {
                        debug!("consumer cancelled");
                        break;
                    }
                    // Hold the receiver lock only across the dequeue so other
                    // consumers can pull while this item is processed.
                    let message = { rx.lock().await.recv().await };
                    match message {
                        None => break,
                        Some(Message::Done) => {
                            // Pass the sentinel on so every remaining
                            // consumer observes it, then exit.
                            let _ = tx.send(Message::Done).await;
                            break;
                        }
                        Some(Message::Item(item)) => {
                            if let Err(e) = consumer.consume(item).await {
                                warn!(error = %e, "work item failed, skipping");
                            }
                            progress.complete_one();
                        }
                    }
                }
            }));
        }

        // Workers hold their own clones.
        drop(tx);
        drop(rx);

        for handle in handles {
            handle
                .await
                .map_err(|e| ScanError::Join(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct VecProducer(VecDeque<u32>);

    #[async_trait]
    impl Producer<u32> for VecProducer {
        async fn produce(&mut self) -> Option<u32> {
            self.0.pop_front()
        }
    }

    struct CollectingConsumer(Arc<Mutex<Vec<u32>>>);

    #[async_trait]
    impl Consumer<u32> for CollectingConsumer {
        async fn consume(&mut self, item: u32) -> Result<(), ScanError> {
            self.0.lock().await.push(item);
            Ok(())
        }
    }

    struct SilentReporter;
    impl ProgressReporter for SilentReporter {
        fn progress(&self, _completed: u64, _total: u64) {}
    }

    #[tokio::test]
    async fn every_item_processed_exactly_once() {
        let items: Vec<u32> = (0..50).collect();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let progress = Arc::new(ProgressTracker::new(Arc::new(SilentReporter)));
        progress.add_total(items.len() as u64);

        let producers: Vec<Box<dyn Producer<u32>>> = vec![
            Box::new(VecProducer(items[..25].iter().copied().collect())),
            Box::new(VecProducer(items[25..].iter().copied().collect())),
        ];
        let consumers: Vec<Box<dyn Consumer<u32>>> = (0..3)
            .map(|_| Box::new(CollectingConsumer(Arc::clone(&seen))) as Box<dyn Consumer<u32>>)
            .collect();

        let pipeline = Pipeline::new(4, CancellationToken::new(), Arc::clone(&progress));
        pipeline.run(producers, consumers).await.unwrap();

        let mut seen = seen.lock().await.clone();
        seen.sort_unstable();
        assert_eq!(seen, items);
        assert_eq!(progress.completed(), 50);
    }

    #[tokio::test]
    async fn single_producer_zero_items_still_terminates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let progress = Arc::new(ProgressTracker::new(Arc::new(SilentReporter)));

        let producers: Vec<Box<dyn Producer<u32>>> =
            vec![Box::new(VecProducer(VecDeque::new()))];
        let consumers: Vec<Box<dyn Consumer<u32>>> = (0..4)
            .map(|_| Box::new(CollectingConsumer(Arc::clone(&seen))) as Box<dyn Consumer<u32>>)
            .collect();

        let pipeline = Pipeline::new(1, CancellationToken::new(), progress);
        pipeline.run(producers, consumers).await.unwrap();
        assert!(seen.lock().await.is_empty());
    }

    #[tokio::test]
    async fn cancellation_stops_workers() {
        let token = CancellationToken::new();
        token.cancel();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let progress = Arc::new(ProgressTracker::new(Arc::new(SilentReporter)));
        let producers: Vec<Box<dyn Producer<u32>>> =
            vec![Box::new(VecProducer((0..100).collect()))];
        let consumers: Vec<Box<dyn Consumer<u32>>> =
            vec![Box::new(CollectingConsumer(Arc::clone(&seen)))];

        let pipeline = Pipeline::new(2, token, progress);
        pipeline.run(producers, consumers).await.unwrap();
        assert!(seen.lock().await.is_empty());
    }
}
