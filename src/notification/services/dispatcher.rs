//! Bounded, fire-and-forget notification dispatcher.
//!
//! Requests are queued on a bounded channel and drained by a fixed pool of
//! worker tasks. Enqueueing never waits: when the queue is full or closed the
//! notification is dropped and counted. Workers render and deliver each
//! notification once; failures are logged and counted, never retried.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::DispatchConfig;
use crate::notification::{domain::Notification, ports::Notifier};

/// Point-in-time view of dispatcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSnapshot {
    /// Notifications accepted onto the queue.
    pub enqueued: u64,
    /// Notifications delivered by the notifier.
    pub delivered: u64,
    /// Notifications whose rendering or delivery failed.
    pub failed: u64,
    /// Notifications discarded because the queue was full or closed.
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct DispatchMetrics {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl DispatchMetrics {
    fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

type SharedSender = Arc<RwLock<Option<mpsc::Sender<Notification>>>>;

/// Cloneable entry point used by services to request notifications.
///
/// All clones share one queue. Once the owning [`DispatcherHandle`] shuts
/// down, further requests are dropped.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    sender: SharedSender,
    metrics: Arc<DispatchMetrics>,
}

/// Owner of the dispatcher's worker tasks.
#[derive(Debug)]
pub struct DispatcherHandle {
    sender: SharedSender,
    workers: Vec<JoinHandle<()>>,
    metrics: Arc<DispatchMetrics>,
}

impl NotificationDispatcher {
    /// Starts the worker pool on the current tokio runtime.
    ///
    /// Zero workers or capacity are raised to one.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, as [`tokio::spawn`] does.
    #[must_use]
    pub fn spawn(
        notifier: Arc<dyn Notifier>,
        config: DispatchConfig,
    ) -> (Self, DispatcherHandle) {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let receiver = Arc::new(Mutex::new(rx));
        let metrics = Arc::new(DispatchMetrics::default());

        let workers = (0..config.workers.max(1))
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    Arc::clone(&receiver),
                    Arc::clone(&notifier),
                    Arc::clone(&metrics),
                ))
            })
            .collect();

        let sender: SharedSender = Arc::new(RwLock::new(Some(tx)));
        let dispatcher = Self {
            sender: Arc::clone(&sender),
            metrics: Arc::clone(&metrics),
        };
        let handle = DispatcherHandle {
            sender,
            workers,
            metrics,
        };
        (dispatcher, handle)
    }

    /// Queues a notification without waiting for delivery.
    ///
    /// A full or closed queue drops the notification; the drop is logged and
    /// counted in [`DispatchSnapshot::dropped`].
    pub fn dispatch(&self, notification: Notification) {
        let kind = notification.kind();
        let Ok(guard) = self.sender.read() else {
            self.drop_notification(kind, "dispatcher state poisoned");
            return;
        };
        let Some(sender) = guard.as_ref() else {
            self.drop_notification(kind, "dispatcher shut down");
            return;
        };
        match sender.try_send(notification) {
            Ok(()) => {
                self.metrics.enqueued.fetch_add(1, Ordering::Relaxed);
                debug!(kind, "notification queued");
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.drop_notification(kind, "notification queue full")
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.drop_notification(kind, "notification queue closed")
            }
        }
    }

    /// Returns the current counters.
    #[must_use]
    pub fn metrics(&self) -> DispatchSnapshot {
        self.metrics.snapshot()
    }

    fn drop_notification(&self, kind: &'static str, reason: &'static str) {
        self.metrics.dropped.fetch_add(1, Ordering::Relaxed);
        warn!(kind, reason, "notification dropped");
    }
}

impl DispatcherHandle {
    /// Returns the current counters.
    #[must_use]
    pub fn metrics(&self) -> DispatchSnapshot {
        self.metrics.snapshot()
    }

    /// Closes the queue and waits until the workers have drained it.
    ///
    /// Returns the final counters.
    pub async fn shutdown(self) -> DispatchSnapshot {
        match self.sender.write() {
            Ok(mut sender) => {
                sender.take();
            }
            Err(poisoned) => {
                poisoned.into_inner().take();
            }
        }
        for worker in self.workers {
            if let Err(err) = worker.await {
                warn!(error = %err, "notification worker ended abnormally");
            }
        }
        self.metrics.snapshot()
    }
}

async fn run_worker(
    worker: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Notification>>>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<DispatchMetrics>,
) {
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(notification) = next else {
            debug!(worker, "notification queue closed; worker exiting");
            return;
        };
        deliver(worker, &notification, notifier.as_ref(), &metrics).await;
    }
}

async fn deliver(
    worker: usize,
    notification: &Notification,
    notifier: &dyn Notifier,
    metrics: &DispatchMetrics,
) {
    let kind = notification.kind();
    let email = match notification.render() {
        Ok(email) => email,
        Err(err) => {
            metrics.failed.fetch_add(1, Ordering::Relaxed);
            warn!(worker, kind, error = %err, "notification could not be rendered");
            return;
        }
    };
    match notifier.send(&email).await {
        Ok(()) => {
            metrics.delivered.fetch_add(1, Ordering::Relaxed);
            debug!(worker, kind, to = %email.to, "notification delivered");
        }
        Err(err) => {
            metrics.failed.fetch_add(1, Ordering::Relaxed);
            warn!(worker, kind, to = %email.to, error = %err, "notification delivery failed");
        }
    }
}
