// crates/kernel/src/exec.rs
//! Callback execution strategies: inline or through a bounded worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};
use node::Node;
use thiserror::Error;

use crate::error::CallbackError;
use crate::options::ConcurrencyOptions;
use crate::session::Callback;

/// How accepted nodes reach the caller's callback.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ExecutionMode {
    /// The callback runs inline on the driver thread.
    #[default]
    Sequential,
    /// Callbacks are offloaded to a fixed worker pool.
    Concurrent,
}

/// Shared flag that stops a running traversal between nodes.
///
/// Cancellation is cooperative: the driver stops submitting new work and
/// workers finish the callback they are in, but nothing is interrupted
/// mid-flight.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Worker-pool failures. All of these are fatal to the traversal.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A pool cannot be built with zero workers.
    #[error("worker pool needs at least one worker, got {workers}")]
    InvalidWorkerCount {
        /// Requested worker count.
        workers: usize,
    },

    /// The job channel closed while the driver was still submitting.
    #[error("worker pool disconnected while jobs were pending")]
    Disconnected,

    /// A worker could not hand back a result within the send timeout.
    #[error("worker result channel wedged for longer than {timeout:?}")]
    Wedged {
        /// The configured send timeout.
        timeout: Duration,
    },

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn a worker thread")]
    Spawn(#[source] std::io::Error),
}

fn record_failure(slot: &std::sync::Mutex<Option<PoolError>>, error: PoolError) {
    let mut guard = match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.get_or_insert(error);
}

/// One offloaded callback invocation.
pub(crate) struct Job {
    pub(crate) node: Node,
}

/// Result of one callback invocation, in completion order.
#[derive(Debug)]
pub struct JobOutcome {
    /// The node the callback ran for, payload included.
    pub node: Node,
    /// The callback's error, if it returned one.
    pub error: Option<CallbackError>,
}

/// Fixed-size worker pool over bounded channels.
///
/// Jobs flow through one bounded channel, results through another. Each
/// worker holds a clone of the result sender and drops it when it exits,
/// so the result stream closes exactly once: after the job side is closed
/// and every in-flight job has produced its result.
pub(crate) struct WorkerPool {
    jobs: Option<Sender<Job>>,
    results: Receiver<JobOutcome>,
    workers: Vec<JoinHandle<()>>,
    failure: Arc<std::sync::Mutex<Option<PoolError>>>,
}

impl WorkerPool {
    pub(crate) fn new(
        options: &ConcurrencyOptions,
        callback: Callback,
        token: CancellationToken,
    ) -> Result<Self, PoolError> {
        if options.workers == 0 {
            return Err(PoolError::InvalidWorkerCount { workers: 0 });
        }
        let (jobs_tx, jobs_rx) = bounded::<Job>(options.queue_capacity);
        let (results_tx, results_rx) = bounded::<JobOutcome>(options.queue_capacity);
        let failure = Arc::new(std::sync::Mutex::new(None));
        let timeout = options.send_timeout;

        let mut workers = Vec::with_capacity(options.workers);
        for index in 0..options.workers {
            let jobs = jobs_rx.clone();
            let results = results_tx.clone();
            let callback = Arc::clone(&callback);
            let token = token.clone();
            let failure = Arc::clone(&failure);
            let handle = thread::Builder::new()
                .name(format!("traverse-worker-{index}"))
                .spawn(move || {
                    while let Ok(job) = jobs.recv() {
                        if token.is_cancelled() {
                            break;
                        }
                        let error = callback(&job.node).err();
                        let outcome = JobOutcome {
                            node: job.node,
                            error,
                        };
                        if results.send_timeout(outcome, timeout).is_err() {
                            record_failure(&failure, PoolError::Wedged { timeout });
                            break;
                        }
                    }
                })
                .map_err(PoolError::Spawn)?;
            workers.push(handle);
        }
        drop(results_tx);
        drop(jobs_rx);

        tracing::debug!(workers = options.workers, "worker pool started");
        Ok(Self {
            jobs: Some(jobs_tx),
            results: results_rx,
            workers,
            failure,
        })
    }

    /// Submits one job, blocking for backpressure when the queue is full.
    pub(crate) fn submit(&self, node: Node) -> Result<(), PoolError> {
        let Some(jobs) = &self.jobs else {
            return Err(PoolError::Disconnected);
        };
        jobs.send(Job { node }).map_err(|_| PoolError::Disconnected)
    }

    /// Moves every already-available result into `sink` without blocking.
    ///
    /// The driver calls this between submissions so the bounded result
    /// channel keeps flowing while the walk is still producing nodes.
    pub(crate) fn poll(&self, sink: &mut Vec<JobOutcome>) {
        while let Ok(outcome) = self.results.try_recv() {
            sink.push(outcome);
        }
    }

    /// Closes the job side, drains every outstanding result, and joins the
    /// workers.
    pub(crate) fn drain(mut self) -> Result<Vec<JobOutcome>, PoolError> {
        drop(self.jobs.take());
        let outcomes: Vec<JobOutcome> = self.results.iter().collect();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        let recorded = match self.failure.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(error) = recorded {
            return Err(error);
        }
        tracing::debug!(results = outcomes.len(), "worker pool drained");
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::AtomicUsize;

    fn nodes(count: usize) -> (tempfile::TempDir, Vec<Node>) {
        let temp = tempfile::tempdir().expect("tempdir");
        let nodes = (0..count)
            .map(|index| {
                let path = temp.path().join(format!("file-{index}.txt"));
                fs::write(&path, b"x").expect("write");
                let metadata = fs::symlink_metadata(&path).expect("metadata");
                Node::new(&path, temp.path(), metadata, 1)
            })
            .collect();
        (temp, nodes)
    }

    fn options(workers: usize) -> ConcurrencyOptions {
        ConcurrencyOptions {
            workers,
            queue_capacity: 4,
            send_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn zero_workers_is_a_construction_error() {
        let error = WorkerPool::new(
            &options(0),
            Arc::new(|_node: &Node| Ok(())),
            CancellationToken::new(),
        )
        .err()
        .expect("zero workers must fail");
        assert!(matches!(error, PoolError::InvalidWorkerCount { workers: 0 }));
    }

    #[test]
    fn every_submitted_job_yields_exactly_one_result() {
        let (_temp, nodes) = nodes(32);
        let invoked = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&invoked);
        let pool = WorkerPool::new(
            &options(3),
            Arc::new(move |_node: &Node| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
            CancellationToken::new(),
        )
        .expect("pool");

        let submitted = nodes.len();
        let mut outcomes = Vec::new();
        for node in nodes {
            pool.submit(node).expect("submit");
            pool.poll(&mut outcomes);
        }
        outcomes.extend(pool.drain().expect("drain"));

        assert_eq!(outcomes.len(), submitted);
        assert_eq!(invoked.load(Ordering::SeqCst), submitted);
        assert!(outcomes.iter().all(|outcome| outcome.error.is_none()));
    }

    #[test]
    fn callback_errors_travel_with_their_node() {
        let (_temp, nodes) = nodes(4);
        let pool = WorkerPool::new(
            &options(2),
            Arc::new(|node: &Node| {
                if node.name() == "file-2.txt" {
                    Err("service unreachable".into())
                } else {
                    Ok(())
                }
            }),
            CancellationToken::new(),
        )
        .expect("pool");

        for node in nodes {
            pool.submit(node).expect("submit");
        }
        let outcomes = pool.drain().expect("drain");

        let failed: Vec<&JobOutcome> = outcomes
            .iter()
            .filter(|outcome| outcome.error.is_some())
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].node.name(), "file-2.txt");
    }

    #[test]
    fn cancellation_stops_queued_work() {
        let (_temp, nodes) = nodes(8);
        let token = CancellationToken::new();
        let invoked = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&invoked);
        let pool = WorkerPool::new(
            &options(1),
            Arc::new(move |_node: &Node| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
            token.clone(),
        )
        .expect("pool");

        token.cancel();
        for node in nodes {
            // The single worker exits on its first post-cancel receive, so
            // later sends may find the channel closed. Either is fine here.
            if pool.submit(node).is_err() {
                break;
            }
        }
        let outcomes = pool.drain().expect("drain");
        assert!(outcomes.is_empty());
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn outcome_carries_the_node_back() {
        let (_temp, nodes) = nodes(1);
        let pool = WorkerPool::new(
            &options(1),
            Arc::new(|_node: &Node| Ok(())),
            CancellationToken::new(),
        )
        .expect("pool");
        pool.submit(nodes.into_iter().next().expect("node"))
            .expect("submit");
        let outcomes = pool.drain().expect("drain");
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].node.name(), "file-0.txt");
    }
}
